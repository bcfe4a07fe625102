//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use keyhole_core::view::{LOADING_TEXT, View};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::TaskKind;
use crate::form::render_form;
use crate::members::render_members;
use crate::overlays::render_notice;
use crate::overlays::render_utils::{InputHint, hint_spans};
use crate::state::AppState;

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 4;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
        .split(area);
    let body = chunks[0];

    match View::of(&app.session) {
        View::Loading => render_loading(frame, body),
        View::Authenticated(identity) => render_members(
            frame,
            body,
            identity,
            app.tasks.state(TaskKind::SignOut).is_running(),
        ),
        View::Unauthenticated => render_form(
            frame,
            body,
            &app.form,
            app.tasks.state(TaskKind::Submit).is_running(),
        ),
    }

    render_status_line(app, frame, chunks[1]);

    if let Some(notice) = &app.notice {
        render_notice(frame, notice, area);
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y, area.width, 1);
    let para = Paragraph::new(Line::from(Span::styled(
        LOADING_TEXT,
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(para, line_area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.provider_name),
        Style::default().fg(Color::Black).bg(Color::DarkGray),
    )];

    if app.tasks.is_any_running() {
        let spinner_idx = (app.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            SPINNER_FRAMES[spinner_idx],
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::raw("  "));

    let hints: &[InputHint<'_>] = if app.notice.is_some() {
        &[InputHint {
            key: "Enter",
            action: "dismiss",
        }]
    } else {
        match View::of(&app.session) {
            View::Loading => &[InputHint {
                key: "Ctrl+C",
                action: "quit",
            }],
            View::Authenticated(_) => &[
                InputHint {
                    key: "Enter",
                    action: "log out",
                },
                InputHint {
                    key: "q",
                    action: "quit",
                },
            ],
            View::Unauthenticated => &[
                InputHint {
                    key: "Tab",
                    action: "next",
                },
                InputHint {
                    key: "Enter",
                    action: "submit",
                },
                InputHint {
                    key: "Ctrl+T",
                    action: "switch mode",
                },
                InputHint {
                    key: "Esc",
                    action: "quit",
                },
            ],
        }
    };
    spans.extend(hint_spans(hints, Color::Cyan));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
