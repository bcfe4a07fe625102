//! Members-only panel view.

use keyhole_core::providers::Identity;
use keyhole_core::view::{
    LOG_OUT_LABEL, MEMBERS_HEADING, MEMBERS_NOTE, MEMBERS_SUBHEADING, welcome_line,
};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::overlays::render_utils::{calculate_overlay_area, render_overlay_container};

const PANEL_WIDTH: u16 = 56;
const PANEL_HEIGHT: u16 = 11;

/// Renders the members-only panel for `identity`.
pub fn render_members(frame: &mut Frame, area: Rect, identity: &Identity, signing_out: bool) {
    let popup = calculate_overlay_area(area, PANEL_WIDTH, PANEL_HEIGHT);
    let inner = render_overlay_container(frame, popup, MEMBERS_SUBHEADING, Color::Green);

    let log_out = if signing_out {
        Span::styled("Signing out...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("[ {LOG_OUT_LABEL} ]"),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };

    let lines = vec![
        Line::from(Span::styled(
            MEMBERS_HEADING,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            welcome_line(identity),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            MEMBERS_NOTE,
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(log_out),
    ];

    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, inner);
}
