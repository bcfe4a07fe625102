//! Credential form view.

use keyhole_core::view::{EMAIL_PLACEHOLDER, password_placeholder};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{FormField, FormState};
use crate::common::mask;
use crate::overlays::render_utils::{
    InputLine, calculate_overlay_area, input_line, render_overlay_container,
};

const FORM_WIDTH: u16 = 52;
const FORM_HEIGHT: u16 = 13;
const ACCENT: Color = Color::Cyan;

/// Renders the sign-in / sign-up form centered in `area`.
pub fn render_form(frame: &mut Frame, area: Rect, form: &FormState, submitting: bool) {
    let popup = calculate_overlay_area(area, FORM_WIDTH, FORM_HEIGHT);
    let title = form.draft.mode.title();
    let inner = render_overlay_container(frame, popup, title, ACCENT);

    let lines = form_lines(form, submitting, inner.width);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn form_lines(form: &FormState, submitting: bool, width: u16) -> Vec<Line<'static>> {
    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let masked = mask(&form.draft.password);
    let password_hint = password_placeholder();

    let mut lines = vec![
        label("Email"),
        input_line(
            &InputLine {
                value: &form.draft.email,
                placeholder: Some(EMAIL_PLACEHOLDER),
                prompt: "> ",
                focused: form.focus == FormField::Email,
                text_color: Color::White,
                placeholder_color: Color::DarkGray,
                cursor_color: ACCENT,
            },
            width,
        ),
        Line::from(""),
        label("Password"),
        input_line(
            &InputLine {
                value: &masked,
                placeholder: Some(password_hint.as_str()),
                prompt: "> ",
                focused: form.focus == FormField::Password,
                text_color: Color::White,
                placeholder_color: Color::DarkGray,
                cursor_color: ACCENT,
            },
            width,
        ),
        Line::from(""),
    ];

    let submit_label = if submitting {
        "Submitting...".to_string()
    } else {
        format!("[ {} ]", form.draft.mode.title())
    };
    lines.push(button(submit_label, form.focus == FormField::Submit));

    let mut toggle_style = Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED);
    if form.focus == FormField::Toggle {
        toggle_style = toggle_style.add_modifier(Modifier::REVERSED);
    }
    lines.push(
        Line::from(Span::styled(form.draft.mode.switch_label(), toggle_style))
            .alignment(Alignment::Center),
    );

    if let Some(hint) = &form.hint {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    lines
}

fn button(label: String, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(label, style)).alignment(Alignment::Center)
}
