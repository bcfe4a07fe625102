//! Notice overlay.
//!
//! Shows the outcome of a credential call as a modal box. While it is open
//! every key except the dismiss keys is swallowed.

use crossterm::event::{KeyCode, KeyEvent};
use keyhole_core::form::Notice;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::render_utils::{
    InputHint, calculate_overlay_area, render_hints, render_overlay_container,
};

const NOTICE_WIDTH: u16 = 56;
const NOTICE_HEIGHT: u16 = 7;

/// Returns true when `key` closes the notice.
pub fn is_dismiss_key(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Esc)
}

pub fn render_notice(frame: &mut Frame, notice: &Notice, area: Rect) {
    let (title, color) = if notice.is_error() {
        ("Error", Color::Red)
    } else {
        ("Notice", Color::Green)
    };

    let popup = calculate_overlay_area(area, NOTICE_WIDTH, NOTICE_HEIGHT);
    let inner = render_overlay_container(frame, popup, title, color);

    let text = Paragraph::new(Line::from(Span::styled(
        notice.text(),
        Style::default().fg(color),
    )))
    .wrap(Wrap { trim: true });
    let body = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        inner.height.saturating_sub(1),
    );
    frame.render_widget(text, body);

    render_hints(frame, inner, &[InputHint::new("Enter", "OK")], color);
}
