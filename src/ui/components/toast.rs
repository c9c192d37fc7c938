//! Transient notification toast.

use crate::app::state::Notification;
use crate::domain::NotificationKind;
use crate::ui::theme;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const MAX_WIDTH: u16 = 44;

/// Draws `notification` in the top-right corner of `area`.
pub fn render(frame: &mut Frame<'_>, area: Rect, notification: &Notification) {
    let (icon, style) = match notification.kind {
        NotificationKind::Success => ("✓", theme::success()),
        NotificationKind::Error => ("✗", theme::error()),
        NotificationKind::Info => ("i", theme::info()),
    };

    let text_width = notification.message.chars().count() as u16 + 4;
    let width = text_width.min(MAX_WIDTH).min(area.width);
    let inner_width = width.saturating_sub(2).max(1);
    let text_rows = (text_width.saturating_sub(2)).div_ceil(inner_width).max(1);
    let height = (text_rows + 2).min(area.height);

    let toast = Rect {
        x: area.right().saturating_sub(width + 1).max(area.x),
        y: area.y,
        width,
        height,
    };

    frame.render_widget(Clear, toast);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{icon} "), style),
            Span::styled(notification.message.clone(), theme::text()),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(style)),
        toast,
    );
}
