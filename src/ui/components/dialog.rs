//! Modal confirmation dialog.

use crate::ui::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Clickable dialog buttons.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogRegions {
    pub confirm: Rect,
    pub cancel: Rect,
}

const CANCEL_LABEL: &str = "Cancel";

/// Draws the dialog centered over `area` and returns its button regions.
pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    prompt: &str,
    confirm_label: &str,
    confirm_selected: bool,
) -> DialogRegions {
    let popup = centered(area, 48, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(" Confirm ", theme::title()))
        .borders(Borders::ALL)
        .border_style(theme::focused_border());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(prompt.to_owned(), theme::text())))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[0],
    );

    let confirm_text = format!(" {confirm_label} ");
    let cancel_text = format!(" {CANCEL_LABEL} ");
    let buttons = Layout::horizontal([
        Constraint::Length(confirm_text.chars().count() as u16),
        Constraint::Length(cancel_text.chars().count() as u16),
    ])
    .flex(Flex::SpaceAround)
    .split(rows[1]);

    let (confirm_style, cancel_style) = if confirm_selected {
        (
            theme::danger_button().add_modifier(Modifier::REVERSED),
            theme::dim(),
        )
    } else {
        (theme::dim(), theme::selected())
    };

    frame.render_widget(
        Paragraph::new(Span::styled(confirm_text, confirm_style)),
        buttons[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(cancel_text, cancel_style)),
        buttons[1],
    );

    DialogRegions {
        confirm: buttons[0],
        cancel: buttons[1],
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::{centered, render};
    use ratatui::{Terminal, backend::TestBackend, layout::Rect};

    #[test]
    fn popup_is_centered_and_clamped() {
        assert_eq!(
            centered(Rect::new(0, 0, 100, 40), 48, 7),
            Rect::new(26, 16, 48, 7)
        );
        assert_eq!(centered(Rect::new(0, 0, 20, 4), 48, 7), Rect::new(0, 0, 20, 4));
    }

    #[test]
    fn buttons_are_side_by_side_on_one_row() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut regions = None;
        terminal
            .draw(|frame| {
                regions = Some(render(
                    frame,
                    frame.area(),
                    "Are you sure you want to logout?",
                    "Yes, Logout",
                    false,
                ));
            })
            .unwrap();
        let regions = regions.unwrap();

        assert_eq!(regions.confirm.y, regions.cancel.y);
        assert!(regions.confirm.right() <= regions.cancel.x);
        assert_eq!(regions.confirm.width, 13);
        assert_eq!(regions.cancel.width, 8);
    }
}
