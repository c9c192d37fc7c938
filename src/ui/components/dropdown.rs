//! Language selector control and its overlay list.

use crate::app::state::dropdown::Dropdown;
use crate::domain::Language;
use crate::ui::theme;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

/// Draws the closed control. The open list is drawn separately with [`render_list`]
/// so it can overlay later widgets.
pub fn render_control(frame: &mut Frame<'_>, area: Rect, dropdown: &Dropdown<Language>) {
    let border_style = if dropdown.is_focused() {
        theme::focused_border()
    } else {
        theme::border()
    };
    let label = dropdown
        .selected()
        .map(Language::label)
        .unwrap_or("Select language");
    let arrow = if dropdown.is_open() { "▴" } else { "▾" };

    let block = Block::default()
        .title(Span::styled(" Language ", theme::dim()))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {label} "), theme::text()),
            Span::styled(arrow, theme::dim()),
        ]))
        .block(block),
        area,
    );
}

/// Where the option list goes: directly below the control, or above it when there is no room.
pub fn list_area(control: Rect, option_count: usize, bounds: Rect) -> Rect {
    let height = (option_count as u16).saturating_add(2);
    let below = control.bottom();
    let y = if below.saturating_add(height) <= bounds.bottom() {
        below
    } else {
        control.y.saturating_sub(height).max(bounds.y)
    };

    Rect {
        x: control.x,
        y,
        width: control.width,
        height: height.min(bounds.height),
    }
}

/// Draws the open option list with the highlighted entry selected.
pub fn render_list(frame: &mut Frame<'_>, area: Rect, dropdown: &Dropdown<Language>) {
    frame.render_widget(Clear, area);

    let items: Vec<ListItem<'static>> = dropdown
        .options()
        .iter()
        .enumerate()
        .map(|(index, language)| {
            let marker = if index == dropdown.selected_index() {
                "● "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, theme::dim()),
                Span::styled(language.label(), theme::text()),
            ]))
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(dropdown.highlighted_index()));
    frame.render_stateful_widget(
        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::focused_border()),
            )
            .highlight_style(theme::selected()),
        area,
        &mut list_state,
    );
}

#[cfg(test)]
mod tests {
    use super::list_area;
    use ratatui::layout::Rect;

    #[test]
    fn list_opens_below_when_there_is_room() {
        let area = list_area(Rect::new(2, 5, 20, 3), 4, Rect::new(0, 0, 80, 30));
        assert_eq!(area, Rect::new(2, 8, 20, 6));
    }

    #[test]
    fn list_flips_above_near_the_bottom() {
        let area = list_area(Rect::new(2, 25, 20, 3), 4, Rect::new(0, 0, 80, 30));
        assert_eq!(area, Rect::new(2, 19, 20, 6));
    }
}
