//! Navigation header with greeting, page tabs, theme toggle, and logout button.

use crate::domain::Screen;
use crate::ui::theme;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Header payload consumed by the renderer.
#[derive(Debug, Clone)]
pub struct HeaderModel {
    pub app_label: String,
    pub greeting: String,
    pub is_dark: bool,
    pub signed_in: bool,
    pub operation: Option<String>,
    pub screen: Screen,
}

/// Clickable header regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRegions {
    pub review_tab: Rect,
    pub contact_tab: Rect,
    pub theme_toggle: Rect,
    pub logout: Rect,
}

const REVIEW_TAB: &str = " Review ";
const CONTACT_TAB: &str = " Contact ";

/// Renders the header and returns where its buttons landed.
pub fn render(frame: &mut Frame<'_>, area: Rect, model: &HeaderModel) -> HeaderRegions {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let toggle_label = theme_toggle_label(model.is_dark);
    let logout_label = if model.signed_in { " Logout " } else { "" };
    let toggle_width = toggle_label.chars().count() as u16;
    let logout_width = logout_label.chars().count() as u16;

    let columns = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(REVIEW_TAB.chars().count() as u16),
        Constraint::Length(1),
        Constraint::Length(CONTACT_TAB.chars().count() as u16),
        Constraint::Length(2),
        Constraint::Length(toggle_width),
        Constraint::Length(1),
        Constraint::Length(logout_width),
        Constraint::Length(1),
    ])
    .split(inner);

    let mut left = vec![
        Span::styled(format!(" {}", model.app_label), theme::title()),
        Span::styled(format!("  {}", model.greeting), theme::dim()),
    ];
    if let Some(operation) = &model.operation {
        left.push(Span::styled(format!("  {operation}"), theme::info()));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), columns[0]);

    for (label, screen, area) in [
        (REVIEW_TAB, Screen::Review, columns[1]),
        (CONTACT_TAB, Screen::Contact, columns[3]),
    ] {
        frame.render_widget(
            Paragraph::new(Span::styled(label, tab_style(model.screen == screen))),
            area,
        );
    }

    frame.render_widget(
        Paragraph::new(Span::styled(toggle_label, theme::selected())),
        columns[5],
    );

    let logout = if model.signed_in {
        frame.render_widget(
            Paragraph::new(Span::styled(logout_label, theme::danger_button())),
            columns[7],
        );
        columns[7]
    } else {
        Rect::default()
    };

    HeaderRegions {
        review_tab: columns[1],
        contact_tab: columns[3],
        theme_toggle: columns[5],
        logout,
    }
}

fn tab_style(active: bool) -> Style {
    if active {
        theme::title().add_modifier(Modifier::UNDERLINED)
    } else {
        theme::dim()
    }
}

fn theme_toggle_label(is_dark: bool) -> &'static str {
    if is_dark { " ☀ Light " } else { " ☾ Dark " }
}
