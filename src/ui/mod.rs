//! Top-level UI composition.

use crate::{
    app::state::AppState,
    domain::Screen,
    render::markdown::MarkdownRenderer,
    ui::components::{
        dialog, footer,
        header::{self, HeaderModel},
        toast,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

pub mod components;
mod hints;
pub mod screens;
pub mod theme;

pub const APP_LABEL: &str = "AI Code Review Assistant";

/// Draws the active screen and records clickable regions on `state`.
pub fn render(frame: &mut Frame<'_>, state: &mut AppState, markdown: &mut MarkdownRenderer) {
    markdown.sync_theme(state.theme.preference());

    let hints = hints::build(state);
    let root = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(footer::required_height(frame.area().width, &hints)),
    ])
    .split(frame.area());

    let header_regions = header::render(
        frame,
        root[0],
        &HeaderModel {
            app_label: APP_LABEL.to_owned(),
            screen: state.screen,
            greeting: format!("Hello, {}", state.session.display_name()),
            is_dark: state.theme.is_dark(),
            signed_in: state.session.is_signed_in(),
            operation: state.operation_display(),
        },
    );
    state.regions.theme_toggle = header_regions.theme_toggle;
    state.regions.logout = header_regions.logout;
    state.regions.review_tab = header_regions.review_tab;
    state.regions.contact_tab = header_regions.contact_tab;

    state.regions.clear_pages();
    match state.screen {
        Screen::Review => screens::review::render(frame, root[1], state, markdown),
        Screen::Contact => {
            state.language.set_regions(Rect::default(), None);
            screens::contact::render(frame, root[1], state);
        }
    }
    footer::render(frame, root[2], &hints);

    if let Some(notification) = state.active_notification() {
        toast::render(frame, root[1], notification);
    }

    match state.logout_dialog.pending().copied() {
        Some(action) => {
            let regions = dialog::render(
                frame,
                frame.area(),
                action.prompt(),
                action.confirm_label(),
                state.logout_dialog.is_confirm_selected(),
            );
            state.regions.dialog_confirm = regions.confirm;
            state.regions.dialog_cancel = regions.cancel;
        }
        None => {
            state.regions.dialog_confirm = Rect::default();
            state.regions.dialog_cancel = Rect::default();
        }
    }
}
