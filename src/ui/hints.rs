//! Footer hint composition for each focus and interaction mode.

use crate::{
    app::state::AppState,
    domain::{Focus, Screen},
    ui::components::footer::Hint,
};

pub fn build(state: &AppState) -> Vec<Hint> {
    if state.logout_dialog.is_shown() {
        return vec![
            Hint::new("←/→", "choose"),
            Hint::new("enter", "activate"),
            Hint::new("esc", "cancel"),
        ];
    }

    if state.language.is_open() {
        return vec![
            Hint::new("j/k/↑/↓", "highlight"),
            Hint::new("enter", "select"),
            Hint::new("esc", "close"),
        ];
    }

    if state.screen == Screen::Contact {
        return contact(state);
    }

    let mut hints = Vec::new();
    match state.focus {
        Focus::Code => {
            hints.push(Hint::new("type", "edit code"));
            hints.push(Hint::new("C-e", "open $EDITOR"));
            hints.push(Hint::new("C-s", "submit"));
            hints.push(Hint::new("esc", "leave editor"));
        }
        Focus::Language => {
            hints.push(Hint::new("enter/space", "choose language"));
        }
        Focus::Submit => {
            if !state.is_busy() {
                hints.push(Hint::new("enter", "submit for review"));
            }
        }
        Focus::Feedback => {
            hints.push(Hint::new("j/k/↑/↓", "scroll feedback"));
        }
    }

    hints.push(Hint::new("tab/S-tab", "focus"));

    if state.focus != Focus::Code {
        hints.push(Hint::new("e", "edit in $EDITOR"));
        hints.push(Hint::new("c", "contact"));
        hints.push(Hint::new("t", "toggle theme"));
        if state.session.is_signed_in() {
            hints.push(Hint::new("L", "logout"));
        }
        hints.push(Hint::new("q", "quit"));
    }

    hints
}

fn contact(state: &AppState) -> Vec<Hint> {
    if state.contact.is_sent() {
        return vec![
            Hint::new("enter", "submit another"),
            Hint::new("esc", "back to review"),
        ];
    }

    if state.contact.field().is_text() {
        return vec![
            Hint::new("type", "edit field"),
            Hint::new("tab/S-tab", "next field"),
            Hint::new("C-s", "send"),
            Hint::new("esc", "back to review"),
        ];
    }

    let mut hints = Vec::new();
    if !state.contact.is_sending() {
        hints.push(Hint::new("enter", "send message"));
    }
    hints.push(Hint::new("tab/S-tab", "next field"));
    hints.push(Hint::new("esc", "back to review"));
    hints.push(Hint::new("t", "toggle theme"));
    if state.session.is_signed_in() {
        hints.push(Hint::new("L", "logout"));
    }
    hints.push(Hint::new("q", "quit"));
    hints
}
