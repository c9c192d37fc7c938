//! Confirmation gate placed in front of destructive actions.

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DialogState {
    #[default]
    Hidden,
    Shown,
}

/// Two-state dialog holding the guarded action until it is confirmed or cancelled.
#[derive(Debug, Clone)]
pub struct ConfirmDialog<A> {
    pending: Option<A>,
    confirm_selected: bool,
}

impl<A> Default for ConfirmDialog<A> {
    fn default() -> Self {
        Self {
            pending: None,
            confirm_selected: false,
        }
    }
}

impl<A> ConfirmDialog<A> {
    pub fn state(&self) -> DialogState {
        if self.pending.is_some() {
            DialogState::Shown
        } else {
            DialogState::Hidden
        }
    }

    pub fn is_shown(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    /// Shows the dialog for `action`. Ignored while another request is shown.
    pub fn request_show(&mut self, action: A) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(action);
        self.confirm_selected = false;
        true
    }

    /// Hides the dialog and hands back the guarded action for execution.
    pub fn confirm(&mut self) -> Option<A> {
        self.confirm_selected = false;
        self.pending.take()
    }

    /// Confirms and runs `execute` on the guarded action. Returns whether it ran.
    pub fn confirm_with(&mut self, execute: impl FnOnce(A)) -> bool {
        match self.confirm() {
            Some(action) => {
                execute(action);
                true
            }
            None => false,
        }
    }

    /// Hides the dialog and drops the guarded action.
    pub fn cancel(&mut self) {
        self.confirm_selected = false;
        self.pending = None;
    }

    /// Whether the confirm button currently has keyboard focus.
    pub fn is_confirm_selected(&self) -> bool {
        self.confirm_selected
    }

    pub fn toggle_button(&mut self) {
        if self.pending.is_some() {
            self.confirm_selected = !self.confirm_selected;
        }
    }

    /// Activates whichever button has focus.
    pub fn activate_selected(&mut self) -> Option<A> {
        if self.confirm_selected {
            self.confirm()
        } else {
            self.cancel();
            None
        }
    }
}
