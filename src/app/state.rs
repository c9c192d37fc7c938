//! Application state models and screen-local behavior.

mod code_input;
pub mod contact;
pub mod dialog;
pub mod dropdown;
pub mod submission;
pub mod theme;

pub use self::code_input::CodeInputState;
use self::{
    contact::{ContactField, ContactForm},
    dialog::ConfirmDialog,
    dropdown::{Dropdown, PointerOutcome},
    submission::{Effect, SubmissionMachine},
    theme::ThemeState,
};
use crate::{
    api::{client::ReviewResponse, errors::ApiError},
    domain::{Focus, GuardedAction, Language, NotificationKind, ReviewPoint, Screen},
    storage::{Session, Storage, TOKEN_KEY},
};
use ratatui::layout::{Position, Rect};
use std::time::{Duration, Instant};

/// Spinner frames used while a review request is in flight.
pub const SPINNER_FRAMES: [&str; 8] = ["⢎⡰", "⢎⡡", "⢎⡑", "⢎⠱", "⠎⡱", "⢊⡱", "⢌⡱", "⢆⡱"];

pub const LOGOUT_MESSAGE: &str = "Logged out. Run `review-assistant session` to sign in again.";

const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(4);

/// Transient toast shown after workflow events.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Screen regions recorded by the renderer for pointer hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenRegions {
    pub code: Rect,
    pub submit: Rect,
    pub feedback: Rect,
    pub theme_toggle: Rect,
    pub logout: Rect,
    pub review_tab: Rect,
    pub contact_tab: Rect,
    pub contact_name: Rect,
    pub contact_email: Rect,
    pub contact_message: Rect,
    pub contact_send: Rect,
    pub dialog_confirm: Rect,
    pub dialog_cancel: Rect,
}

impl ScreenRegions {
    /// Forgets the page regions so a page that is not drawn cannot be clicked.
    pub fn clear_pages(&mut self) {
        self.code = Rect::default();
        self.submit = Rect::default();
        self.feedback = Rect::default();
        self.contact_name = Rect::default();
        self.contact_email = Rect::default();
        self.contact_message = Rect::default();
        self.contact_send = Rect::default();
    }
}

/// Top-level mutable application state.
#[derive(Debug)]
pub struct AppState {
    pub should_quit: bool,
    pub screen: Screen,
    pub session: Session,
    pub theme: ThemeState,
    pub code: CodeInputState,
    pub language: Dropdown<Language>,
    pub focus: Focus,
    pub submission: SubmissionMachine,
    pub logout_dialog: ConfirmDialog<GuardedAction>,
    pub contact: ContactForm,
    pub feedback_scroll: u16,
    pub regions: ScreenRegions,
    pub editor_requested: bool,
    notifications: Vec<Notification>,
    notification_duration: Duration,
    spinner_index: usize,
}

impl AppState {
    pub fn new(session: Session, theme: ThemeState) -> Self {
        let mut code = CodeInputState::default();
        code.focus();

        Self {
            should_quit: false,
            screen: Screen::Review,
            session,
            theme,
            code,
            language: Dropdown::new(Language::ALL, Language::default()),
            focus: Focus::Code,
            submission: SubmissionMachine::default(),
            logout_dialog: ConfirmDialog::default(),
            contact: ContactForm::default(),
            feedback_scroll: 0,
            regions: ScreenRegions::default(),
            editor_requested: false,
            notifications: Vec::new(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            spinner_index: 0,
        }
    }

    pub fn set_notification_duration(&mut self, duration: Duration) {
        self.notification_duration = duration;
    }

    pub fn selected_language(&self) -> Language {
        self.language.selected().unwrap_or_default()
    }

    pub fn select_language(&mut self, language: Language) {
        self.language = Dropdown::new(Language::ALL, language);
    }

    pub fn review_points(&self) -> &[ReviewPoint] {
        self.submission.points()
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.focus == focus {
            return;
        }

        match self.focus {
            Focus::Code => self.code.unfocus(),
            Focus::Language => self.language.blur(),
            Focus::Submit | Focus::Feedback => {}
        }

        self.focus = focus;
        match focus {
            Focus::Code => self.code.focus(),
            Focus::Language => self.language.focus(),
            Focus::Submit | Focus::Feedback => {}
        }
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    /// Switches the page below the header, keeping review focus for the way back.
    pub fn show_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        match screen {
            Screen::Contact => {
                self.language.blur();
                self.code.unfocus();
            }
            Screen::Review => match self.focus {
                Focus::Code => self.code.focus(),
                Focus::Language => self.language.focus(),
                Focus::Submit | Focus::Feedback => {}
            },
        }
        tracing::debug!(?screen, "switched screen");
    }

    /// Commits the highlighted language and hands focus to the submit button.
    pub fn commit_language(&mut self) -> Option<Language> {
        let language = self.language.commit();
        self.set_focus(Focus::Submit);
        language
    }

    /// Starts a submission attempt with the current buffer and language.
    pub fn submit(&mut self) -> Vec<Effect> {
        let code = self.code.text().to_owned();
        let language = self.selected_language();
        self.submission
            .submit(&code, language, &self.session.credentials)
    }

    /// Feeds a finished request back into the submission machine.
    pub fn finish_review(
        &mut self,
        request_id: u64,
        outcome: Result<ReviewResponse, ApiError>,
    ) -> Vec<Effect> {
        let effects = self.submission.resolve(request_id, outcome);
        if !effects.is_empty() {
            self.feedback_scroll = 0;
        }
        effects
    }

    /// Scrolls the feedback into view if `request_id` is still the displayed success.
    pub fn focus_feedback(&mut self, request_id: u64) -> bool {
        if !self.submission.is_showing_success_for(request_id) {
            return false;
        }
        self.feedback_scroll = 0;
        self.set_focus(Focus::Feedback);
        true
    }

    pub fn scroll_feedback_down(&mut self) {
        let max = u16::try_from(self.review_points().len().saturating_sub(1)).unwrap_or(u16::MAX);
        self.feedback_scroll = self.feedback_scroll.saturating_add(1).min(max);
    }

    pub fn scroll_feedback_up(&mut self) {
        self.feedback_scroll = self.feedback_scroll.saturating_sub(1);
    }

    /// Validates the contact form. Local failures raise an error notification and send nothing.
    pub fn send_contact(&mut self) -> Vec<Effect> {
        match self.contact.submit() {
            Ok(pending) => vec![Effect::SendContact(pending)],
            Err(rejection) => {
                if let Some(message) = rejection.message() {
                    self.notify(NotificationKind::Error, message);
                }
                Vec::new()
            }
        }
    }

    pub fn finish_contact(&mut self, request_id: u64, outcome: Result<(), ApiError>) {
        if let Some((kind, message)) = self.contact.resolve(request_id, outcome) {
            self.notify(kind, message);
        }
    }

    /// Activates the contact button: send while editing, start over after a send.
    pub fn activate_contact_button(&mut self) -> Vec<Effect> {
        if self.contact.is_sent() {
            self.contact.reset();
            return Vec::new();
        }
        self.contact.set_field(ContactField::Send);
        self.send_contact()
    }

    pub fn request_logout(&mut self) {
        self.logout_dialog.request_show(GuardedAction::Logout);
    }

    /// Runs a confirmed guarded action.
    pub fn execute_guarded(&mut self, action: GuardedAction, storage: &dyn Storage) {
        match action {
            GuardedAction::Logout => self.logout(storage),
        }
    }

    fn logout(&mut self, storage: &dyn Storage) {
        if let Err(error) = storage.remove(TOKEN_KEY) {
            tracing::warn!(%error, "failed to remove persisted token");
        }
        self.session.credentials.token = None;
        tracing::info!("signed out");
        self.notify(NotificationKind::Info, LOGOUT_MESSAGE);
    }

    /// Routes a pointer press to the dropdown, dialog, and buttons.
    ///
    /// Returns effects when the press hit the submit or send button.
    pub fn pointer_down(&mut self, column: u16, row: u16, storage: &dyn Storage) -> Vec<Effect> {
        let position = Position::new(column, row);

        if self.logout_dialog.is_shown() {
            if self.regions.dialog_confirm.contains(position) {
                if let Some(action) = self.logout_dialog.confirm() {
                    self.execute_guarded(action, storage);
                }
            } else if self.regions.dialog_cancel.contains(position) {
                self.logout_dialog.cancel();
            }
            return Vec::new();
        }

        if self.screen == Screen::Review {
            match self.language.pointer_down(column, row) {
                PointerOutcome::Opened | PointerOutcome::Inside => {
                    self.set_focus(Focus::Language);
                    return Vec::new();
                }
                PointerOutcome::Selected(_) => {
                    self.set_focus(Focus::Submit);
                    return Vec::new();
                }
                PointerOutcome::Closed | PointerOutcome::Ignored => {}
            }
        }

        if self.regions.theme_toggle.contains(position) {
            self.theme.toggle();
        } else if self.regions.logout.contains(position) {
            self.request_logout();
        } else if self.regions.review_tab.contains(position) {
            self.show_screen(Screen::Review);
        } else if self.regions.contact_tab.contains(position) {
            self.show_screen(Screen::Contact);
        } else if self.regions.contact_name.contains(position) {
            self.contact.set_field(ContactField::Name);
        } else if self.regions.contact_email.contains(position) {
            self.contact.set_field(ContactField::Email);
        } else if self.regions.contact_message.contains(position) {
            self.contact.set_field(ContactField::Message);
        } else if self.regions.contact_send.contains(position) {
            return self.activate_contact_button();
        } else if self.regions.code.contains(position) {
            self.set_focus(Focus::Code);
        } else if self.regions.submit.contains(position) {
            self.set_focus(Focus::Submit);
            return self.submit();
        } else if self.regions.feedback.contains(position) {
            self.set_focus(Focus::Feedback);
        }

        Vec::new()
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
            expires_at: Instant::now() + self.notification_duration,
        });
    }

    /// Most recent notification that has not expired.
    pub fn active_notification(&self) -> Option<&Notification> {
        let now = Instant::now();
        self.notifications
            .iter()
            .rev()
            .find(|notification| notification.expires_at > now)
    }

    pub fn prune_notifications(&mut self, now: Instant) {
        self.notifications
            .retain(|notification| notification.expires_at > now);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_busy(&self) -> bool {
        self.submission.is_busy()
    }

    pub fn advance_spinner(&mut self) {
        if self.is_busy() || self.contact.is_sending() {
            self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAMES.len();
        } else {
            self.spinner_index = 0;
        }
    }

    pub fn operation_display(&self) -> Option<String> {
        let label = if self.is_busy() {
            "Reviewing..."
        } else if self.contact.is_sending() {
            "Sending..."
        } else {
            return None;
        };
        let frame = SPINNER_FRAMES
            .get(self.spinner_index)
            .copied()
            .unwrap_or("⢎⡰");
        Some(format!("{frame} {label}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, LOGOUT_MESSAGE};
    use crate::app::state::contact::{ContactField, INVALID_EMAIL_MESSAGE, SENT_MESSAGE};
    use crate::api::client::ReviewResponse;
    use crate::app::state::submission::{Effect, SubmissionState};
    use crate::app::state::theme::{ThemePreference, ThemeState};
    use crate::domain::{Credentials, Focus, Language, NotificationKind, Screen};
    use crate::storage::{MemoryStorage, Session, Storage, TOKEN_KEY, USER_ID_KEY};
    use ratatui::layout::Rect;
    use secrecy::SecretString;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn signed_in_state(storage: Arc<MemoryStorage>) -> AppState {
        let session = Session {
            credentials: Credentials {
                token: Some(SecretString::from("tok".to_owned())),
                user_id: Some("u1".to_owned()),
            },
            name: Some("Ada".to_owned()),
        };
        AppState::new(session, ThemeState::load(storage, ThemePreference::Light))
    }

    fn request_id(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Dispatch(pending) => Some(pending.request_id),
                _ => None,
            })
            .expect("dispatch effect")
    }

    #[test]
    fn end_to_end_success_renders_numbered_points() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage);
        state.code.replace("print(1)".to_owned());
        state.select_language(Language::Python);

        let effects = state.submit();
        let id = request_id(&effects);
        match &effects[0] {
            Effect::Dispatch(pending) => {
                assert_eq!(pending.request.language, Language::Python);
                assert_eq!(pending.request.user_id, "u1");
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert!(state.operation_display().is_some());

        state.finish_review(
            id,
            Ok(ReviewResponse {
                status: 200,
                ai_feedback: Some("1. Good. 2. Add docstring.".to_owned()),
            }),
        );

        assert!(matches!(
            state.submission.state(),
            SubmissionState::Succeeded { .. }
        ));
        let rendered: Vec<String> = state
            .review_points()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["1. Good.", "2. Add docstring."]);

        assert!(state.focus_feedback(id));
        assert_eq!(state.focus, Focus::Feedback);
        assert!(!state.code.is_focused());
    }

    #[test]
    fn feedback_focus_for_superseded_request_is_skipped() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage);
        state.code.replace("x".to_owned());

        let first = request_id(&state.submit());
        state.finish_review(
            first,
            Ok(ReviewResponse {
                status: 200,
                ai_feedback: Some("1. a".to_owned()),
            }),
        );
        let _second = request_id(&state.submit());

        assert!(!state.focus_feedback(first));
        assert_eq!(state.focus, Focus::Code);
    }

    #[test]
    fn confirmed_logout_clears_token_and_blocks_submit() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (TOKEN_KEY, "tok"),
            (USER_ID_KEY, "u1"),
        ]));
        let mut state = signed_in_state(storage.clone());

        state.request_logout();
        let action = state.logout_dialog.confirm().expect("pending logout");
        state.execute_guarded(action, storage.as_ref());

        assert!(!state.logout_dialog.is_shown());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_ID_KEY).unwrap().as_deref(), Some("u1"));
        assert_eq!(
            state.active_notification().map(|n| n.message.as_str()),
            Some(LOGOUT_MESSAGE)
        );

        state.code.replace("x".to_owned());
        assert!(state.submit().iter().all(|effect| !matches!(effect, Effect::Dispatch(_))));
    }

    #[test]
    fn cancelled_logout_keeps_token() {
        let storage = Arc::new(MemoryStorage::with_entries([(TOKEN_KEY, "tok")]));
        let mut state = signed_in_state(storage.clone());

        state.request_logout();
        state.logout_dialog.cancel();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert!(state.session.is_signed_in());
    }

    #[test]
    fn pointer_on_dialog_buttons_routes_to_dialog_only() {
        let storage = Arc::new(MemoryStorage::with_entries([(TOKEN_KEY, "tok")]));
        let mut state = signed_in_state(storage.clone());
        state.regions.dialog_confirm = Rect::new(10, 10, 12, 1);
        state.regions.dialog_cancel = Rect::new(30, 10, 8, 1);
        state.regions.submit = Rect::new(0, 0, 100, 100);

        state.request_logout();
        assert!(state.pointer_down(32, 10, storage.as_ref()).is_empty());
        assert!(!state.logout_dialog.is_shown());
        assert!(state.session.is_signed_in());

        state.request_logout();
        state.pointer_down(12, 10, storage.as_ref());
        assert!(!state.session.is_signed_in());
    }

    #[test]
    fn pointer_on_language_control_opens_dropdown() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage.clone());
        state.language.set_regions(Rect::new(0, 20, 30, 3), None);

        state.pointer_down(5, 21, storage.as_ref());

        assert!(state.language.is_open());
        assert_eq!(state.focus, Focus::Language);
        assert!(!state.code.is_focused());
    }

    #[test]
    fn pointer_selection_moves_focus_past_the_dropdown() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage.clone());
        state.language.set_regions(Rect::new(0, 20, 30, 3), None);
        state.pointer_down(5, 21, storage.as_ref());
        state
            .language
            .set_regions(Rect::new(0, 20, 30, 3), Some(Rect::new(0, 23, 30, 6)));

        assert!(state.pointer_down(5, 26, storage.as_ref()).is_empty());

        assert_eq!(state.selected_language(), Language::Python);
        assert_eq!(state.focus, Focus::Submit);
        assert!(!state.language.is_focused());

        state.set_focus(Focus::Language);
        assert!(state.language.is_focused());
    }

    #[test]
    fn keyboard_commit_hands_focus_to_submit() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage);
        state.set_focus(Focus::Language);
        state.language.toggle_open();
        state.language.highlight_next();

        assert_eq!(state.commit_language(), Some(Language::JavaScript));
        assert_eq!(state.focus, Focus::Submit);
        assert!(!state.language.is_open());
    }

    #[test]
    fn invalid_contact_email_notifies_and_sends_nothing() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage);
        state.show_screen(Screen::Contact);
        state.contact.push_str("Ada");
        state.contact.set_field(ContactField::Email);
        state.contact.push_str("ada.example.com");
        state.contact.set_field(ContactField::Message);
        state.contact.push_str("Hi");

        assert!(state.send_contact().is_empty());

        let notification = state.active_notification().expect("notification");
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, INVALID_EMAIL_MESSAGE);
        assert!(!state.contact.is_sending());
    }

    #[test]
    fn contact_send_succeeds_then_resets_from_the_button() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage.clone());
        state.show_screen(Screen::Contact);
        assert!(!state.code.is_focused());
        state.contact.push_str("Ada");
        state.contact.set_field(ContactField::Email);
        state.contact.push_str("ada@example.com");
        state.contact.set_field(ContactField::Message);
        state.contact.push_str("Hi");
        state.regions.contact_send = Rect::new(40, 20, 20, 3);

        let effects = state.pointer_down(45, 21, storage.as_ref());
        let Some(Effect::SendContact(pending)) = effects.first() else {
            panic!("expected contact send, got {effects:?}");
        };
        assert_eq!(pending.message.email, "ada@example.com");
        assert_eq!(
            state.operation_display().as_deref().map(|s| s.ends_with("Sending...")),
            Some(true)
        );

        state.finish_contact(pending.request_id, Ok(()));
        let notification = state.active_notification().expect("notification");
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, SENT_MESSAGE);

        assert!(state.pointer_down(45, 21, storage.as_ref()).is_empty());
        assert!(!state.contact.is_sent());
        assert_eq!(state.contact.name(), "");

        state.show_screen(Screen::Review);
        assert!(state.code.is_focused());
    }

    #[test]
    fn theme_toggle_region_flips_preference() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage.clone());
        state.regions.theme_toggle = Rect::new(70, 1, 6, 1);

        state.pointer_down(72, 1, storage.as_ref());

        assert_eq!(state.theme.preference(), ThemePreference::Dark);
    }

    #[test]
    fn notifications_expire() {
        let storage = Arc::new(MemoryStorage::default());
        let mut state = signed_in_state(storage);
        state.set_notification_duration(Duration::from_millis(10));

        state.notify(NotificationKind::Error, "boom");
        assert_eq!(state.notifications().len(), 1);

        state.prune_notifications(Instant::now() + Duration::from_secs(1));
        assert!(state.notifications().is_empty());
        assert!(state.active_notification().is_none());
    }
}
