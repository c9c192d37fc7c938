//! Contact form: field editing, local validation, and send tracking.

use crate::api::errors::ApiError;
use crate::domain::{ContactMessage, NotificationKind};
use regex::Regex;
use std::sync::LazyLock;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const MISSING_FIELD_MESSAGE: &str = "Please fill in every field before sending.";
pub const SENT_MESSAGE: &str = "Thank you! We'll get back to you soon.";
pub const SEND_FAILED_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Contact form is not configured. Set the [contact] section in config.toml.";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Keyboard target inside the contact form, in tab order.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ContactField {
    #[default]
    Name,
    Email,
    Message,
    Send,
}

impl ContactField {
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Message,
            Self::Message => Self::Send,
            Self::Send => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::Send,
            Self::Email => Self::Name,
            Self::Message => Self::Email,
            Self::Send => Self::Message,
        }
    }

    pub fn is_text(self) -> bool {
        !matches!(self, Self::Send)
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ContactStatus {
    #[default]
    Editing,
    Sending {
        request_id: u64,
    },
    Sent,
}

/// Why a send was refused before anything left the process.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ContactRejection {
    InvalidEmail,
    MissingField,
    Busy,
}

impl ContactRejection {
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::InvalidEmail => Some(INVALID_EMAIL_MESSAGE),
            Self::MissingField => Some(MISSING_FIELD_MESSAGE),
            Self::Busy => None,
        }
    }
}

/// A validated message ready for the sender.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PendingContact {
    pub request_id: u64,
    pub message: ContactMessage,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
    field: ContactField,
    email_error: Option<&'static str>,
    status: ContactStatus,
    last_request_id: u64,
}

impl ContactForm {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> ContactField {
        self.field
    }

    pub fn set_field(&mut self, field: ContactField) {
        self.field = field;
    }

    pub fn focus_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn focus_prev(&mut self) {
        self.field = self.field.prev();
    }

    /// Inline error shown under the email field while it does not validate.
    pub fn email_error(&self) -> Option<&'static str> {
        self.email_error
    }

    pub fn status(&self) -> ContactStatus {
        self.status
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.status, ContactStatus::Sending { .. })
    }

    pub fn is_sent(&self) -> bool {
        self.status == ContactStatus::Sent
    }

    fn editable(&self) -> bool {
        self.status == ContactStatus::Editing && self.field.is_text()
    }

    pub fn push_char(&mut self, ch: char) {
        if self.editable() {
            self.active_text().push(ch);
            self.revalidate_email();
        }
    }

    /// Inserts pasted text. Single-line fields keep only the first line.
    pub fn push_str(&mut self, pasted: &str) {
        if !self.editable() {
            return;
        }
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        let text = match self.field {
            ContactField::Message => normalized.as_str(),
            _ => normalized.lines().next().unwrap_or_default(),
        };
        self.active_text().push_str(text);
        self.revalidate_email();
    }

    /// Enter inserts a newline in the message body and advances from single-line fields.
    pub fn newline(&mut self) {
        match self.field {
            ContactField::Message if self.editable() => self.message.push('\n'),
            ContactField::Name | ContactField::Email => self.focus_next(),
            ContactField::Message | ContactField::Send => {}
        }
    }

    pub fn backspace(&mut self) {
        if self.editable() {
            self.active_text().pop();
            self.revalidate_email();
        }
    }

    /// Validates the form and, if it holds, moves to `Sending`.
    pub fn submit(&mut self) -> Result<PendingContact, ContactRejection> {
        if self.status != ContactStatus::Editing {
            tracing::debug!(status = ?self.status, "ignoring contact send");
            return Err(ContactRejection::Busy);
        }

        let email = self.email.trim();
        if !is_valid_email(email) {
            self.email_error = Some(INVALID_EMAIL_MESSAGE);
            self.field = ContactField::Email;
            return Err(ContactRejection::InvalidEmail);
        }
        if self.name.trim().is_empty() {
            self.field = ContactField::Name;
            return Err(ContactRejection::MissingField);
        }
        if self.message.trim().is_empty() {
            self.field = ContactField::Message;
            return Err(ContactRejection::MissingField);
        }

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        let message = ContactMessage {
            name: self.name.trim().to_owned(),
            email: email.to_owned(),
            message: self.message.clone(),
        };
        self.status = ContactStatus::Sending { request_id };
        tracing::info!(request_id, "contact message validated");

        Ok(PendingContact {
            request_id,
            message,
        })
    }

    /// Applies a finished send. Returns the notification to show, or `None` for a stale result.
    pub fn resolve(
        &mut self,
        request_id: u64,
        outcome: Result<(), ApiError>,
    ) -> Option<(NotificationKind, &'static str)> {
        if self.status != (ContactStatus::Sending { request_id }) {
            tracing::debug!(request_id, "dropping stale contact result");
            return None;
        }

        match outcome {
            Ok(()) => {
                self.status = ContactStatus::Sent;
                Some((NotificationKind::Success, SENT_MESSAGE))
            }
            Err(error) => {
                tracing::warn!(request_id, %error, "contact message failed");
                self.status = ContactStatus::Editing;
                self.field = ContactField::Send;
                let message = match error {
                    ApiError::Config(_) => NOT_CONFIGURED_MESSAGE,
                    _ => SEND_FAILED_MESSAGE,
                };
                Some((NotificationKind::Error, message))
            }
        }
    }

    /// Clears every field so another message can be written. Ignored while sending.
    pub fn reset(&mut self) {
        if self.is_sending() {
            return;
        }
        let last_request_id = self.last_request_id;
        *self = Self {
            last_request_id,
            ..Self::default()
        };
    }

    /// Abandons an in-flight send on teardown.
    pub fn cancel_in_flight(&mut self) -> bool {
        if !self.is_sending() {
            return false;
        }
        self.status = ContactStatus::Editing;
        true
    }

    fn active_text(&mut self) -> &mut String {
        match self.field {
            ContactField::Name | ContactField::Send => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Message => &mut self.message,
        }
    }

    fn revalidate_email(&mut self) {
        if self.field == ContactField::Email {
            self.email_error =
                (!is_valid_email(self.email.trim())).then_some(INVALID_EMAIL_MESSAGE);
        }
    }
}
