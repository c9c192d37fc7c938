//! Domain models shared across the API, state, and UI layers.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source language attached to a review submission.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Java,
    JavaScript,
    Python,
    Cpp,
}

impl Language {
    /// Every language offered by the selector, in display order.
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::JavaScript,
        Language::Python,
        Language::Cpp,
    ];

    /// Identifier sent on the wire.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Cpp => "cpp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::JavaScript => "JavaScript",
            Self::Python => "Python",
            Self::Cpp => "C++",
        }
    }

    /// File extension used for syntax lookup and editor temp files.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::JavaScript => "js",
            Self::Python => "py",
            Self::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "java" => Ok(Self::Java),
            "javascript" | "js" => Ok(Self::JavaScript),
            "python" | "py" => Ok(Self::Python),
            "cpp" | "c++" => Ok(Self::Cpp),
            other => Err(format!(
                "unsupported language `{other}` (expected java, javascript, python, or cpp)"
            )),
        }
    }
}

/// Body of `POST /api/code-review/submit`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub code: String,
    pub language: Language,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Message written in the contact form. Field names follow the email template.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ContactMessage {
    #[serde(rename = "user_name")]
    pub name: String,
    #[serde(rename = "user_email")]
    pub email: String,
    pub message: String,
}

/// Credentials read from persisted storage and handed to the submission machine.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<SecretString>,
    pub user_id: Option<String>,
}

impl Credentials {
    /// Returns the token when present and non-blank.
    pub fn usable_token(&self) -> Option<&SecretString> {
        self.token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
    }

    /// Returns the user id when present and non-blank.
    pub fn usable_user_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// One numbered feedback item extracted from the review text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReviewPoint {
    pub index: usize,
    pub text: String,
}

impl fmt::Display for ReviewPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index, self.text)
    }
}

/// Failure reasons surfaced by the submission workflow.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    EmptyInput,
    Unauthenticated,
    MissingUserId,
    NetworkError,
    UnexpectedResponse,
}

impl ErrorKind {
    /// Notification text shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyInput => "Please enter some code before submitting.",
            Self::Unauthenticated => "You must be logged in to submit code.",
            Self::MissingUserId => "User ID is missing. Please log in again.",
            Self::NetworkError => "Failed to get review. Please try again.",
            Self::UnexpectedResponse => "Unexpected response from server.",
        }
    }

    /// Whether the failure was detected before any request was sent.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::Unauthenticated | Self::MissingUserId
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EmptyInput => "empty input",
            Self::Unauthenticated => "unauthenticated",
            Self::MissingUserId => "missing user id",
            Self::NetworkError => "network error",
            Self::UnexpectedResponse => "unexpected response",
        };
        f.write_str(name)
    }
}

/// Kind of transient message shown in the toast area.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Guarded actions that need a confirmation before they run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GuardedAction {
    Logout,
}

impl GuardedAction {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Logout => "Are you sure you want to logout?",
        }
    }

    pub fn confirm_label(self) -> &'static str {
        match self {
            Self::Logout => "Yes, Logout",
        }
    }
}

/// Page shown below the navigation header.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Screen {
    #[default]
    Review,
    Contact,
}

/// Keyboard focus target on the review screen.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Focus {
    #[default]
    Code,
    Language,
    Submit,
    Feedback,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Code => Self::Language,
            Self::Language => Self::Submit,
            Self::Submit => Self::Feedback,
            Self::Feedback => Self::Code,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Code => Self::Feedback,
            Self::Language => Self::Code,
            Self::Submit => Self::Language,
            Self::Feedback => Self::Submit,
        }
    }
}
