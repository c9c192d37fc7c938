//! Submission workflow: validation, in-flight tracking, and terminal outcomes.
//!
//! Transitions are pure. Side effects come back as [`Effect`] values that the
//! runtime executes (spawn the request, show a notification, schedule the
//! feedback focus), so the machine can be driven headlessly in tests.

use crate::api::client::ReviewResponse;
use crate::api::errors::ApiError;
use crate::app::state::contact::PendingContact;
use crate::domain::{
    Credentials, ErrorKind, Language, NotificationKind, ReviewPoint, SubmissionRequest,
};
use crate::feedback;
use secrecy::SecretString;

pub const FALLBACK_FEEDBACK: &str = "No feedback available.";
pub const SUCCESS_MESSAGE: &str = "Code reviewed successfully!";

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    InFlight {
        request_id: u64,
    },
    Succeeded {
        feedback_text: String,
    },
    Failed {
        reason: ErrorKind,
    },
}

/// A validated request ready to be dispatched.
#[derive(Debug, Clone)]
pub struct PendingReview {
    pub request_id: u64,
    pub request: SubmissionRequest,
    pub token: SecretString,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    Dispatch(PendingReview),
    Notify {
        kind: NotificationKind,
        message: String,
    },
    /// Bring the feedback region into view after the layout settles.
    ScheduleFeedbackFocus { request_id: u64 },
    /// Deliver a validated contact form message.
    SendContact(PendingContact),
}

/// At-most-one-in-flight submission state machine.
#[derive(Debug, Clone, Default)]
pub struct SubmissionMachine {
    state: SubmissionState,
    points: Vec<ReviewPoint>,
    last_request_id: u64,
    succeeded_request_id: Option<u64>,
}

impl SubmissionMachine {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Review points derived from the latest successful feedback.
    pub fn points(&self) -> &[ReviewPoint] {
        &self.points
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SubmissionState::InFlight { .. })
    }

    pub fn in_flight_request(&self) -> Option<u64> {
        match self.state {
            SubmissionState::InFlight { request_id } => Some(request_id),
            _ => None,
        }
    }

    /// Whether the machine is still showing the success for `request_id`.
    pub fn is_showing_success_for(&self, request_id: u64) -> bool {
        matches!(self.state, SubmissionState::Succeeded { .. })
            && self.succeeded_request_id == Some(request_id)
    }

    /// Validates local preconditions and, if they hold, requests a dispatch.
    ///
    /// Calls made while a request is in flight are dropped with no effects.
    pub fn submit(
        &mut self,
        code: &str,
        language: Language,
        credentials: &Credentials,
    ) -> Vec<Effect> {
        if self.is_busy() {
            tracing::debug!("ignoring submit while a review request is in flight");
            return Vec::new();
        }

        self.state = SubmissionState::Validating;

        let validated = validate(code, credentials);
        let (token, user_id) = match validated {
            Ok(pair) => pair,
            Err(reason) => {
                tracing::info!(%reason, "submission rejected before dispatch");
                return self.fail(reason);
            }
        };

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.state = SubmissionState::InFlight { request_id };

        vec![Effect::Dispatch(PendingReview {
            request_id,
            request: SubmissionRequest {
                code: code.to_owned(),
                language,
                user_id,
            },
            token,
        })]
    }

    /// Applies the outcome of a dispatched request. Stale outcomes are ignored.
    pub fn resolve(
        &mut self,
        request_id: u64,
        outcome: Result<ReviewResponse, ApiError>,
    ) -> Vec<Effect> {
        if self.in_flight_request() != Some(request_id) {
            tracing::debug!(request_id, "dropping stale review outcome");
            return Vec::new();
        }

        match outcome {
            Ok(response) if response.status == 200 => {
                let feedback_text = response
                    .ai_feedback
                    .unwrap_or_else(|| FALLBACK_FEEDBACK.to_owned());
                self.points = feedback::parse(&feedback_text);
                self.succeeded_request_id = Some(request_id);
                self.state = SubmissionState::Succeeded { feedback_text };

                vec![
                    Effect::Notify {
                        kind: NotificationKind::Success,
                        message: SUCCESS_MESSAGE.to_owned(),
                    },
                    Effect::ScheduleFeedbackFocus { request_id },
                ]
            }
            Ok(response) => {
                tracing::warn!(status = response.status, "unexpected review response status");
                self.fail(ErrorKind::UnexpectedResponse)
            }
            Err(error) => {
                tracing::warn!(%error, "review request failed");
                self.fail(error.kind())
            }
        }
    }

    /// Abandons the in-flight request without a notification.
    pub fn cancel_in_flight(&mut self) -> bool {
        if self.is_busy() {
            self.state = SubmissionState::Idle;
            return true;
        }
        false
    }

    fn fail(&mut self, reason: ErrorKind) -> Vec<Effect> {
        self.state = SubmissionState::Failed { reason };
        vec![Effect::Notify {
            kind: NotificationKind::Error,
            message: reason.message().to_owned(),
        }]
    }
}

fn validate(code: &str, credentials: &Credentials) -> Result<(SecretString, String), ErrorKind> {
    if code.trim().is_empty() {
        return Err(ErrorKind::EmptyInput);
    }
    let token = credentials
        .usable_token()
        .cloned()
        .ok_or(ErrorKind::Unauthenticated)?;
    let user_id = credentials
        .usable_user_id()
        .map(str::to_owned)
        .ok_or(ErrorKind::MissingUserId)?;
    Ok((token, user_id))
}

#[cfg(test)]
mod tests {
    use super::{
        Effect, FALLBACK_FEEDBACK, PendingReview, SUCCESS_MESSAGE, SubmissionMachine,
        SubmissionState,
    };
    use crate::api::client::ReviewResponse;
    use crate::api::errors::ApiError;
    use crate::domain::{Credentials, ErrorKind, Language, NotificationKind};
    use secrecy::{ExposeSecret, SecretString};

    fn credentials() -> Credentials {
        Credentials {
            token: Some(SecretString::from("t0k3n".to_owned())),
            user_id: Some("u1".to_owned()),
        }
    }

    fn dispatched(effects: &[Effect]) -> Vec<&PendingReview> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Dispatch(pending) => Some(pending),
                _ => None,
            })
            .collect()
    }

    fn notifications(effects: &[Effect]) -> Vec<(NotificationKind, &str)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Notify { kind, message } => Some((*kind, message.as_str())),
                _ => None,
            })
            .collect()
    }

    fn ok(feedback: Option<&str>) -> Result<ReviewResponse, ApiError> {
        Ok(ReviewResponse {
            status: 200,
            ai_feedback: feedback.map(str::to_owned),
        })
    }

    #[test]
    fn blank_code_fails_without_dispatch() {
        for code in ["", "   ", "\n\t"] {
            let mut machine = SubmissionMachine::default();
            let effects = machine.submit(code, Language::Java, &credentials());

            assert!(dispatched(&effects).is_empty());
            assert_eq!(
                machine.state(),
                &SubmissionState::Failed {
                    reason: ErrorKind::EmptyInput
                }
            );
            assert_eq!(
                notifications(&effects),
                vec![(NotificationKind::Error, ErrorKind::EmptyInput.message())]
            );
        }
    }

    #[test]
    fn missing_token_fails_without_dispatch() {
        let mut machine = SubmissionMachine::default();
        let credentials = Credentials {
            token: None,
            user_id: Some("u1".to_owned()),
        };

        let effects = machine.submit("x = 1", Language::Python, &credentials);

        assert!(dispatched(&effects).is_empty());
        assert_eq!(
            machine.state(),
            &SubmissionState::Failed {
                reason: ErrorKind::Unauthenticated
            }
        );
    }

    #[test]
    fn empty_input_wins_over_missing_credentials() {
        let mut machine = SubmissionMachine::default();
        machine.submit("", Language::Java, &Credentials::default());

        assert_eq!(
            machine.state(),
            &SubmissionState::Failed {
                reason: ErrorKind::EmptyInput
            }
        );
    }

    #[test]
    fn missing_user_id_fails_after_token_check() {
        let mut machine = SubmissionMachine::default();
        let credentials = Credentials {
            token: Some(SecretString::from("t".to_owned())),
            user_id: None,
        };

        let effects = machine.submit("x", Language::Cpp, &credentials);

        assert!(dispatched(&effects).is_empty());
        assert_eq!(
            machine.state(),
            &SubmissionState::Failed {
                reason: ErrorKind::MissingUserId
            }
        );
    }

    #[test]
    fn valid_submit_dispatches_once_and_goes_in_flight() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("print(1)", Language::Python, &credentials());

        let pending = dispatched(&effects);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.code, "print(1)");
        assert_eq!(pending[0].request.language, Language::Python);
        assert_eq!(pending[0].request.user_id, "u1");
        assert_eq!(pending[0].token.expose_secret(), "t0k3n");
        assert!(notifications(&effects).is_empty());
        assert!(machine.is_busy());
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let mut machine = SubmissionMachine::default();
        machine.submit("a", Language::Java, &credentials());
        let state_before = machine.state().clone();

        let effects = machine.submit("b", Language::Java, &credentials());

        assert!(effects.is_empty());
        assert_eq!(machine.state(), &state_before);
    }

    #[test]
    fn success_parses_points_and_schedules_focus_once() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("print(1)", Language::Python, &credentials());
        let request_id = dispatched(&effects)[0].request_id;

        let effects = machine.resolve(request_id, ok(Some("1. Good. 2. Add docstring.")));

        assert_eq!(
            machine.state(),
            &SubmissionState::Succeeded {
                feedback_text: "1. Good. 2. Add docstring.".to_owned()
            }
        );
        let rendered: Vec<String> = machine.points().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1. Good.", "2. Add docstring."]);
        assert_eq!(
            notifications(&effects),
            vec![(NotificationKind::Success, SUCCESS_MESSAGE)]
        );
        let focus_effects = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::ScheduleFeedbackFocus { .. }))
            .count();
        assert_eq!(focus_effects, 1);
        assert!(machine.is_showing_success_for(request_id));
    }

    #[test]
    fn missing_feedback_uses_fallback_text() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("x", Language::Java, &credentials());
        let request_id = dispatched(&effects)[0].request_id;

        machine.resolve(request_id, ok(None));

        assert_eq!(
            machine.state(),
            &SubmissionState::Succeeded {
                feedback_text: FALLBACK_FEEDBACK.to_owned()
            }
        );
        assert_eq!(machine.points().len(), 1);
    }

    #[test]
    fn non_200_success_is_unexpected_response() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("x", Language::Java, &credentials());
        let request_id = dispatched(&effects)[0].request_id;

        let effects = machine.resolve(
            request_id,
            Ok(ReviewResponse {
                status: 204,
                ai_feedback: None,
            }),
        );

        assert_eq!(
            machine.state(),
            &SubmissionState::Failed {
                reason: ErrorKind::UnexpectedResponse
            }
        );
        assert_eq!(notifications(&effects).len(), 1);
    }

    #[test]
    fn transport_failure_is_network_error_and_allows_retry() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("x", Language::Java, &credentials());
        let request_id = dispatched(&effects)[0].request_id;

        let effects = machine.resolve(
            request_id,
            Err(ApiError::Transport("connection refused".to_owned())),
        );
        assert_eq!(
            notifications(&effects),
            vec![(NotificationKind::Error, ErrorKind::NetworkError.message())]
        );

        let retry = machine.submit("x", Language::Java, &credentials());
        let pending = dispatched(&retry);
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].request_id, request_id);
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut machine = SubmissionMachine::default();
        let effects = machine.submit("x", Language::Java, &credentials());
        let request_id = dispatched(&effects)[0].request_id;

        assert!(machine.resolve(request_id + 1, ok(Some("1. a"))).is_empty());
        assert!(machine.is_busy());

        machine.resolve(request_id, ok(Some("1. a")));
        assert!(machine.resolve(request_id, ok(Some("1. b"))).is_empty());
        assert_eq!(machine.points()[0].text, "a");
    }

    #[test]
    fn points_come_only_from_latest_success() {
        let mut machine = SubmissionMachine::default();
        let first = dispatched(&machine.submit("x", Language::Java, &credentials()))[0].request_id;
        machine.resolve(first, ok(Some("1. One. 2. Two.")));

        let second = dispatched(&machine.submit("y", Language::Java, &credentials()))[0].request_id;
        machine.resolve(second, ok(Some("Only one.")));

        let texts: Vec<&str> = machine.points().iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Only one."]);
        assert!(!machine.is_showing_success_for(first));
    }

    #[test]
    fn cancel_in_flight_returns_to_idle_and_drops_late_outcome() {
        let mut machine = SubmissionMachine::default();
        let request_id =
            dispatched(&machine.submit("x", Language::Java, &credentials()))[0].request_id;

        assert!(machine.cancel_in_flight());
        assert_eq!(machine.state(), &SubmissionState::Idle);
        assert!(machine.resolve(request_id, ok(Some("late"))).is_empty());
        assert!(!machine.cancel_in_flight());
    }
}
