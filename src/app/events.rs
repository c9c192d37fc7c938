//! Background worker messages and async tasks.

use crate::api::client::{ReviewApi, ReviewResponse};
use crate::api::contact::ContactSender;
use crate::api::errors::ApiError;
use crate::app::state::contact::PendingContact;
use crate::app::state::submission::PendingReview;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Message sent from background workers to the UI event loop.
#[derive(Debug)]
pub enum WorkerMessage {
    ReviewFinished {
        request_id: u64,
        result: Result<ReviewResponse, ApiError>,
    },
    FeedbackFocusDue {
        request_id: u64,
    },
    ContactFinished {
        request_id: u64,
        result: Result<(), ApiError>,
    },
}

/// Handles of spawned workers, aborted when superseded or on teardown.
#[derive(Debug, Default)]
pub struct WorkerTasks {
    review: Option<JoinHandle<()>>,
    feedback_focus: Option<JoinHandle<()>>,
    contact: Option<JoinHandle<()>>,
}

impl WorkerTasks {
    pub fn set_review(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.review.replace(handle) {
            previous.abort();
        }
    }

    pub fn set_feedback_focus(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.feedback_focus.replace(handle) {
            previous.abort();
        }
    }

    pub fn set_contact(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.contact.replace(handle) {
            previous.abort();
        }
    }

    /// Aborts every outstanding worker. Returns whether a review request was still running.
    pub fn abort_all(&mut self) -> bool {
        let review_running = self
            .review
            .take()
            .is_some_and(|handle| {
                let running = !handle.is_finished();
                handle.abort();
                running
            });
        for handle in [self.feedback_focus.take(), self.contact.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
        review_running
    }
}

impl Drop for WorkerTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Spawns the review request. Always reports back, even on failure.
pub fn spawn_submit_review(
    tx: UnboundedSender<WorkerMessage>,
    api: Arc<dyn ReviewApi>,
    pending: PendingReview,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let PendingReview {
            request_id,
            request,
            token,
        } = pending;

        let result = api.submit(&request, &token).await;
        let _ = tx.send(WorkerMessage::ReviewFinished { request_id, result });
    })
}

/// Spawns delivery of a contact message. Always reports back.
pub fn spawn_send_contact(
    tx: UnboundedSender<WorkerMessage>,
    sender: Arc<dyn ContactSender>,
    pending: PendingContact,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = sender.send(&pending.message).await;
        let _ = tx.send(WorkerMessage::ContactFinished {
            request_id: pending.request_id,
            result,
        });
    })
}

/// Spawns the delayed feedback-focus timer for a successful review.
pub fn spawn_feedback_focus(
    tx: UnboundedSender<WorkerMessage>,
    request_id: u64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(WorkerMessage::FeedbackFocusDue { request_id });
    })
}
