//! Contact form delivery through the EmailJS REST endpoint.

use crate::api::errors::{ApiError, Result, format_error_chain, truncate_body};
use crate::domain::ContactMessage;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Email service credentials from the `[contact]` config section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContactSettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

/// Contact delivery boundary.
#[async_trait]
pub trait ContactSender: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ContactMessage,
}

#[derive(Debug, Clone)]
pub struct EmailJsSender {
    http: reqwest::Client,
    settings: ContactSettings,
}

impl EmailJsSender {
    pub fn new(settings: ContactSettings, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Config(format_error_chain(&error)))?;

        Ok(Self { http, settings })
    }
}

#[async_trait]
impl ContactSender for EmailJsSender {
    async fn send(&self, message: &ContactMessage) -> Result<()> {
        let body = SendBody {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            template_params: message,
        };

        let response = self
            .http
            .post(&self.settings.endpoint)
            .json(&body)
            .send()
            .await
            .inspect_err(|error| tracing::error!(%error, "contact request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "email service rejected contact message");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_body(&text, ERROR_BODY_PREVIEW_CHARS),
            });
        }

        tracing::info!(status = status.as_u16(), "contact message delivered");
        Ok(())
    }
}

/// Sender used when no email credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledContactSender;

#[async_trait]
impl ContactSender for DisabledContactSender {
    async fn send(&self, _message: &ContactMessage) -> Result<()> {
        Err(ApiError::Config(
            "no [contact] credentials configured".to_owned(),
        ))
    }
}
