//! HTTP client for `POST /api/code-review/submit`.

use crate::api::errors::{ApiError, Result, format_error_chain, truncate_body};
use crate::domain::SubmissionRequest;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

pub const SUBMIT_PATH: &str = "/api/code-review/submit";

const FEEDBACK_FIELD: &str = "aiFeedback";

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Successful HTTP exchange with the review service.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReviewResponse {
    pub status: u16,
    pub ai_feedback: Option<String>,
}

/// Review service boundary. The runtime only talks to the service through this trait.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn submit(
        &self,
        request: &SubmissionRequest,
        token: &SecretString,
    ) -> Result<ReviewResponse>;
}

/// `reqwest`-backed review client.
#[derive(Debug, Clone)]
pub struct HttpReviewClient {
    http: reqwest::Client,
    submit_url: String,
}

impl HttpReviewClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ApiError::Config("API base URL is empty".to_owned()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Config(format_error_chain(&error)))?;

        Ok(Self {
            http,
            submit_url: format!("{base_url}{SUBMIT_PATH}"),
        })
    }

    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }
}

#[async_trait]
impl ReviewApi for HttpReviewClient {
    async fn submit(
        &self,
        request: &SubmissionRequest,
        token: &SecretString,
    ) -> Result<ReviewResponse> {
        let started = Instant::now();
        tracing::info!(
            url = %self.submit_url,
            language = request.language.as_api_str(),
            code_bytes = request.code.len(),
            "submitting code for review"
        );

        let response = self
            .http
            .post(&self.submit_url)
            .bearer_auth(token.expose_secret())
            .header(ACCEPT, "application/json")
            .header(
                USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
            .json(request)
            .send()
            .await
            .inspect_err(|error| tracing::error!(error = %error, "review request failed"))?;

        let status = response.status();
        let body = response.bytes().await?;
        let elapsed_ms = started.elapsed().as_millis();

        if !status.is_success() {
            let preview = truncate_body(&String::from_utf8_lossy(&body), ERROR_BODY_PREVIEW_CHARS);
            tracing::warn!(status = status.as_u16(), elapsed_ms, "review service rejected request");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let ai_feedback = decode_feedback(&body).inspect_err(|error| {
            tracing::warn!(status = status.as_u16(), %error, "review response was not usable");
        })?;

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms,
            feedback_chars = ai_feedback.as_ref().map_or(0, String::len),
            "review response received"
        );

        Ok(ReviewResponse {
            status: status.as_u16(),
            ai_feedback,
        })
    }
}

/// Reads `aiFeedback` from a response body that must be a JSON object.
fn decode_feedback(body: &[u8]) -> Result<Option<String>> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|error| ApiError::Decode(error.to_string()))?;

    match object.get(FEEDBACK_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ApiError::Decode(format!(
            "`{FEEDBACK_FIELD}` must be a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpReviewClient, ReviewApi, ReviewResponse, decode_feedback};
    use crate::api::errors::ApiError;
    use crate::domain::{Language, SubmissionRequest};
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn request() -> SubmissionRequest {
        SubmissionRequest {
            code: "print(1)".to_owned(),
            language: Language::Python,
            user_id: "u1".to_owned(),
        }
    }

    fn token() -> SecretString {
        SecretString::from("secret-token".to_owned())
    }

    fn client(base_url: &str) -> HttpReviewClient {
        HttpReviewClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_body_with_bearer_auth() {
        let recorded = Recorded::default();
        let router = Router::new()
            .route(
                "/api/code-review/submit",
                post(
                    |State(recorded): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_owned);
                        recorded.requests.lock().unwrap().push((auth, body));
                        Json(json!({"aiFeedback": "1. Good. 2. Add docstring."}))
                    },
                ),
            )
            .with_state(recorded.clone());
        let base_url = spawn_server(router).await;

        let response = client(&base_url).submit(&request(), &token()).await.unwrap();

        assert_eq!(
            response,
            ReviewResponse {
                status: 200,
                ai_feedback: Some("1. Good. 2. Add docstring.".to_owned()),
            }
        );
        let requests = recorded.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.as_deref(), Some("Bearer secret-token"));
        assert_eq!(
            requests[0].1,
            json!({"code": "print(1)", "language": "python", "userId": "u1"})
        );
    }

    #[tokio::test]
    async fn missing_feedback_field_is_none() {
        let router = Router::new().route(
            "/api/code-review/submit",
            post(|| async { Json(json!({"id": 7})) }),
        );
        let base_url = spawn_server(router).await;

        let response = client(&base_url).submit(&request(), &token()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.ai_feedback, None);
    }

    #[tokio::test]
    async fn created_status_is_reported_as_is() {
        let router = Router::new().route(
            "/api/code-review/submit",
            post(|| async { (StatusCode::CREATED, Json(json!({"aiFeedback": "ok"}))) }),
        );
        let base_url = spawn_server(router).await;

        let response = client(&base_url).submit(&request(), &token()).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn server_error_maps_to_status_error() {
        let router = Router::new().route(
            "/api/code-review/submit",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model offline") }),
        );
        let base_url = spawn_server(router).await;

        let error = client(&base_url)
            .submit(&request(), &token())
            .await
            .unwrap_err();
        assert_eq!(
            error,
            ApiError::Status {
                status: 500,
                body: "model offline".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn non_object_body_is_decode_error() {
        let router = Router::new().route(
            "/api/code-review/submit",
            post(|| async { "plain text" }),
        );
        let base_url = spawn_server(router).await;

        let error = client(&base_url)
            .submit(&request(), &token())
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)), "{error:?}");
    }

    #[tokio::test]
    async fn json_arrays_are_decode_errors() {
        for body in [json!([]), json!(["1. Looks fine."])] {
            let router = Router::new().route(
                "/api/code-review/submit",
                post(move || {
                    let body = body.clone();
                    async move { Json(body) }
                }),
            );
            let base_url = spawn_server(router).await;

            let error = client(&base_url)
                .submit(&request(), &token())
                .await
                .unwrap_err();
            assert!(matches!(error, ApiError::Decode(_)), "{error:?}");
        }
    }

    #[test]
    fn feedback_must_be_a_string_on_an_object() {
        assert_eq!(decode_feedback(br#"{"aiFeedback":"1. ok"}"#), Ok(Some("1. ok".to_owned())));
        assert_eq!(decode_feedback(br#"{"aiFeedback":null}"#), Ok(None));
        assert!(matches!(
            decode_feedback(br#"{"aiFeedback":3}"#),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(decode_feedback(b"null"), Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = client(&format!("http://{addr}"))
            .submit(&request(), &token())
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Transport(_)), "{error:?}");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = client("http://localhost:8080/");
        assert_eq!(
            client.submit_url(),
            "http://localhost:8080/api/code-review/submit"
        );
        assert!(HttpReviewClient::new("  ", Duration::from_secs(1)).is_err());
    }
}
