//! Subscription-registration service adapter.
//!
//! Posts links to `POST /api/config/add` and maps the reply onto a
//! [`SubmissionOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use msgwait_core::{
    config::SubscriptionApiConfig,
    errors::Error,
    ports::{SubmissionFailure, SubmissionOutcome, SubscriptionPort},
    Result,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Substrings of the API `error` field that mean "already registered".
/// Matched against the lowercased error.
const DUPLICATE_MARKERS: [&str; 2] = ["already exists", "已存在"];

#[derive(Serialize)]
struct AddRequest<'a> {
    sub_url: &'a str,
}

/// Both fields may be missing or `null`; either means empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddResponse {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SubscriptionClient {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl SubscriptionClient {
    pub fn new(api: &SubscriptionApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: format!("http://{}/api/config/add", api.host),
            api_key: api.api_key.clone(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubscriptionPort for SubscriptionClient {
    async fn submit(&self, link: &str) -> SubmissionOutcome {
        let resp = match self
            .http
            .post(&self.endpoint)
            .header("X-API-Key", &self.api_key)
            .json(&AddRequest { sub_url: link })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return SubmissionOutcome::Failed(SubmissionFailure::Transport(e.to_string())),
        };

        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                return SubmissionOutcome::Failed(SubmissionFailure::Transport(format!(
                    "reading response: {e}"
                )))
            }
        };
        tracing::debug!(status, link, "subscription api replied");

        classify_response(status, &body)
    }
}

/// Map a raw API reply onto an outcome.
pub fn classify_response(status: u16, body: &str) -> SubmissionOutcome {
    if !(200..300).contains(&status) {
        return SubmissionOutcome::Failed(SubmissionFailure::Status {
            code: status,
            body: body.to_string(),
        });
    }

    let parsed: AddResponse = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return SubmissionOutcome::Failed(SubmissionFailure::Decode(e.to_string())),
    };

    let error = parsed.error.unwrap_or_default();
    if error.is_empty() {
        return SubmissionOutcome::Added(parsed.message.unwrap_or_default());
    }
    if is_duplicate_error(&error) {
        return SubmissionOutcome::Duplicate;
    }
    SubmissionOutcome::Failed(SubmissionFailure::Api(error))
}

pub fn is_duplicate_error(error: &str) -> bool {
    let lower = error.to_lowercase();
    DUPLICATE_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_markers() {
        assert!(is_duplicate_error("already exists"));
        assert!(is_duplicate_error("Subscription ALREADY EXISTS"));
        assert!(is_duplicate_error("订阅已存在"));
        assert!(!is_duplicate_error("invalid url"));
    }

    #[test]
    fn classification() {
        assert_eq!(
            classify_response(200, r#"{"message":"added","error":""}"#),
            SubmissionOutcome::Added("added".to_string())
        );
        assert_eq!(
            classify_response(200, r#"{"message":"added"}"#),
            SubmissionOutcome::Added("added".to_string())
        );
        assert_eq!(
            classify_response(200, r#"{"message":"ok","error":null}"#),
            SubmissionOutcome::Added("ok".to_string())
        );
        assert_eq!(
            classify_response(200, r#"{"message":null,"error":null}"#),
            SubmissionOutcome::Added(String::new())
        );
        assert_eq!(
            classify_response(200, r#"{"error":"already exists"}"#),
            SubmissionOutcome::Duplicate
        );
        assert_eq!(
            classify_response(201, r#"{"error":"订阅已存在"}"#),
            SubmissionOutcome::Duplicate
        );
        assert_eq!(
            classify_response(200, r#"{"error":"quota exceeded"}"#),
            SubmissionOutcome::Failed(SubmissionFailure::Api("quota exceeded".to_string()))
        );
        assert_eq!(
            classify_response(409, r#"{"error":"already exists"}"#),
            SubmissionOutcome::Failed(SubmissionFailure::Status {
                code: 409,
                body: r#"{"error":"already exists"}"#.to_string()
            })
        );
        assert!(matches!(
            classify_response(200, "<html>"),
            SubmissionOutcome::Failed(SubmissionFailure::Decode(_))
        ));
    }

    fn client_for(server: &mockito::Server) -> SubscriptionClient {
        SubscriptionClient::new(&SubscriptionApiConfig {
            host: server.host_with_port(),
            api_key: "k3y".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn submit_posts_link_with_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/config/add")
            .match_header("x-api-key", "k3y")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "sub_url": "https://example.com/x"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"subscription added","error":""}"#)
            .create_async()
            .await;

        let out = client_for(&server).submit("https://example.com/x").await;
        assert_eq!(out, SubmissionOutcome::Added("subscription added".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn submit_reports_duplicates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/config/add")
            .with_status(200)
            .with_body(r#"{"error":"订阅已存在"}"#)
            .create_async()
            .await;

        let out = client_for(&server).submit("https://example.com/x").await;
        assert_eq!(out, SubmissionOutcome::Duplicate);
    }

    #[tokio::test]
    async fn submit_reports_status_failures() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/config/add")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let out = client_for(&server).submit("https://example.com/x").await;
        assert_eq!(
            out,
            SubmissionOutcome::Failed(SubmissionFailure::Status {
                code: 401,
                body: "bad key".to_string()
            })
        );
    }

    #[tokio::test]
    async fn submit_reports_transport_failures() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = SubscriptionClient::new(&SubscriptionApiConfig {
            host: "127.0.0.1:9".to_string(),
            api_key: String::new(),
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/api/config/add");

        let out = client.submit("https://example.com/x").await;
        assert!(matches!(
            out,
            SubmissionOutcome::Failed(SubmissionFailure::Transport(_))
        ));
    }
}
