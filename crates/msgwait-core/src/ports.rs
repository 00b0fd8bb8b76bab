use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{domain::Peer, Result};

// ============== Subscription service ==============

/// Why a submission did not register a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Non-2xx response.
    Status { code: u16, body: String },
    /// Connect / timeout / DNS failure.
    Transport(String),
    /// 2xx but the body was not the expected JSON.
    Decode(String),
    /// 2xx with a non-duplicate `error` field.
    Api(String),
}

impl fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionFailure::Status { code, body } => write!(f, "status {code}: {body}"),
            SubmissionFailure::Transport(e) => write!(f, "request failed: {e}"),
            SubmissionFailure::Decode(e) => write!(f, "bad response: {e}"),
            SubmissionFailure::Api(e) => f.write_str(e),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Registered; carries the service's `message`.
    Added(String),
    /// The service already knows this link.
    Duplicate,
    Failed(SubmissionFailure),
}

/// Port for the subscription-registration service.
///
/// Implementations never retry and never return `Err`: every failure is a
/// `SubmissionOutcome::Failed`.
#[async_trait]
pub trait SubscriptionPort: Send + Sync {
    async fn submit(&self, link: &str) -> SubmissionOutcome;
}

// ============== Message history ==============

/// Capabilities / feature flags of a transport implementation.
#[derive(Clone, Copy, Debug)]
pub struct TransportCapabilities {
    /// Dialog listing and history fetch are available.
    pub supports_history: bool,
}

/// An entry of the current account's dialog list.
#[derive(Clone, Debug)]
pub struct Dialog {
    pub peer: Peer,
    pub title: String,
    /// Credential needed to address the peer in further requests.
    pub access_hash: Option<i64>,
}

/// A channel resolved from the dialog list, ready for history queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelHandle {
    pub channel_id: i64,
    pub access_hash: i64,
}

#[derive(Clone, Debug)]
pub struct HistoryMessage {
    /// Empty for service messages and media without a caption.
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Port for the history half of the transport.
#[async_trait]
pub trait HistoryPort: Send + Sync {
    fn capabilities(&self) -> TransportCapabilities;

    async fn dialogs(&self) -> Result<Vec<Dialog>>;

    /// Most recent messages first, at most `limit`.
    async fn history(&self, channel: &ChannelHandle, limit: usize) -> Result<Vec<HistoryMessage>>;
}
