use std::fmt;

use crate::{config::Config, domain::MessageRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptReason {
    /// Channel is whitelisted; keyword match alone was enough.
    Whitelisted,
    /// Keyword and content-filter both matched.
    ContentMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    NotMonitored,
    NoKeyword,
    NoContentMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterDecision {
    Accept(AcceptReason),
    Reject(RejectReason),
}

impl FilterDecision {
    pub fn is_accepted(self) -> bool {
        matches!(self, FilterDecision::Accept(_))
    }
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterDecision::Accept(AcceptReason::Whitelisted) => "accepted (whitelisted)",
            FilterDecision::Accept(AcceptReason::ContentMatch) => "accepted (content match)",
            FilterDecision::Reject(RejectReason::NotMonitored) => "rejected (channel not monitored)",
            FilterDecision::Reject(RejectReason::NoKeyword) => "rejected (no keyword)",
            FilterDecision::Reject(RejectReason::NoContentMatch) => {
                "rejected (not whitelisted, no content match)"
            }
        };
        f.write_str(s)
    }
}

/// Decide whether a message is interesting.
///
/// Order matters: monitored channel, keyword, whitelist, content filter. Only
/// channel-sourced messages can fail the monitored check.
pub fn evaluate(record: &MessageRecord, cfg: &Config) -> FilterDecision {
    let channel_id = record.channel_id();

    if let Some(id) = channel_id {
        if !cfg.is_monitored(id) {
            return FilterDecision::Reject(RejectReason::NotMonitored);
        }
    }

    let lower = record.text.to_lowercase();
    let keyword_hit = cfg
        .filters
        .keywords
        .iter()
        .any(|k| lower.contains(&k.to_lowercase()));
    if !keyword_hit {
        return FilterDecision::Reject(RejectReason::NoKeyword);
    }

    if channel_id.is_some_and(|id| cfg.is_whitelisted(id)) {
        return FilterDecision::Accept(AcceptReason::Whitelisted);
    }

    let content_hit = cfg
        .filters
        .content_filter
        .iter()
        .any(|term| record.text.contains(term.as_str()));
    if content_hit {
        FilterDecision::Accept(AcceptReason::ContentMatch)
    } else {
        FilterDecision::Reject(RejectReason::NoContentMatch)
    }
}
