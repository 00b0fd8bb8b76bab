use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    domain::{MessageRecord, Origin, Peer},
    filter::{self, FilterDecision},
    links::extract_links,
    ports::{SubmissionOutcome, SubscriptionPort},
    stats::ReceivedCounter,
};

/// Message payload as delivered by a transport adapter.
#[derive(Clone, Debug)]
pub struct RawMessage {
    pub peer: Peer,
    /// `None` for messages without text or caption.
    pub text: Option<String>,
    pub date: DateTime<Utc>,
}

/// The live message-bearing events the router understands.
#[derive(Clone, Debug)]
pub enum LiveEvent {
    NewMessage(RawMessage),
    NewChannelMessage(RawMessage),
    EditMessage(RawMessage),
    EditChannelMessage(RawMessage),
}

impl LiveEvent {
    /// Normalize into a record. Edits are treated like creations.
    pub fn into_record(self) -> Option<MessageRecord> {
        match self {
            LiveEvent::NewMessage(raw) => record_from_raw(raw, Origin::LiveNew),
            LiveEvent::NewChannelMessage(raw) => record_from_raw(raw, Origin::LiveNew),
            LiveEvent::EditMessage(raw) => record_from_raw(raw, Origin::LiveEdit),
            LiveEvent::EditChannelMessage(raw) => record_from_raw(raw, Origin::LiveEdit),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::NewMessage(_) => "new message",
            LiveEvent::NewChannelMessage(_) => "new channel message",
            LiveEvent::EditMessage(_) => "edit message",
            LiveEvent::EditChannelMessage(_) => "edit channel message",
        }
    }
}

fn record_from_raw(raw: RawMessage, origin: Origin) -> Option<MessageRecord> {
    let text = raw.text?;
    Some(MessageRecord::new(raw.peer, text, raw.date, origin))
}

/// What happened to one message.
#[derive(Clone, Debug)]
pub struct RouteReport {
    pub decision: FilterDecision,
    pub submissions: Vec<(String, SubmissionOutcome)>,
}

impl RouteReport {
    /// Accepted and yielded at least one link.
    pub fn matched(&self) -> bool {
        self.decision.is_accepted() && !self.submissions.is_empty()
    }
}

/// Runs the filter → extract → submit chain for live events and history replay.
pub struct EventRouter {
    cfg: Arc<Config>,
    subscriptions: Arc<dyn SubscriptionPort>,
    received: Arc<ReceivedCounter>,
}

impl EventRouter {
    pub fn new(cfg: Arc<Config>, subscriptions: Arc<dyn SubscriptionPort>) -> Self {
        Self {
            cfg,
            subscriptions,
            received: Arc::new(ReceivedCounter::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Shared handle to the received-event counter (for the heartbeat).
    pub fn received(&self) -> Arc<ReceivedCounter> {
        self.received.clone()
    }

    /// Count a live event and route it. Returns `None` when the message had no text.
    pub async fn handle_live(&self, event: LiveEvent) -> Option<RouteReport> {
        let n = self.received.bump();
        tracing::info!("message update received (#{n})");
        tracing::debug!(kind = event.kind(), "live event");

        let record = event.into_record()?;
        let report = self.process(&record).await;
        if report.matched() {
            tracing::info!("matched message from {} (#{n} received so far)", record.peer);
        }
        Some(report)
    }

    /// Filter, extract and submit one record, logging each link's outcome.
    pub async fn process(&self, record: &MessageRecord) -> RouteReport {
        let decision = filter::evaluate(record, &self.cfg);
        tracing::debug!(peer = %record.peer, "{decision}");

        let mut submissions = Vec::new();
        if !decision.is_accepted() {
            return RouteReport {
                decision,
                submissions,
            };
        }

        for link in extract_links(&record.text, &self.cfg.filters.link_blacklist) {
            tracing::info!("[{}] {} | {}", record.display_time(), record.peer, link);
            let outcome = self.subscriptions.submit(link).await;
            report_outcome(link, &outcome);
            submissions.push((link.to_string(), outcome));
        }

        RouteReport {
            decision,
            submissions,
        }
    }
}

fn report_outcome(link: &str, outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Added(message) => tracing::info!("  subscription added: {message}"),
        SubmissionOutcome::Duplicate => tracing::info!("  subscription already exists, skipped"),
        SubmissionOutcome::Failed(e) => tracing::warn!(link, "  subscription failed: {e}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::SubmissionFailure;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records submitted links and answers from a fixed script.
    #[derive(Default)]
    pub(crate) struct FakeSubscriptions {
        pub submitted: Mutex<Vec<String>>,
        pub duplicates: Vec<String>,
        pub failing: Vec<String>,
    }

    #[async_trait]
    impl SubscriptionPort for FakeSubscriptions {
        async fn submit(&self, link: &str) -> SubmissionOutcome {
            self.submitted.lock().unwrap().push(link.to_string());
            if self.duplicates.iter().any(|d| d == link) {
                SubmissionOutcome::Duplicate
            } else if self.failing.iter().any(|d| d == link) {
                SubmissionOutcome::Failed(SubmissionFailure::Status {
                    code: 500,
                    body: "boom".to_string(),
                })
            } else {
                SubmissionOutcome::Added("ok".to_string())
            }
        }
    }

    pub(crate) fn sale_config() -> Arc<Config> {
        Arc::new(
            Config::from_yaml_str(
                "monitor:\n  whitelist_channels: [100]\nfilters:\n  keywords: [sale]\n  content_filter: []\n  link_blacklist: [spamhost]\n",
            )
            .unwrap(),
        )
    }

    fn raw(peer: Peer, text: Option<&str>) -> RawMessage {
        RawMessage {
            peer,
            text: text.map(str::to_string),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn whitelisted_sale_is_submitted() {
        let subs = Arc::new(FakeSubscriptions::default());
        let router = EventRouter::new(sale_config(), subs.clone());

        let report = router
            .handle_live(LiveEvent::NewChannelMessage(raw(
                Peer::Channel(100),
                Some("Big sale! https://example.com/x"),
            )))
            .await
            .unwrap();

        assert!(report.matched());
        assert_eq!(*subs.submitted.lock().unwrap(), vec!["https://example.com/x"]);
        assert_eq!(
            report.submissions,
            vec![(
                "https://example.com/x".to_string(),
                SubmissionOutcome::Added("ok".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn rejected_message_submits_nothing() {
        let subs = Arc::new(FakeSubscriptions::default());
        let router = EventRouter::new(sale_config(), subs.clone());

        let report = router
            .handle_live(LiveEvent::NewChannelMessage(raw(
                Peer::Channel(200),
                Some("Big sale! https://example.com/x"),
            )))
            .await
            .unwrap();

        assert!(!report.matched());
        assert!(subs.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blacklisted_link_never_reaches_the_service() {
        let subs = Arc::new(FakeSubscriptions::default());
        let router = EventRouter::new(sale_config(), subs.clone());

        let report = router
            .handle_live(LiveEvent::NewChannelMessage(raw(
                Peer::Channel(100),
                Some("sale https://spamhost.test/track?x https://good.test/ok"),
            )))
            .await
            .unwrap();

        assert_eq!(*subs.submitted.lock().unwrap(), vec!["https://good.test/ok"]);
        assert_eq!(report.submissions.len(), 1);
    }

    #[tokio::test]
    async fn failures_and_duplicates_do_not_stop_later_links() {
        let subs = Arc::new(FakeSubscriptions {
            duplicates: vec!["https://a.example/1".to_string()],
            failing: vec!["https://b.example/2".to_string()],
            ..Default::default()
        });
        let router = EventRouter::new(sale_config(), subs.clone());

        let report = router
            .handle_live(LiveEvent::EditChannelMessage(raw(
                Peer::Channel(100),
                Some("sale\nhttps://a.example/1\nhttps://b.example/2\nhttps://c.example/3"),
            )))
            .await
            .unwrap();

        let outcomes: Vec<_> = report.submissions.iter().map(|(_, o)| o.clone()).collect();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], SubmissionOutcome::Duplicate);
        assert!(matches!(outcomes[1], SubmissionOutcome::Failed(_)));
        assert_eq!(outcomes[2], SubmissionOutcome::Added("ok".to_string()));
    }

    #[tokio::test]
    async fn every_live_event_is_counted() {
        let router = EventRouter::new(sale_config(), Arc::new(FakeSubscriptions::default()));
        let counter = router.received();

        assert!(router
            .handle_live(LiveEvent::NewMessage(raw(Peer::Private(1), None)))
            .await
            .is_none());
        router
            .handle_live(LiveEvent::EditMessage(raw(Peer::Group(2), Some("hi"))))
            .await;

        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn all_event_kinds_normalize_to_the_same_shape() {
        let base = raw(Peer::Group(9), Some("text"));
        let events = [
            LiveEvent::NewMessage(base.clone()),
            LiveEvent::NewChannelMessage(base.clone()),
            LiveEvent::EditMessage(base.clone()),
            LiveEvent::EditChannelMessage(base.clone()),
        ];
        for event in events {
            let rec = event.into_record().unwrap();
            assert_eq!(rec.peer, Peer::Group(9));
            assert_eq!(rec.text, "text");
            assert_eq!(rec.timestamp, base.date);
        }
    }
}
