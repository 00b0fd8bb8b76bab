use crate::{
    config::Config,
    domain::{MessageRecord, Origin, Peer},
    errors::Error,
    ports::{ChannelHandle, HistoryPort, TransportCapabilities},
    router::EventRouter,
    Result,
};

/// Messages fetched per channel.
pub const HISTORY_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub channels_ok: usize,
    pub channels_failed: usize,
    /// Accepted messages that yielded at least one link.
    pub matched: usize,
}

/// Refuse to start when history replay is requested from a transport that
/// cannot read history.
pub fn ensure_history_supported(cfg: &Config, caps: TransportCapabilities) -> Result<()> {
    if cfg.features.fetch_history_enabled && !caps.supports_history {
        return Err(Error::Config(
            "features.fetch_history_enabled is set but this transport cannot list dialogs or fetch history"
                .to_string(),
        ));
    }
    Ok(())
}

/// Replays recent channel history through the live pipeline, once, at startup.
pub struct BackfillCoordinator<'a> {
    history: &'a dyn HistoryPort,
    router: &'a EventRouter,
}

impl<'a> BackfillCoordinator<'a> {
    pub fn new(history: &'a dyn HistoryPort, router: &'a EventRouter) -> Self {
        Self { history, router }
    }

    /// Walk every configured channel in order. Returns `None` when backfill is off.
    pub async fn run(&self) -> Option<BackfillSummary> {
        let cfg = self.router.config();
        if !cfg.backfill_enabled() {
            return None;
        }
        if !self.history.capabilities().supports_history {
            tracing::warn!("history fetch is enabled but the transport cannot read history; skipping");
            return None;
        }

        tracing::info!("fetching channel history...");
        let mut summary = BackfillSummary::default();
        for &channel_id in &cfg.monitor.channels {
            match self.replay_channel(channel_id).await {
                Ok(matched) => {
                    summary.channels_ok += 1;
                    summary.matched += matched;
                }
                Err(e) => {
                    summary.channels_failed += 1;
                    tracing::warn!(channel_id, "history fetch failed: {e}");
                }
            }
        }
        tracing::info!(
            "history done: {} channel(s) ok, {} failed, {} matched message(s)",
            summary.channels_ok,
            summary.channels_failed,
            summary.matched
        );
        Some(summary)
    }

    async fn replay_channel(&self, channel_id: i64) -> Result<usize> {
        tracing::info!(channel_id, "fetching history");
        let handle = self.resolve_channel(channel_id).await?;

        let messages = self.history.history(&handle, HISTORY_PAGE_SIZE).await?;
        tracing::info!(channel_id, "fetched {} message(s)", messages.len());

        let mut matched = 0;
        // History arrives newest-first; replay in the order it was posted.
        for msg in messages.into_iter().rev() {
            if msg.text.is_empty() {
                continue;
            }
            let record = MessageRecord::new(Peer::Channel(channel_id), msg.text, msg.date, Origin::Backfill);
            if self.router.process(&record).await.matched() {
                matched += 1;
            }
        }

        tracing::info!(channel_id, "matched {matched} message(s)");
        Ok(matched)
    }

    async fn resolve_channel(&self, channel_id: i64) -> Result<ChannelHandle> {
        let dialogs = self.history.dialogs().await?;
        let dialog = dialogs
            .into_iter()
            .find(|d| d.peer == Peer::Channel(channel_id))
            .ok_or_else(|| Error::Transport(format!("channel {channel_id} not found")))?;

        tracing::info!(channel_id, "channel title: {}", dialog.title);
        Ok(ChannelHandle {
            channel_id,
            access_hash: dialog.access_hash.unwrap_or_default(),
        })
    }
}
