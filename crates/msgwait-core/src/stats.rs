use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Running count of received message-bearing events.
///
/// Written only from the event-processing path, read by the heartbeat.
#[derive(Debug, Default)]
pub struct ReceivedCounter(AtomicU64);

impl ReceivedCounter {
    /// Increment and return the new count.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Log uptime and the received count every `interval` until `cancel` fires.
pub fn spawn_heartbeat(
    counter: Arc<ReceivedCounter>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        let mut tick = tokio::time::interval_at(started + interval, interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tick.tick() => {
                    tracing::info!(
                        "heartbeat | uptime: {} | messages: {}",
                        format_uptime(started.elapsed()),
                        counter.get()
                    );
                }
            }
        }
    })
}

/// Whole-second uptime like `1h2m3s`, `4m0s`, `12s`.
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs_f64().round() as u64;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
