use std::fmt;

use chrono::{DateTime, Local, Utc};

/// Where a message came from, with the platform's bare numeric id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Peer {
    Channel(i64),
    Group(i64),
    Private(i64),
}

impl Peer {
    /// Channel id for channel-sourced messages, `None` otherwise.
    pub fn channel_id(self) -> Option<i64> {
        match self {
            Peer::Channel(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Channel(id) => write!(f, "channel:{id}"),
            Peer::Group(id) => write!(f, "group:{id}"),
            Peer::Private(id) => write!(f, "private:{id}"),
        }
    }
}

/// How a record entered the pipeline. Reporting only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    LiveNew,
    LiveEdit,
    Backfill,
}

/// One message, normalized from whichever live event or history shape arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRecord {
    pub peer: Peer,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub origin: Origin,
}

impl MessageRecord {
    pub fn new(peer: Peer, text: impl Into<String>, timestamp: DateTime<Utc>, origin: Origin) -> Self {
        Self {
            peer,
            text: text.into(),
            timestamp,
            origin,
        }
    }

    pub fn channel_id(&self) -> Option<i64> {
        self.peer.channel_id()
    }

    /// Local timestamp for report lines: time only for live traffic, full date for history.
    pub fn display_time(&self) -> String {
        let local = self.timestamp.with_timezone(&Local);
        match self.origin {
            Origin::Backfill => local.format("%Y-%m-%d %H:%M:%S").to_string(),
            Origin::LiveNew | Origin::LiveEdit => local.format("%H:%M:%S").to_string(),
        }
    }
}
