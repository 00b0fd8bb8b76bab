//! Telegram adapter (teloxide).
//!
//! Converts Bot API updates into `msgwait-core` live events and implements the
//! history port for Bot API sessions.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{Me, Message},
};

pub mod handlers;
pub mod router;

use msgwait_core::{
    domain::Peer,
    errors::Error,
    ports::{ChannelHandle, Dialog, HistoryMessage, HistoryPort, TransportCapabilities},
    router::RawMessage,
    Result,
};

/// Bot API chat ids for channels and supergroups are `-100` followed by the bare id.
const CHANNEL_ID_OFFSET: i64 = -1_000_000_000_000;

/// Decode a Bot API chat id into the bare peer id used in configs.
pub fn peer_from_chat_id(chat_id: i64) -> Peer {
    if chat_id < CHANNEL_ID_OFFSET {
        Peer::Channel(CHANNEL_ID_OFFSET - chat_id)
    } else if chat_id < 0 {
        Peer::Group(-chat_id)
    } else {
        Peer::Private(chat_id)
    }
}

/// Text of a message, falling back to the media caption.
pub fn raw_from_message(msg: &Message) -> RawMessage {
    RawMessage {
        peer: peer_from_chat_id(msg.chat.id.0),
        text: msg.text().or_else(|| msg.caption()).map(str::to_string),
        date: msg.date,
    }
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Identity of the running account; the live loop cannot start without it.
    pub async fn current_user(&self) -> Result<Me> {
        self.bot
            .get_me()
            .await
            .map_err(|e| Error::Transport(format!("fetching current user failed: {e}")))
    }
}

/// The Bot API exposes neither the dialog list nor message history, so a bot
/// session reports no history support and refuses configs that ask for it.
#[async_trait]
impl HistoryPort for TelegramTransport {
    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            supports_history: false,
        }
    }

    async fn dialogs(&self) -> Result<Vec<Dialog>> {
        Err(Error::Transport(
            "dialog listing is not available to Bot API sessions".to_string(),
        ))
    }

    async fn history(&self, channel: &ChannelHandle, _limit: usize) -> Result<Vec<HistoryMessage>> {
        Err(Error::Transport(format!(
            "history of channel {} is not available to Bot API sessions",
            channel.channel_id
        )))
    }
}
