//! Dispatcher endpoints, one per live event kind.
//!
//! Each endpoint wraps the message into the matching `LiveEvent` and hands it
//! to the router; routing never fails the update.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use msgwait_core::router::{EventRouter, LiveEvent};

use crate::raw_from_message;

pub async fn on_new_message(msg: Message, router: Arc<EventRouter>) -> ResponseResult<()> {
    router
        .handle_live(LiveEvent::NewMessage(raw_from_message(&msg)))
        .await;
    Ok(())
}

pub async fn on_edit_message(msg: Message, router: Arc<EventRouter>) -> ResponseResult<()> {
    router
        .handle_live(LiveEvent::EditMessage(raw_from_message(&msg)))
        .await;
    Ok(())
}

pub async fn on_new_channel_message(msg: Message, router: Arc<EventRouter>) -> ResponseResult<()> {
    router
        .handle_live(LiveEvent::NewChannelMessage(raw_from_message(&msg)))
        .await;
    Ok(())
}

pub async fn on_edit_channel_message(
    msg: Message,
    router: Arc<EventRouter>,
) -> ResponseResult<()> {
    router
        .handle_live(LiveEvent::EditChannelMessage(raw_from_message(&msg)))
        .await;
    Ok(())
}
