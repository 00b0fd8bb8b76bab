use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

use msgwait_core::{
    backfill::{ensure_history_supported, BackfillCoordinator},
    config::Config,
    ports::{HistoryPort, SubscriptionPort},
    router::EventRouter,
    stats::{spawn_heartbeat, HEARTBEAT_INTERVAL},
};
use msgwait_subscription::SubscriptionClient;

use crate::{handlers, TelegramTransport};

/// Start the bot: identity check, optional backfill, heartbeat, then live updates
/// until Ctrl-C.
pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let transport = TelegramTransport::new(bot.clone());
    ensure_history_supported(&cfg, transport.capabilities())?;

    tracing::info!("msgwait starting");
    tracing::info!("config: {}", cfg.source_path.display());
    tracing::info!("monitored channels: {}", cfg.monitor.channels.len());
    tracing::info!("keywords: {}", cfg.filters.keywords.len());
    tracing::info!("whitelisted channels: {}", cfg.monitor.whitelist_channels.len());

    // Without our own identity there is nothing to listen as.
    let me = transport.current_user().await?;
    tracing::info!(
        "current user: {} {} (ID: {})",
        me.user.first_name,
        me.user.last_name.as_deref().unwrap_or(""),
        me.user.id.0
    );

    let subscriptions: Arc<dyn SubscriptionPort> =
        Arc::new(SubscriptionClient::new(&cfg.subscription_api)?);
    let router = Arc::new(EventRouter::new(cfg.clone(), subscriptions));

    // Backfill finishes before any live update is consumed.
    BackfillCoordinator::new(&transport, &router).run().await;

    let cancel = CancellationToken::new();
    let heartbeat = spawn_heartbeat(router.received(), HEARTBEAT_INTERVAL, cancel.clone());

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::on_new_message))
        .branch(Update::filter_edited_message().endpoint(handlers::on_edit_message))
        .branch(Update::filter_channel_post().endpoint(handlers::on_new_channel_message))
        .branch(Update::filter_edited_channel_post().endpoint(handlers::on_edit_channel_message));

    tracing::info!("listening for live messages as {} (Ctrl-C to stop)", me.user.id.0);

    // One distribution key for every update: events are handled strictly one
    // at a time, in arrival order.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|_| async {})
        .distribution_function(|_| Some(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    cancel.cancel();
    let _ = heartbeat.await;
    tracing::info!("msgwait stopped");

    Ok(())
}
