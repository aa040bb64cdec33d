//! Herald server executable
//!
//! Wires the Telegram bot, the Twitter publisher, the local model
//! runtime, and the approval workflow together and runs them until
//! shutdown.

mod bot;

use clap::{Arg, ArgAction, Command};
use herald_core::{
    ApprovalStore, ApprovalWorkflow, HeraldConfig, KnowledgeBase, ModelClient, PostDrafter,
    QueryResponder, TelegramClient, TwitterClient,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("herald-server")
        .version("0.1.0")
        .about("Community assistant bot with human-approved publishing")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/herald.json"),
        )
        .arg(
            Arg::new("spool-dir")
                .long("spool-dir")
                .value_name("DIR")
                .help("Durable approval spool directory (overrides config)"),
        )
        .arg(
            Arg::new("knowledge")
                .long("knowledge")
                .value_name("FILE")
                .help("Knowledge base file (overrides config)"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Process a single update batch and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = HeraldConfig::from_file(config_path)?;
    log::info!("Loaded configuration from {}", config_path);

    if let Some(dir) = matches.get_one::<String>("spool-dir") {
        config.approvals.spool_dir = Some(dir.into());
    }
    if let Some(path) = matches.get_one::<String>("knowledge") {
        config.knowledge.path = path.into();
    }

    // Clients are constructed once and shared for the process lifetime
    let telegram = Arc::new(TelegramClient::new(config.telegram.clone())?);
    let twitter = Arc::new(TwitterClient::new(config.twitter.clone())?);
    let model = Arc::new(ModelClient::new(config.model.clone())?);

    if let Err(e) = model.warm_up().await {
        // Generation degrades to the canned fallback until the runtime
        // comes up, so this is not fatal.
        log::warn!("Model runtime not reachable: {}", e);
    }

    let knowledge = KnowledgeBase::load(&config.knowledge.path)?;
    if knowledge.is_empty() {
        log::warn!("Knowledge base is empty; every question goes to the model");
    }

    let store = match &config.approvals.spool_dir {
        Some(dir) => {
            log::info!("Using durable approval spool at {}", dir.display());
            Arc::new(ApprovalStore::with_spool(dir)?)
        }
        None => {
            log::info!("Using in-memory approval store; pending approvals are lost on restart");
            Arc::new(ApprovalStore::in_memory())
        }
    };

    let workflow = Arc::new(ApprovalWorkflow::new(
        store.clone(),
        telegram.clone(),
        twitter.clone(),
    ));
    let responder = Arc::new(QueryResponder::new(
        knowledge,
        model.clone(),
        config.knowledge.similarity_threshold,
    ));
    let drafter = Arc::new(PostDrafter::new(model.clone(), twitter.clone()));

    let bot = Arc::new(bot::Bot::new(
        telegram.clone(),
        workflow.clone(),
        responder,
        drafter,
    ));

    if matches.get_flag("once") {
        bot.process_batch(None).await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let bot_handle = {
        let bot = bot.clone();
        let rx = shutdown_rx.clone();
        tokio::spawn(async move { bot.run(rx).await })
    };

    let sweeper_handle = {
        let store = store.clone();
        let mut rx = shutdown_rx;
        let max_age = Duration::from_secs(config.approvals.max_age_secs);
        let sweep_interval = Duration::from_secs(config.approvals.sweep_interval_secs);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            loop {
                tokio::select! {
                    _ = rx.changed() => break,
                    _ = interval.tick() => {
                        let expired = store.expire(max_age);
                        if expired > 0 {
                            log::info!("Expired {} stale approval request(s)", expired);
                        }
                    }
                }
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    log::info!("Shutdown signal received; draining");

    // Reject new submissions while in-flight decisions resolve
    store.close();
    let _ = shutdown_tx.send(true);

    let _ = bot_handle.await;
    let _ = sweeper_handle.await;

    log::info!("Shutdown complete");
    Ok(())
}
