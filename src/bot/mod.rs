//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the TontineBuddy application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations, one module per dashboard screen
pub mod commands;
/// Discord interaction handlers (autocomplete, parameter parsing)
pub mod handlers;

use crate::{
    cache::DashboardCache,
    config::{club::ClubConfig, operators},
    core::{
        changes::{ChangeFeed, ChangeKind, Table},
        notification::{self, NotificationSender},
        storage::LocalObjectStore,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the services commands
/// need: configuration, change feed, dashboard cache, notifier and photo store.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Club configuration loaded at start-up
    pub config: ClubConfig,
    /// Mutation feed; every command that writes publishes here
    pub changes: ChangeFeed,
    /// Dashboard snapshot cache, invalidated by the change feed
    pub cache: Arc<DashboardCache>,
    /// Delivery backend for notifications
    pub notifier: Arc<dyn NotificationSender>,
    /// Member photo store
    pub storage: LocalObjectStore,
}

impl BotData {
    /// Builds the bot context from the database connection and configuration.
    pub fn new(database: DatabaseConnection, config: ClubConfig) -> Result<Self> {
        let notifier =
            notification::sender_from_config(config.notifications.function_base_url.as_deref())?;
        let storage = LocalObjectStore::new(
            config.stockage.racine.clone(),
            config.stockage.url_publique.clone(),
        );
        Ok(Self {
            database,
            config,
            changes: ChangeFeed::default(),
            cache: Arc::new(DashboardCache::new()),
            notifier,
            storage,
        })
    }

    /// Publishes a mutation on the change feed.
    pub fn publish(&self, table: Table, kind: ChangeKind) {
        self.changes.publish(table, kind);
    }
}

/// Display name recorded as operator: the configured nickname, else the Discord username.
#[must_use]
pub fn operator_name(ctx: poise::Context<'_, BotData, Error>) -> String {
    let author = ctx.author();
    operators::get_operator_name(&author.id.to_string()).unwrap_or_else(|| author.name.clone())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx
                .say(format!("❌ Une erreur est survenue : {error}"))
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                // Detached: runs until the change feed closes
                let _watcher = Arc::clone(&data.cache).watch(&data.changes);
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
