#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::env;
use tontine_buddy::{
    bot::{self, BotData},
    config::{club, database},
    errors::{Error, Result},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the club configuration
    let club_config = club::load_default_config()
        .inspect_err(|e| error!("Critical error loading club configuration: {e}"))?;

    // 4. Connect and create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed reference data (cotisation types, sanction types, templates)
    club::seed_reference_data(&db, &club_config)
        .await
        .inspect(|()| info!("Reference data seeded successfully."))
        .inspect_err(|e| error!("Failed to seed reference data: {e}"))?;

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let data = BotData::new(db, club_config)?;
    bot::run_bot(token, data).await?;

    Ok(())
}
