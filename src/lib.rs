use std::sync::Arc;

use dotenvy::dotenv;
use jobs::{notification::Notifier, spawn_all_jobs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(test)]
use mockall_double::double;

#[cfg_attr(test, double)]
use database::AppDatabase;

#[cfg_attr(test, double)]
use jobs::notification::push_message::FcmClient;

pub mod constants;
pub mod database;
pub mod jobs;
pub mod models;
pub mod utils;

pub async fn start_notifier() -> anyhow::Result<()> {
    // import .env file
    dotenv().ok();
    initialize_logging();
    // create the store and push clients shared by every run
    let db_client = AppDatabase::new().await?;
    let fcm_client = FcmClient::new()?;
    let notifier = Notifier::new(Arc::new(db_client), Arc::new(fcm_client));
    let job = spawn_all_jobs(notifier);
    tracing::info!("session notifier started");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down session notifier");
    job.abort();
    Ok(())
}

fn initialize_logging() {
    // create default env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or("session_notifier=debug".into());

    // initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
