pub mod api; // HTTP surface over the chat service
pub mod chat; // Consultation lifecycle on top of the engine
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline; // Triage engine: extraction, clarification, safety, classifier

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiContext, ServerError};
use crate::db::DatabaseError;
use crate::pipeline::classifier::ModelHandle;
use crate::pipeline::knowledge::KnowledgeBase;
use crate::pipeline::TriageEngine;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Open storage, build the engine and serve the API until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let conn = db::open_database(&config::database_path())?;

    let model_dir = config::model_dir();
    tracing::info!(dir = %model_dir.display(), "Classifier artifacts loaded on first use");
    let engine = TriageEngine::new(
        ModelHandle::from_dir(&model_dir),
        KnowledgeBase::load(&model_dir),
    );

    let mut server = api::start_server(ApiContext::new(engine, conn), config::bind_addr()).await?;

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}
