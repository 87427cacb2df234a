//! Shared state for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::pipeline::TriageEngine;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
///
/// The single connection sits behind a mutex, so turns for any conversation
/// are serialized at the process level as well as by the IMMEDIATE
/// transaction inside `chat::send_message`.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<TriageEngine>,
    db: Arc<Mutex<Connection>>,
}

impl ApiContext {
    pub fn new(engine: TriageEngine, conn: Connection) -> Self {
        Self {
            engine: Arc::new(engine),
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Acquire the database connection.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}
