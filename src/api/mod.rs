//! HTTP API for the chat service.
//!
//! Routes are nested under `/api/`. Handlers share an `ApiContext` holding
//! the triage engine and the database connection.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ServerError, TriageServer};
pub use types::ApiContext;
