use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "TriageEngine";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DATA_DIR_ENV: &str = "TRIAGE_DATA_DIR";
pub const MODEL_DIR_ENV: &str = "TRIAGE_MODEL_DIR";
pub const BIND_ADDR_ENV: &str = "TRIAGE_BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DATABASE_FILE: &str = "triage.db";

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "triage_engine=info,tower_http=info"
}

/// Application data directory: `$TRIAGE_DATA_DIR`, else `~/TriageEngine`.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    resolve_data_dir(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

/// Classifier artifact directory: `$TRIAGE_MODEL_DIR`, else `<data>/model`.
pub fn model_dir() -> PathBuf {
    resolve_model_dir(std::env::var(MODEL_DIR_ENV).ok(), app_data_dir())
}

pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// HTTP bind address: `$TRIAGE_BIND_ADDR`, else `127.0.0.1:5000`.
/// An unparseable override is logged and ignored.
pub fn bind_addr() -> SocketAddr {
    resolve_bind_addr(std::env::var(BIND_ADDR_ENV).ok())
}

fn resolve_data_dir(env_value: Option<String>, home: Option<PathBuf>) -> PathBuf {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home.unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME),
    }
}

fn resolve_model_dir(env_value: Option<String>, data_dir: PathBuf) -> PathBuf {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => data_dir.join("model"),
    }
}

fn resolve_bind_addr(env_value: Option<String>) -> SocketAddr {
    let default: SocketAddr = SocketAddr::from(([127, 0, 0, 1], 5000));
    match env_value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "Invalid {BIND_ADDR_ENV}, using {DEFAULT_BIND_ADDR}");
            default
        }),
        None => default,
    }
}
