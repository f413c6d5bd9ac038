mod clock;
mod errors;
mod models;
mod snapshot;
mod store;
mod workspace;

pub use clock::{Clock, SystemClock};
pub use errors::{AppError, AppResult, ImportError};
pub use models::{CurrentWork, Note, NotePatch, SessionEdit, SessionEnd, WorkSession};
pub use snapshot::Snapshot;
pub use store::{KvStore, MemoryStore, SqliteStore};
pub use workspace::Workspace;

/// Subscriber bootstrap for embedding applications; the library itself only
/// emits events.
pub fn init_tracing() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|error| error.to_string())
}
