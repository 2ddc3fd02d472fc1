//! Persistence layer
//!
//! Snapshot serialization, atomic writes with backups, CSV export, and
//! run summary statistics.

mod export;
mod snapshot;
mod stats;

pub use export::export_csv;
pub use snapshot::{load_snapshot, write_snapshot, Snapshot};
pub use stats::{compute_stats, print_stats, SnapshotStats};

use thiserror::Error;

/// Storage-level errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
