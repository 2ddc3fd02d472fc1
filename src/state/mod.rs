//! State module for per-run scraping state
//!
//! # Components
//!
//! - `SupplierPacing`: per-supplier adaptive delay state (429 backpressure)
//! - `RetrySchedule`: explicit backoff state machine for one fetch

mod pacing;
mod retry;

// Re-export main types
pub use pacing::SupplierPacing;
pub use retry::{RetrySchedule, RetryState};
