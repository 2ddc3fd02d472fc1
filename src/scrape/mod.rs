//! Scraping engine
//!
//! The coordinator fans out one walker per (supplier, category) pair. Each
//! walker drives the shared fetcher page by page and hands every page to the
//! extractor. Request concurrency is capped globally by the fetcher's slot
//! pool; pacing state is shared per supplier.

pub mod coordinator;
pub mod extractor;
pub mod fetcher;
pub mod walker;

pub use coordinator::Coordinator;
pub use extractor::{extract_page, ExtractError, ExtractedPage, NextPage};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use walker::walk_category;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared across all walkers.
///
/// Once set it stays set; walkers check it before every page fetch, finish
/// the page in flight, and return what they have so far.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
