//! Snapshot construction and atomic persistence
//!
//! A snapshot is the versioned output of one crawl pass. Within a snapshot
//! identity keys are unique: duplicates collapse last-writer-wins while the
//! first-seen position is kept, so snapshot order stays stable. The write
//! protocol is write-to-temp then rename, with the previous snapshot moved
//! aside as a timestamped backup first, so the store is never left partially
//! written.

use crate::product::{CanonicalProduct, IdentityKey};
use crate::store::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One versioned crawl output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub scraped_at: DateTime<Utc>,
    pub total_products: usize,
    pub products: Vec<CanonicalProduct>,
}

impl Snapshot {
    /// Builds a snapshot from normalized products, collapsing duplicates.
    ///
    /// Returns the snapshot and the number of duplicates that were
    /// overwritten; duplicates are counted, not errors.
    pub fn from_products(products: Vec<CanonicalProduct>) -> (Self, usize) {
        let mut deduped: Vec<CanonicalProduct> = Vec::with_capacity(products.len());
        let mut seen: HashMap<IdentityKey, usize> = HashMap::new();
        let mut duplicates = 0;

        for product in products {
            let key = product.identity_key();
            match seen.get(&key) {
                Some(&index) => {
                    // Last writer wins, position stays
                    deduped[index] = product;
                    duplicates += 1;
                }
                None => {
                    seen.insert(key, deduped.len());
                    deduped.push(product);
                }
            }
        }

        let snapshot = Snapshot {
            scraped_at: Utc::now(),
            total_products: deduped.len(),
            products: deduped,
        };
        (snapshot, duplicates)
    }
}

/// Writes a snapshot atomically, backing up any previous snapshot first.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot)?;

    let tmp_path = sibling(path, ".tmp");
    std::fs::write(&tmp_path, json)?;

    if path.exists() {
        let backup_path = backup_name(path, Utc::now());
        std::fs::rename(path, &backup_path)?;
        tracing::info!("Previous snapshot kept as {}", backup_path.display());
    }

    std::fs::rename(&tmp_path, path)?;
    tracing::info!(
        "Wrote snapshot with {} products to {}",
        snapshot.total_products,
        path.display()
    );

    Ok(())
}

/// Loads a snapshot from disk (used by the CSV export mode).
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StorageError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn backup_name(path: &Path, now: DateTime<Utc>) -> PathBuf {
    sibling(path, &format!(".{}.bak", now.format("%Y%m%dT%H%M%SZ")))
}
