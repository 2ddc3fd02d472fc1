//! Run coordinator
//!
//! Builds the shared fetcher and the compiled selector catalogs at startup,
//! fans out one walker task per (supplier, category) pair, then joins them
//! all, normalizes the raw records, and collapses duplicates into a single
//! snapshot. A walker that panics or returns nothing costs only its own
//! category.

use crate::catalog::Catalog;
use crate::config::{Config, SupplierConfig};
use crate::normalize::normalize;
use crate::product::{Category, RawProduct};
use crate::scrape::fetcher::{build_http_client, Fetcher};
use crate::scrape::walker::walk_category;
use crate::scrape::CancelFlag;
use crate::state::SupplierPacing;
use crate::store::Snapshot;
use crate::{ConfigError, MaterioError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// One unit of work: a supplier's category listing and everything needed to
/// walk it.
#[derive(Debug)]
struct WalkPlan {
    supplier_id: String,
    supplier_name: String,
    category: Category,
    start_url: Url,
    catalog: Arc<Catalog>,
}

/// Owns the run: plans, walkers, normalization, deduplication.
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    plans: Vec<WalkPlan>,
    cancel: CancelFlag,
}

impl Coordinator {
    /// Prepares a run from a loaded configuration.
    ///
    /// Selector catalogs are compiled and all category URLs resolved here,
    /// before any network activity, so a bad selector or URL fails the run
    /// at startup. `suppliers` and `categories` filter the planned work;
    /// empty slices mean no filtering.
    pub fn new(
        config: Config,
        suppliers: &[String],
        categories: &[Category],
        cancel: CancelFlag,
    ) -> Result<Self, MaterioError> {
        let mut plans = Vec::new();

        for supplier in &config.suppliers {
            if !suppliers.is_empty() && !suppliers.contains(&supplier.id) {
                tracing::debug!("Skipping supplier {} (filtered out)", supplier.id);
                continue;
            }

            let catalog = Arc::new(Catalog::compile(&supplier.selectors)?);
            let base_url = parse_base_url(supplier)?;

            for entry in &supplier.categories {
                if !categories.is_empty() && !categories.contains(&entry.category) {
                    continue;
                }

                let start_url = base_url.join(&entry.path).map_err(|_| {
                    ConfigError::InvalidUrl(format!(
                        "{} + {}",
                        supplier.base_url, entry.path
                    ))
                })?;

                plans.push(WalkPlan {
                    supplier_id: supplier.id.clone(),
                    supplier_name: supplier.name.clone(),
                    category: entry.category,
                    start_url,
                    catalog: Arc::clone(&catalog),
                });
            }
        }

        Ok(Self {
            config,
            plans,
            cancel,
        })
    }

    /// Number of (supplier, category) walks this run will perform.
    pub fn planned_walks(&self) -> usize {
        self.plans.len()
    }

    /// Human-readable description of the planned work, for dry runs.
    pub fn describe_plan(&self) -> Vec<String> {
        self.plans
            .iter()
            .map(|p| format!("{}/{} -> {}", p.supplier_id, p.category, p.start_url))
            .collect()
    }

    /// Executes the full run and returns the deduplicated snapshot.
    ///
    /// Cancellation (signal or run timeout) stops new page fetches; the
    /// products gathered so far still flow into the snapshot.
    pub async fn run(self) -> Result<Snapshot, MaterioError> {
        let client = build_http_client()?;
        let fetcher = Arc::new(Fetcher::new(client, self.config.scraping.clone()));

        if self.config.scraping.run_timeout_secs > 0 {
            let timeout = Duration::from_secs(self.config.scraping.run_timeout_secs);
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!("Run timeout of {:?} reached, cancelling", timeout);
                cancel.cancel();
            });
        }

        // One pacing state per supplier, shared by all of its walkers
        let mut pacing_by_supplier: HashMap<String, Arc<Mutex<SupplierPacing>>> =
            HashMap::new();
        for plan in &self.plans {
            pacing_by_supplier
                .entry(plan.supplier_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(SupplierPacing::new())));
        }

        tracing::info!("Starting {} category walks", self.plans.len());

        let mut handles = Vec::with_capacity(self.plans.len());
        for plan in self.plans {
            let pacing = Arc::clone(&pacing_by_supplier[&plan.supplier_id]);
            handles.push(tokio::spawn(walk_category(
                Arc::clone(&fetcher),
                plan.catalog,
                plan.supplier_name,
                plan.category,
                plan.start_url,
                self.config.scraping.clone(),
                pacing,
                self.cancel.clone(),
            )));
        }

        let mut raws: Vec<RawProduct> = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(products) => raws.extend(products),
                Err(e) => {
                    // One lost walker must not sink the run
                    tracing::error!("Category walk task failed: {}", e);
                }
            }
        }

        tracing::info!("Collected {} raw products", raws.len());

        let assume_in_stock = self.config.scraping.assume_in_stock;
        let normalized: Vec<_> = raws
            .iter()
            .map(|raw| normalize(raw, assume_in_stock))
            .collect();

        let (snapshot, duplicates) = Snapshot::from_products(normalized);
        if duplicates > 0 {
            tracing::info!("Collapsed {} duplicate products", duplicates);
        }

        Ok(snapshot)
    }
}

fn parse_base_url(supplier: &SupplierConfig) -> Result<Url, ConfigError> {
    Url::parse(&supplier.base_url)
        .map_err(|_| ConfigError::InvalidUrl(supplier.base_url.clone()))
}
