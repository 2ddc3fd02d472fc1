use crate::catalog::{FieldName, PostProcess};
use crate::product::Category;
use serde::Deserialize;

/// Main configuration structure for Materio
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub suppliers: Vec<SupplierConfig>,
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScrapingConfig {
    /// Lower bound of the politeness delay before each request (milliseconds)
    pub delay_min_ms: u64,

    /// Upper bound of the politeness delay before each request (milliseconds)
    pub delay_max_ms: u64,

    /// Maximum number of requests in flight at once
    pub max_concurrent_requests: u32,

    /// Cap on products accumulated per category
    pub max_products_per_category: usize,

    /// Cap on pages fetched per category, guards against endless pagination
    pub max_pages_per_category: u32,

    /// Retry attempts for transient failures (5xx, 429, timeouts)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Overall run timeout in seconds; 0 disables the timeout
    #[serde(default)]
    pub run_timeout_secs: u64,

    /// Stock status to assume when neither keyword set matches.
    /// The optimistic default is a documented heuristic, kept configurable.
    #[serde(default = "default_assume_in_stock")]
    pub assume_in_stock: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_assume_in_stock() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Path of the JSON snapshot file
    pub snapshot_path: String,
}

/// One supplier with its category listings and selector catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SupplierConfig {
    /// Short identifier used for CLI filtering (e.g. "leroymerlin")
    pub id: String,

    /// Display name recorded on every product (e.g. "Leroy Merlin")
    pub name: String,

    /// Base URL that category paths are joined against
    pub base_url: String,

    /// Category listings to walk for this supplier
    pub categories: Vec<CategoryEntry>,

    /// Declarative extraction rules for this supplier's markup
    pub selectors: SelectorSpec,
}

/// A category listing entry: canonical category plus the supplier's URL path
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CategoryEntry {
    pub category: Category,
    pub path: String,
}

/// Uncompiled selector catalog for one supplier, as written in the config.
///
/// Compiled once at load time by [`crate::catalog::Catalog::compile`];
/// a selector that fails to parse is a startup error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SelectorSpec {
    /// Selector matching one product container per product
    pub container: String,

    /// Selector for the explicit "next page" link, if the markup has one
    #[serde(default)]
    pub next_page: Option<String>,

    /// Selector for numbered page links, used when no next link is present
    #[serde(default)]
    pub page_links: Option<String>,

    /// Field extraction rules
    pub fields: Vec<FieldSpec>,
}

/// One field extraction rule
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FieldSpec {
    /// Which semantic field this rule fills
    pub field: FieldName,

    /// CSS selector applied inside the product container
    pub selector: String,

    /// Attribute to read; the element's text content when absent
    #[serde(default)]
    pub attr: Option<String>,

    /// Optional post-processing hint applied to the raw value
    #[serde(default)]
    pub post: Option<PostProcess>,
}
