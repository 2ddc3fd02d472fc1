//! Product record types
//!
//! This module defines the two record shapes that flow through the pipeline:
//! - [`RawProduct`]: one per product container found on a page, every field an
//!   explicit `Option<String>`. Consumed immediately by the normalizer, never
//!   persisted.
//! - [`CanonicalProduct`]: the typed, validated record that ends up in the
//!   snapshot, possibly carrying a quality flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Product vertical, mapped from a supplier-specific URL path.
///
/// This is a closed vocabulary: an unknown category name in the configuration
/// fails at load time, not per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tiles,
    Sinks,
    Toilets,
    Paint,
    Vanities,
    Showers,
}

impl Category {
    /// All known categories, in a stable order.
    pub const ALL: [Category; 6] = [
        Category::Tiles,
        Category::Sinks,
        Category::Toilets,
        Category::Paint,
        Category::Vanities,
        Category::Showers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tiles => "tiles",
            Category::Sinks => "sinks",
            Category::Toilets => "toilets",
            Category::Paint => "paint",
            Category::Vanities => "vanities",
            Category::Showers => "showers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Non-fatal annotation recorded on a normalized product.
///
/// Flagged records are retained in the snapshot for auditability rather than
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    Ok,
    PriceOutOfRange,
    MissingRequiredField,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Ok => "ok",
            QualityFlag::PriceOutOfRange => "price_out_of_range",
            QualityFlag::MissingRequiredField => "missing_required_field",
        }
    }
}

/// The raw text values extracted for one product container.
///
/// A selector rule that matched nothing leaves its field `None`; absence is
/// resolved by the normalizer, never treated as a fatal error here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub stock: Option<String>,
    pub brand: Option<String>,
    pub unit: Option<String>,
    pub pack_size: Option<String>,
}

impl RawFields {
    /// True when no selector rule produced a value for any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.url.is_none()
            && self.image.is_none()
            && self.stock.is_none()
            && self.brand.is_none()
            && self.unit.is_none()
            && self.pack_size.is_none()
    }
}

/// One product as found on a page, before normalization.
#[derive(Debug, Clone)]
pub struct RawProduct {
    /// Display name of the supplier this record came from
    pub supplier: String,

    /// Category of the listing page
    pub category: Category,

    /// URL of the page the record was extracted from
    pub source_url: Url,

    /// Extraction timestamp
    pub extracted_at: DateTime<Utc>,

    /// Per-field raw values
    pub fields: RawFields,
}

/// A fully normalized product record as written to the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub currency: String,
    pub product_url: String,
    pub brand: Option<String>,
    pub unit: Option<String>,
    pub pack_size: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub supplier: String,
    pub scraped_at: DateTime<Utc>,
    pub quality_flag: QualityFlag,
}

/// The tuple used to detect duplicate products within a snapshot.
///
/// Products with a URL are keyed by (supplier, product_url); products without
/// one fall back to (supplier, category, lowercased name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Url { supplier: String, product_url: String },
    Name {
        supplier: String,
        category: Category,
        name: String,
    },
}

impl CanonicalProduct {
    pub fn identity_key(&self) -> IdentityKey {
        if !self.product_url.is_empty() {
            IdentityKey::Url {
                supplier: self.supplier.clone(),
                product_url: self.product_url.clone(),
            }
        } else {
            IdentityKey::Name {
                supplier: self.supplier.clone(),
                category: self.category,
                name: self.name.to_lowercase(),
            }
        }
    }
}
