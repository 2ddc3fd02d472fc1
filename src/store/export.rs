//! CSV export of a snapshot
//!
//! Fields containing commas, quotes, or newlines are quoted per RFC 4180.

use crate::store::{Snapshot, StorageError};
use std::io::Write;
use std::path::Path;

const HEADER: &str = "name,category,price,currency,product_url,brand,unit,pack_size,image_url,in_stock,supplier,scraped_at,quality_flag";

/// Writes a snapshot's products as CSV.
pub fn export_csv(snapshot: &Snapshot, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", HEADER)?;

    for product in &snapshot.products {
        let row = [
            escape(&product.name),
            escape(product.category.as_str()),
            format!("{:.2}", product.price),
            escape(&product.currency),
            escape(&product.product_url),
            escape(product.brand.as_deref().unwrap_or("")),
            escape(product.unit.as_deref().unwrap_or("")),
            escape(product.pack_size.as_deref().unwrap_or("")),
            escape(product.image_url.as_deref().unwrap_or("")),
            product.in_stock.to_string(),
            escape(&product.supplier),
            product.scraped_at.to_rfc3339(),
            escape(product.quality_flag.as_str()),
        ];
        writeln!(file, "{}", row.join(","))?;
    }

    tracing::info!(
        "Exported {} products to {}",
        snapshot.products.len(),
        path.display()
    );
    Ok(())
}

fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
