//! Run summary statistics

use crate::product::QualityFlag;
use crate::store::Snapshot;
use std::collections::BTreeMap;

/// Aggregates computed over one snapshot
#[derive(Debug)]
pub struct SnapshotStats {
    pub total_products: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_supplier: BTreeMap<String, usize>,
    pub in_stock: usize,
    pub flagged: usize,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Computes summary statistics for a snapshot.
///
/// Price aggregates only cover products with a positive price so that
/// records flagged for a missing price do not drag the average to zero.
pub fn compute_stats(snapshot: &Snapshot) -> SnapshotStats {
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_supplier: BTreeMap<String, usize> = BTreeMap::new();
    let mut in_stock = 0;
    let mut flagged = 0;
    let mut priced: Vec<f64> = Vec::new();

    for product in &snapshot.products {
        *by_category
            .entry(product.category.as_str().to_string())
            .or_default() += 1;
        *by_supplier.entry(product.supplier.clone()).or_default() += 1;
        if product.in_stock {
            in_stock += 1;
        }
        if product.quality_flag != QualityFlag::Ok {
            flagged += 1;
        }
        if product.price > 0.0 {
            priced.push(product.price);
        }
    }

    let avg_price = if priced.is_empty() {
        None
    } else {
        Some(priced.iter().sum::<f64>() / priced.len() as f64)
    };
    let min_price = priced.iter().copied().fold(None, |acc: Option<f64>, p| {
        Some(acc.map_or(p, |a| a.min(p)))
    });
    let max_price = priced.iter().copied().fold(None, |acc: Option<f64>, p| {
        Some(acc.map_or(p, |a| a.max(p)))
    });

    SnapshotStats {
        total_products: snapshot.products.len(),
        by_category,
        by_supplier,
        in_stock,
        flagged,
        avg_price,
        min_price,
        max_price,
    }
}

/// Prints a human-readable run summary to stdout.
pub fn print_stats(stats: &SnapshotStats) {
    println!("\n=== Run summary ===");
    println!("Products:   {}", stats.total_products);
    println!("In stock:   {}", stats.in_stock);
    println!("Flagged:    {}", stats.flagged);

    if let (Some(avg), Some(min), Some(max)) =
        (stats.avg_price, stats.min_price, stats.max_price)
    {
        println!(
            "Prices:     avg {:.2} EUR, min {:.2} EUR, max {:.2} EUR",
            avg, min, max
        );
    }

    if !stats.by_supplier.is_empty() {
        println!("By supplier:");
        for (supplier, count) in &stats.by_supplier {
            println!("  {:<20} {}", supplier, count);
        }
    }

    if !stats.by_category.is_empty() {
        println!("By category:");
        for (category, count) in &stats.by_category {
            println!("  {:<20} {}", category, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{CanonicalProduct, Category};
    use chrono::Utc;

    fn product(category: Category, price: f64, in_stock: bool) -> CanonicalProduct {
        let flag = if price > 0.0 {
            QualityFlag::Ok
        } else {
            QualityFlag::MissingRequiredField
        };
        CanonicalProduct {
            name: "P".to_string(),
            category,
            price,
            currency: "EUR".to_string(),
            product_url: format!("https://e.fr/p/{}", price),
            brand: None,
            unit: None,
            pack_size: None,
            image_url: None,
            in_stock,
            supplier: "Leroy Merlin".to_string(),
            scraped_at: Utc::now(),
            quality_flag: flag,
        }
    }

    #[test]
    fn test_compute_stats() {
        let (snapshot, _) = Snapshot::from_products(vec![
            product(Category::Tiles, 10.0, true),
            product(Category::Tiles, 30.0, false),
            product(Category::Paint, 0.0, true),
        ]);

        let stats = compute_stats(&snapshot);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.in_stock, 2);
        assert_eq!(stats.flagged, 1);
        assert_eq!(stats.by_category["tiles"], 2);
        assert_eq!(stats.by_category["paint"], 1);
        assert_eq!(stats.by_supplier["Leroy Merlin"], 3);

        // Zero-price records are excluded from price aggregates
        assert_eq!(stats.avg_price, Some(20.0));
        assert_eq!(stats.min_price, Some(10.0));
        assert_eq!(stats.max_price, Some(30.0));
    }

    #[test]
    fn test_stats_empty_snapshot() {
        let (snapshot, _) = Snapshot::from_products(vec![]);
        let stats = compute_stats(&snapshot);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.avg_price, None);
    }
}
