//! Normalizer and validator
//!
//! Converts raw extracted text into canonical typed values. This is a pure,
//! deterministic, total transformation: every [`RawProduct`] produces exactly
//! one [`CanonicalProduct`]. Bad input is flagged, never dropped, so the
//! audit trail stays complete.

mod price;
mod stock;
mod text;

pub use price::parse_price;
pub use stock::parse_stock;
pub use text::{clean_name, extract_unit};

use crate::product::{CanonicalProduct, QualityFlag, RawProduct};

/// Accepted price range in euros; values outside are flagged, not rejected.
pub const PRICE_MIN: f64 = 0.01;
pub const PRICE_MAX: f64 = 10_000.0;

/// Fixed output currency for all suppliers.
pub const CURRENCY: &str = "EUR";

/// Normalizes one raw product into its canonical form.
///
/// `assume_in_stock` is the stock status used when the availability text
/// matches neither keyword set (or is absent entirely).
pub fn normalize(raw: &RawProduct, assume_in_stock: bool) -> CanonicalProduct {
    let name = raw
        .fields
        .name
        .as_deref()
        .map(clean_name)
        .unwrap_or_default();

    let parsed_price = raw.fields.price.as_deref().and_then(parse_price);
    let price = parsed_price.unwrap_or(0.0);

    let quality_flag = if name.is_empty() || parsed_price.is_none() {
        QualityFlag::MissingRequiredField
    } else if !(PRICE_MIN..=PRICE_MAX).contains(&price) {
        QualityFlag::PriceOutOfRange
    } else {
        QualityFlag::Ok
    };

    let in_stock = raw
        .fields
        .stock
        .as_deref()
        .map(|s| parse_stock(s, assume_in_stock))
        .unwrap_or(assume_in_stock);

    // A configured unit rule wins; otherwise fall back to the product name
    let unit = raw
        .fields
        .unit
        .as_deref()
        .map(clean_name)
        .or_else(|| extract_unit(&name));

    CanonicalProduct {
        name,
        category: raw.category,
        price,
        currency: CURRENCY.to_string(),
        product_url: raw.fields.url.clone().unwrap_or_default(),
        brand: raw.fields.brand.as_deref().map(clean_name),
        unit,
        pack_size: raw.fields.pack_size.clone(),
        image_url: raw.fields.image.clone(),
        in_stock,
        supplier: raw.supplier.clone(),
        scraped_at: raw.extracted_at,
        quality_flag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Category, RawFields};
    use chrono::Utc;
    use url::Url;

    fn raw(fields: RawFields) -> RawProduct {
        RawProduct {
            supplier: "Leroy Merlin".to_string(),
            category: Category::Tiles,
            source_url: Url::parse("https://www.leroymerlin.fr/carrelage").unwrap(),
            extracted_at: Utc::now(),
            fields,
        }
    }

    fn full_fields() -> RawFields {
        RawFields {
            name: Some("  Carrelage   sol gris 60x60 ".to_string()),
            price: Some("29,99 €".to_string()),
            url: Some("https://www.leroymerlin.fr/p/123".to_string()),
            image: Some("https://www.leroymerlin.fr/img/123.jpg".to_string()),
            stock: Some("En stock".to_string()),
            brand: Some("Artens".to_string()),
            unit: None,
            pack_size: Some("5".to_string()),
        }
    }

    #[test]
    fn test_normalize_complete_product() {
        let product = normalize(&raw(full_fields()), true);

        assert_eq!(product.name, "Carrelage sol gris 60x60");
        assert_eq!(product.price, 29.99);
        assert_eq!(product.currency, "EUR");
        assert!(product.in_stock);
        assert_eq!(product.brand.as_deref(), Some("Artens"));
        assert_eq!(product.pack_size.as_deref(), Some("5"));
        assert_eq!(product.quality_flag, QualityFlag::Ok);
    }

    #[test]
    fn test_price_encodings_agree() {
        for (text, expected) in [
            ("29,99 €", 29.99),
            ("29.99EUR", 29.99),
            ("1 234,50€", 1234.50),
        ] {
            let mut fields = full_fields();
            fields.price = Some(text.to_string());
            let product = normalize(&raw(fields), true);
            assert_eq!(product.price, expected, "price text {:?}", text);
            assert_eq!(product.currency, "EUR");
            assert_eq!(product.quality_flag, QualityFlag::Ok);
        }
    }

    #[test]
    fn test_missing_price_is_flagged_and_retained() {
        let mut fields = full_fields();
        fields.price = None;
        let product = normalize(&raw(fields), true);

        assert_eq!(product.price, 0.0);
        assert_eq!(product.quality_flag, QualityFlag::MissingRequiredField);
        assert_eq!(product.name, "Carrelage sol gris 60x60"); // record kept
    }

    #[test]
    fn test_unparsable_price_is_flagged() {
        let mut fields = full_fields();
        fields.price = Some("prix sur demande".to_string());
        let product = normalize(&raw(fields), true);

        assert_eq!(product.price, 0.0);
        assert_eq!(product.quality_flag, QualityFlag::MissingRequiredField);
    }

    #[test]
    fn test_price_out_of_range_is_flagged() {
        let mut fields = full_fields();
        fields.price = Some("25 000,00 €".to_string());
        let product = normalize(&raw(fields), true);

        assert_eq!(product.price, 25_000.0);
        assert_eq!(product.quality_flag, QualityFlag::PriceOutOfRange);
    }

    #[test]
    fn test_missing_name_is_flagged() {
        let mut fields = full_fields();
        fields.name = None;
        let product = normalize(&raw(fields), true);

        assert_eq!(product.name, "");
        assert_eq!(product.quality_flag, QualityFlag::MissingRequiredField);
    }

    #[test]
    fn test_stock_scenarios() {
        for (text, expected) in [
            (Some("Rupture de stock"), false),
            (Some("Livraison en 48h"), true),
            (Some(""), true),
            (None, true),
        ] {
            let mut fields = full_fields();
            fields.stock = text.map(str::to_string);
            let product = normalize(&raw(fields), true);
            assert_eq!(product.in_stock, expected, "stock text {:?}", text);
        }
    }

    #[test]
    fn test_pessimistic_default_is_respected() {
        let mut fields = full_fields();
        fields.stock = None;
        let product = normalize(&raw(fields), false);
        assert!(!product.in_stock);
    }

    #[test]
    fn test_unit_falls_back_to_name() {
        let mut fields = full_fields();
        fields.name = Some("Peinture 2,5l blanc".to_string());
        fields.unit = None;
        let product = normalize(&raw(fields), true);
        assert_eq!(product.unit.as_deref(), Some("l"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = raw(full_fields());
        let first = normalize(&input, true);
        let second = normalize(&input, true);
        assert_eq!(first, second);
    }
}
