//! Stock status keyword matching
//!
//! Availability text is matched case-insensitively against two keyword sets.
//! Unavailable keywords take precedence: "non disponible" must not read as
//! available just because it contains "disponible".

/// Phrases that mark a product as out of stock
const UNAVAILABLE_KEYWORDS: &[&str] = &[
    "rupture",
    "indisponible",
    "non disponible",
    "épuisé",
    "epuise",
    "victime de son succès",
];

/// Phrases that mark a product as purchasable
const AVAILABLE_KEYWORDS: &[&str] = &[
    "en stock",
    "disponible",
    "livraison",
    "retrait",
    "expédié",
];

/// Resolves raw stock text to a boolean.
///
/// `default` is used when neither keyword set matches; the optimistic
/// default of true is a heuristic, so it stays configurable.
pub fn parse_stock(text: &str, default: bool) -> bool {
    let lower = text.to_lowercase();

    if UNAVAILABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return false;
    }

    if AVAILABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    default
}
