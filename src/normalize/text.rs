//! Name cleanup and unit extraction

/// Measurement units that appear in French listing titles.
///
/// Longer tokens come first so "ml" wins over "l" and "m²" over "m2".
const UNITS: &[&str] = &[
    "m²", "m2", "cm²", "cm2", "ml", "cl", "kg", "pièces", "pièce", "lot", "paquet", "l", "g",
];

/// Cleans a raw product name: collapses whitespace runs (including
/// non-breaking spaces from markup) to single spaces and trims the ends.
/// Diacritics and special characters are preserved.
pub fn clean_name(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts a measurement unit from product text, e.g. "Peinture 2,5L" → "l".
///
/// Matches whole tokens, or a unit suffix directly attached to a number, so
/// the single-letter units don't fire inside ordinary words.
pub fn extract_unit(text: &str) -> Option<String> {
    let lower = text.to_lowercase();

    for token in lower.split(|c: char| c.is_whitespace() || c == '-') {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '²');
        if token.is_empty() {
            continue;
        }

        for unit in UNITS {
            if token == *unit {
                return Some((*unit).to_string());
            }
            // "2,5l", "25kg": unit glued onto a number
            if let Some(prefix) = token.strip_suffix(unit) {
                if !prefix.is_empty()
                    && prefix
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
                {
                    return Some((*unit).to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_collapses_whitespace() {
        assert_eq!(
            clean_name("  Carrelage   sol\n\tgris  "),
            "Carrelage sol gris"
        );
    }

    #[test]
    fn test_clean_name_preserves_diacritics() {
        assert_eq!(clean_name("Peinture émail blanc"), "Peinture émail blanc");
    }

    #[test]
    fn test_clean_name_handles_nbsp() {
        assert_eq!(clean_name("Carrelage\u{a0}gris"), "Carrelage gris");
    }

    #[test]
    fn test_extract_unit_word() {
        assert_eq!(
            extract_unit("Carrelage 60x60 cm - lot de 5 pièces"),
            Some("lot".to_string())
        );
    }

    #[test]
    fn test_extract_unit_attached_to_number() {
        assert_eq!(extract_unit("Peinture 2,5l blanc"), Some("l".to_string()));
        assert_eq!(extract_unit("Sac de 25kg"), Some("kg".to_string()));
    }

    #[test]
    fn test_extract_unit_square_meters() {
        assert_eq!(extract_unit("Prix au m²"), Some("m²".to_string()));
    }

    #[test]
    fn test_no_unit_in_plain_name() {
        // "Simple" contains the letter l but is not a litre
        assert_eq!(extract_unit("Simple product name"), None);
    }
}
