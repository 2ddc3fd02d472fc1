//! Price text parsing
//!
//! French supplier listings mix decimal conventions: "29,99 €", "29.99EUR",
//! "1 234,50€", "1 299,00 EUR". The parser strips currency symbols and
//! grouping spaces, picks the decimal separator, and rounds to cents.

/// Parses price text into a non-negative amount in euros.
///
/// Returns None when the text contains no parsable number; the caller flags
/// the record rather than dropping it.
pub fn parse_price(text: &str) -> Option<f64> {
    // Keep digits and separator candidates, drop currency symbols and units
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            cleaned.push(c);
        }
    }

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = normalize_separators(&cleaned);
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    Some(round_cents(value))
}

/// Rewrites a digit/separator string into plain "1234.50" form.
fn normalize_separators(s: &str) -> String {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    let decimal_pos = match (last_dot, last_comma) {
        // Both present: whichever comes last is the decimal separator
        (Some(d), Some(c)) => Some(d.max(c)),
        (Some(pos), None) | (None, Some(pos)) => {
            let sep = s.as_bytes()[pos] as char;
            // A repeated separator is a grouping separator ("1.299.000")
            if s.matches(sep).count() > 1 {
                None
            } else {
                // One separator: decimal when followed by 1-2 digits,
                // grouping when followed by exactly 3 ("1.299")
                let trailing = s.len() - pos - 1;
                if (1..=2).contains(&trailing) {
                    Some(pos)
                } else {
                    None
                }
            }
        }
        (None, None) => None,
    };

    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == decimal_pos {
            out.push('.');
        }
        // other separators are grouping marks, dropped
    }
    out
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
