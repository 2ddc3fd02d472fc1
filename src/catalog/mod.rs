//! Selector catalog: declarative, per-supplier extraction rules
//!
//! A catalog maps semantic field names to CSS selector rules. It is compiled
//! once from the configuration at startup; a selector that fails to parse is
//! a configuration error before any network activity. At runtime the catalog
//! is pure data and is never re-interpreted.

use crate::config::{FieldSpec, SelectorSpec};
use crate::ConfigError;
use scraper::{ElementRef, Selector};
use serde::Deserialize;
use std::fmt;

/// The closed set of semantic fields a rule can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldName {
    Name,
    Price,
    Url,
    Image,
    Stock,
    Brand,
    Unit,
    PackSize,
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldName::Name => "name",
            FieldName::Price => "price",
            FieldName::Url => "url",
            FieldName::Image => "image",
            FieldName::Stock => "stock",
            FieldName::Brand => "brand",
            FieldName::Unit => "unit",
            FieldName::PackSize => "pack-size",
        };
        f.write_str(s)
    }
}

/// Post-processing hint applied to a raw extracted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostProcess {
    StripCurrency,
    ParsePackSize,
}

impl PostProcess {
    /// Applies the hint to a raw value. Returns None when nothing is left.
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            PostProcess::StripCurrency => {
                let stripped: String = value
                    .chars()
                    .filter(|c| *c != '€' && *c != '$')
                    .collect();
                let stripped = strip_word_ci(&stripped, "eur");
                let trimmed = stripped.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            PostProcess::ParsePackSize => parse_pack_size(value),
        }
    }
}

/// Removes one case-insensitive occurrence of `word` from `text`.
fn strip_word_ci(text: &str, word: &str) -> String {
    let lower = text.to_lowercase();
    match lower.find(&word.to_lowercase()) {
        Some(pos) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..pos]);
            out.push_str(&text[pos + word.len()..]);
            out
        }
        None => text.to_string(),
    }
}

/// Pulls a pack count out of text like "lot de 5" or "x12".
fn parse_pack_size(value: &str) -> Option<String> {
    let lower = value.to_lowercase();

    for marker in ["lot de ", "par "] {
        let mut search_from = 0;
        while let Some(rel) = lower[search_from..].find(marker) {
            let start = search_from + rel + marker.len();
            let digits: String = lower[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                return Some(digits);
            }
            search_from = start;
        }
    }

    // "x12" counts only when the x starts a token; an x between digits is a
    // dimension ("60x60"), not a pack count
    let bytes = lower.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find('x') {
        let pos = search_from + rel;
        let start = pos + 1;
        if pos == 0 || bytes[pos - 1].is_ascii_whitespace() {
            let digits: String = lower[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                return Some(digits);
            }
        }
        search_from = start;
    }

    None
}

/// Where a rule reads its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// The concatenated text content of the matched element
    Text,
    /// A named attribute of the matched element
    Attribute(String),
}

/// A compiled extraction rule for one field
#[derive(Debug, Clone)]
pub struct SelectorRule {
    /// The selector as written in the config, kept for log messages
    pub raw: String,
    pub selector: Selector,
    pub source: ValueSource,
    pub post: Option<PostProcess>,
}

impl SelectorRule {
    fn compile(spec: &FieldSpec) -> Result<Self, ConfigError> {
        let selector = parse_selector(&spec.selector, &spec.field.to_string())?;
        let source = match &spec.attr {
            Some(attr) => ValueSource::Attribute(attr.clone()),
            None => ValueSource::Text,
        };
        Ok(SelectorRule {
            raw: spec.selector.clone(),
            selector,
            source,
            post: spec.post,
        })
    }

    /// Applies this rule inside a product container.
    ///
    /// A rule that matches nothing yields None, never an error; absence is
    /// resolved downstream by the normalizer.
    pub fn extract(&self, container: ElementRef<'_>) -> Option<String> {
        let element = container.select(&self.selector).next()?;

        let value = match &self.source {
            ValueSource::Text => {
                let text: String = element.text().collect();
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.to_string()
            }
            ValueSource::Attribute(attr) => {
                let raw = element.value().attr(attr)?;
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.to_string()
            }
        };

        match self.post {
            Some(post) => post.apply(&value),
            None => Some(value),
        }
    }
}

/// The compiled selector catalog for one supplier
#[derive(Debug, Clone)]
pub struct Catalog {
    pub container: Selector,
    pub next_page: Option<Selector>,
    pub page_links: Option<Selector>,
    pub rules: Vec<(FieldName, SelectorRule)>,
}

impl Catalog {
    /// Compiles a selector spec into a catalog.
    ///
    /// Called once per supplier at startup; any malformed selector aborts
    /// the run here.
    pub fn compile(spec: &SelectorSpec) -> Result<Self, ConfigError> {
        let container = parse_selector(&spec.container, "container")?;

        let next_page = spec
            .next_page
            .as_deref()
            .map(|s| parse_selector(s, "next-page"))
            .transpose()?;

        let page_links = spec
            .page_links
            .as_deref()
            .map(|s| parse_selector(s, "page-links"))
            .transpose()?;

        let mut rules = Vec::with_capacity(spec.fields.len());
        for field_spec in &spec.fields {
            rules.push((field_spec.field, SelectorRule::compile(field_spec)?));
        }

        Ok(Catalog {
            container,
            next_page,
            page_links,
            rules,
        })
    }
}

fn parse_selector(selector: &str, field: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}
