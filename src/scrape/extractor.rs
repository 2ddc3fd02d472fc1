//! Page extractor
//!
//! Turns one fetched listing page into raw product records plus a pagination
//! cursor, using a supplier's compiled selector catalog. A field rule that
//! matches nothing leaves the field absent; a page where nothing matches at
//! all is reported as selector drift so the walker can stop instead of
//! silently producing nothing after a markup change.

use crate::catalog::{Catalog, FieldName};
use crate::product::{Category, RawFields, RawProduct};
use chrono::Utc;
use scraper::Html;
use thiserror::Error;
use url::Url;

/// Extraction-level errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Previously valid selectors stopped matching: the markup has likely
    /// changed. Distinct from a category that legitimately has no products.
    #[error("selector drift on {url}: {reason}")]
    SelectorDrift { url: String, reason: String },
}

/// Where the walker should go after this page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// An explicit next-page link, already resolved to an absolute URL
    Link(Url),
    /// The next page index, derived from numbered page links
    Number(u32),
}

/// Result of extracting one page
#[derive(Debug)]
pub struct ExtractedPage {
    pub products: Vec<RawProduct>,
    pub next: Option<NextPage>,
}

/// Extracts raw products and the pagination cursor from one page.
///
/// `current_page` is the 1-based index of the page being extracted; it is
/// used to recognize numbered page links that point beyond this page.
pub fn extract_page(
    html: &str,
    catalog: &Catalog,
    supplier: &str,
    category: Category,
    page_url: &Url,
    current_page: u32,
) -> Result<ExtractedPage, ExtractError> {
    let document = Html::parse_document(html);

    let containers: Vec<_> = document.select(&catalog.container).collect();
    if containers.is_empty() {
        return Err(ExtractError::SelectorDrift {
            url: page_url.to_string(),
            reason: "container selector matched no elements".to_string(),
        });
    }

    let extracted_at = Utc::now();
    let mut products = Vec::new();

    for container in &containers {
        let mut fields = RawFields::default();

        for (field, rule) in &catalog.rules {
            let Some(value) = rule.extract(*container) else {
                continue;
            };

            match field {
                FieldName::Name => fields.name = Some(value),
                FieldName::Price => fields.price = Some(value),
                FieldName::Stock => fields.stock = Some(value),
                FieldName::Brand => fields.brand = Some(value),
                FieldName::Unit => fields.unit = Some(value),
                FieldName::PackSize => fields.pack_size = Some(value),
                // Link-bearing fields are resolved against the page URL
                FieldName::Url => fields.url = resolve_href(page_url, &value),
                FieldName::Image => fields.image = resolve_href(page_url, &value),
            }
        }

        // Containers where nothing matched are noise (ads, placeholders)
        if fields.is_empty() {
            continue;
        }

        products.push(RawProduct {
            supplier: supplier.to_string(),
            category,
            source_url: page_url.clone(),
            extracted_at,
            fields,
        });
    }

    if products.is_empty() {
        return Err(ExtractError::SelectorDrift {
            url: page_url.to_string(),
            reason: format!(
                "no field rule matched across {} containers",
                containers.len()
            ),
        });
    }

    let next = resolve_pagination(&document, catalog, page_url, current_page);

    Ok(ExtractedPage { products, next })
}

/// Resolves the pagination cursor for a page.
///
/// Resolution order: explicit next-page link when present and distinct from
/// the current URL, then numbered page links beyond the current page, then
/// terminal.
fn resolve_pagination(
    document: &Html,
    catalog: &Catalog,
    page_url: &Url,
    current_page: u32,
) -> Option<NextPage> {
    if let Some(selector) = &catalog.next_page {
        for element in document.select(selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Ok(next_url) = page_url.join(href.trim()) {
                if next_url != *page_url {
                    return Some(NextPage::Link(next_url));
                }
            }
        }
    }

    if let Some(selector) = &catalog.page_links {
        let mut highest = 0u32;
        for element in document.select(selector) {
            let text: String = element.text().collect();
            if let Ok(number) = text.trim().parse::<u32>() {
                highest = highest.max(number);
            }
        }
        if highest > current_page {
            return Some(NextPage::Number(current_page + 1));
        }
    }

    None
}

fn resolve_href(page_url: &Url, href: &str) -> Option<String> {
    page_url.join(href.trim()).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSpec, SelectorSpec};

    fn field(name: FieldName, selector: &str, attr: Option<&str>) -> FieldSpec {
        FieldSpec {
            field: name,
            selector: selector.to_string(),
            attr: attr.map(str::to_string),
            post: None,
        }
    }

    fn test_catalog() -> Catalog {
        Catalog::compile(&SelectorSpec {
            container: "div.product".to_string(),
            next_page: Some("a.next".to_string()),
            page_links: Some("a.page".to_string()),
            fields: vec![
                field(FieldName::Name, "h2", None),
                field(FieldName::Price, "span.price", None),
                field(FieldName::Url, "a.link", Some("href")),
                field(FieldName::Image, "img", Some("src")),
                field(FieldName::Stock, "span.stock", None),
            ],
        })
        .unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://www.leroymerlin.fr/carrelage").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
            <div class="product">
                <h2>Carrelage gris 60x60</h2>
                <span class="price">29,99 €</span>
                <a class="link" href="/p/1">voir</a>
                <img src="/img/1.jpg">
                <span class="stock">En stock</span>
            </div>
            <div class="product">
                <h2>Carrelage blanc 30x30</h2>
                <span class="price">15,50 €</span>
                <a class="link" href="/p/2">voir</a>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_products() {
        let extracted =
            extract_page(LISTING, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();

        assert_eq!(extracted.products.len(), 2);

        let first = &extracted.products[0];
        assert_eq!(first.fields.name.as_deref(), Some("Carrelage gris 60x60"));
        assert_eq!(first.fields.price.as_deref(), Some("29,99 €"));
        assert_eq!(
            first.fields.url.as_deref(),
            Some("https://www.leroymerlin.fr/p/1")
        );
        assert_eq!(
            first.fields.image.as_deref(),
            Some("https://www.leroymerlin.fr/img/1.jpg")
        );
        assert_eq!(first.fields.stock.as_deref(), Some("En stock"));

        // Missing elements yield absent fields, not errors
        let second = &extracted.products[1];
        assert_eq!(second.fields.image, None);
        assert_eq!(second.fields.stock, None);
    }

    #[test]
    fn test_no_pagination_is_terminal() {
        let extracted =
            extract_page(LISTING, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();
        assert_eq!(extracted.next, None);
    }

    #[test]
    fn test_next_page_link() {
        let html = format!(
            "{}<a class=\"next\" href=\"/carrelage?page=2\">suivant</a>",
            LISTING
        );
        let extracted =
            extract_page(&html, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();
        assert_eq!(
            extracted.next,
            Some(NextPage::Link(
                Url::parse("https://www.leroymerlin.fr/carrelage?page=2").unwrap()
            ))
        );
    }

    #[test]
    fn test_next_page_link_to_self_is_ignored() {
        let html = format!(
            "{}<a class=\"next\" href=\"/carrelage\">suivant</a>",
            LISTING
        );
        let extracted =
            extract_page(&html, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();
        assert_eq!(extracted.next, None);
    }

    #[test]
    fn test_numbered_page_links() {
        let html = format!(
            "{}<a class=\"page\">1</a><a class=\"page\">2</a><a class=\"page\">3</a>",
            LISTING
        );
        let extracted =
            extract_page(&html, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();
        assert_eq!(extracted.next, Some(NextPage::Number(2)));
    }

    #[test]
    fn test_numbered_links_behind_current_are_terminal() {
        let html = format!(
            "{}<a class=\"page\">1</a><a class=\"page\">2</a><a class=\"page\">3</a>",
            LISTING
        );
        let extracted =
            extract_page(&html, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 3)
                .unwrap();
        assert_eq!(extracted.next, None);
    }

    #[test]
    fn test_next_link_beats_numbered_links() {
        let html = format!(
            "{}<a class=\"next\" href=\"?page=2\">suivant</a><a class=\"page\">5</a>",
            LISTING
        );
        let extracted =
            extract_page(&html, &test_catalog(), "Leroy Merlin", Category::Tiles, &page_url(), 1)
                .unwrap();
        assert!(matches!(extracted.next, Some(NextPage::Link(_))));
    }

    #[test]
    fn test_zero_containers_is_drift() {
        let result = extract_page(
            "<html><body><p>rien ici</p></body></html>",
            &test_catalog(),
            "Leroy Merlin",
            Category::Tiles,
            &page_url(),
            1,
        );
        assert!(matches!(
            result.unwrap_err(),
            ExtractError::SelectorDrift { .. }
        ));
    }

    #[test]
    fn test_zero_field_matches_is_drift() {
        let html = r#"
            <div class="product"><p>ancien markup</p></div>
            <div class="product"><p>ancien markup</p></div>
        "#;
        let result = extract_page(
            html,
            &test_catalog(),
            "Leroy Merlin",
            Category::Tiles,
            &page_url(),
            1,
        );
        assert!(matches!(
            result.unwrap_err(),
            ExtractError::SelectorDrift { .. }
        ));
    }
}
