//! Category walker
//!
//! Drives the fetcher and extractor across all pages of one category until
//! pagination ends, a configured cap triggers, or the run is cancelled.
//! Failures are contained here: a failed page ends or skips within this
//! category only and never propagates to sibling categories.

use crate::catalog::Catalog;
use crate::config::ScrapingConfig;
use crate::product::{Category, RawProduct};
use crate::scrape::extractor::{extract_page, ExtractError, NextPage};
use crate::scrape::fetcher::{FetchError, Fetcher};
use crate::scrape::CancelFlag;
use crate::state::SupplierPacing;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Walks one category listing and accumulates its raw products.
///
/// Pages are fetched sequentially in traversal order. The walk ends when the
/// cursor is terminal, `max_pages_per_category` or
/// `max_products_per_category` is reached, selectors have drifted, a
/// next-link page fails, or the run is cancelled. The accumulated products
/// up to that point are always returned.
pub async fn walk_category(
    fetcher: Arc<Fetcher>,
    catalog: Arc<Catalog>,
    supplier: String,
    category: Category,
    start_url: Url,
    config: ScrapingConfig,
    pacing: Arc<Mutex<SupplierPacing>>,
    cancel: CancelFlag,
) -> Vec<RawProduct> {
    let mut products: Vec<RawProduct> = Vec::new();
    let mut target = start_url.clone();
    let mut page_number: u32 = 1;
    // Whether the current target came from numbered page links; if so a
    // failed page can be skipped because later page URLs are derivable.
    let mut numbered = false;

    loop {
        if cancel.is_cancelled() {
            tracing::info!(
                "{}/{}: cancelled after {} pages, keeping {} products",
                supplier,
                category,
                page_number - 1,
                products.len()
            );
            break;
        }

        if page_number > config.max_pages_per_category {
            tracing::debug!(
                "{}/{}: reached max pages ({})",
                supplier,
                category,
                config.max_pages_per_category
            );
            break;
        }

        if products.len() >= config.max_products_per_category {
            tracing::debug!(
                "{}/{}: reached max products ({})",
                supplier,
                category,
                config.max_products_per_category
            );
            break;
        }

        let page = match fetcher.fetch(&target, &pacing).await {
            Ok(page) => page,
            Err(e) => {
                match &e {
                    FetchError::NonRetryable { url, status } => {
                        tracing::warn!(
                            "{}/{}: skipping page, HTTP {} for {}",
                            supplier,
                            category,
                            status,
                            url
                        );
                    }
                    other => {
                        tracing::warn!("{}/{}: page failed: {}", supplier, category, other);
                    }
                }

                if numbered {
                    // Page indices are known independently of content, so
                    // move on to the next candidate page
                    page_number += 1;
                    target = url_with_page(&start_url, page_number);
                    continue;
                }
                // Pagination depended on this page's content; stop here
                break;
            }
        };

        let extracted = match extract_page(
            &page.body,
            &catalog,
            &supplier,
            category,
            &target,
            page_number,
        ) {
            Ok(extracted) => extracted,
            Err(ExtractError::SelectorDrift { url, reason }) => {
                tracing::warn!(
                    "{}/{}: selector drift on {} ({}), ending category walk",
                    supplier,
                    category,
                    url,
                    reason
                );
                break;
            }
        };

        let remaining = config.max_products_per_category - products.len();
        let took = extracted.products.len().min(remaining);
        products.extend(extracted.products.into_iter().take(remaining));

        tracing::debug!(
            "{}/{}: page {} yielded {} products ({} total)",
            supplier,
            category,
            page_number,
            took,
            products.len()
        );

        match extracted.next {
            Some(NextPage::Link(url)) => {
                numbered = false;
                target = url;
                page_number += 1;
            }
            Some(NextPage::Number(n)) => {
                numbered = true;
                page_number = n;
                target = url_with_page(&start_url, n);
            }
            None => break,
        }
    }

    tracing::info!(
        "{}/{}: walk finished with {} products",
        supplier,
        category,
        products.len()
    );

    products
}

/// Builds the URL for a numbered page by setting the `page` query parameter.
fn url_with_page(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in kept {
            pairs.append_pair(&k, &v);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}
