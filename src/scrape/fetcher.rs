//! Rate-limited HTTP fetcher
//!
//! All page retrieval goes through here:
//! - a bounded slot pool caps concurrent requests across the whole run
//! - a random politeness delay precedes every request, widened per supplier
//!   after 429 responses
//! - the client identity header rotates per request
//! - transient failures (5xx, 429, timeouts) retry with exponential backoff
//!   and jitter; other 4xx responses fail immediately

use crate::config::ScrapingConfig;
use crate::state::{RetrySchedule, RetryState, SupplierPacing};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// Rotating client identity pool; one entry is drawn per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

/// First backoff delay; doubles per attempt up to the cap.
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Errors surfaced by a fetch, after retry policy has been applied
#[derive(Debug, Error)]
pub enum FetchError {
    /// 4xx other than 429: retrying will not help
    #[error("HTTP {status} for {url}")]
    NonRetryable { url: String, status: u16 },

    /// Transient failures kept happening until the retry budget ran out
    #[error("giving up on {url} after {attempts} retries: {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The request slot pool was closed (run shutdown)
    #[error("request slot pool closed")]
    PoolClosed,
}

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

/// Builds the shared HTTP client.
///
/// The User-Agent is set per request, not here, so it can rotate.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("fr-FR,fr;q=0.9,en;q=0.8"),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests under the politeness and retry policy
pub struct Fetcher {
    client: Client,
    config: ScrapingConfig,
    slots: Arc<Semaphore>,
}

impl Fetcher {
    pub fn new(client: Client, config: ScrapingConfig) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_concurrent_requests as usize));
        Self {
            client,
            config,
            slots,
        }
    }

    /// Fetches one URL.
    ///
    /// Holds a pool slot for the whole attempt sequence so retries of one
    /// page cannot crowd out other walkers beyond the configured concurrency.
    pub async fn fetch(
        &self,
        url: &Url,
        pacing: &Mutex<SupplierPacing>,
    ) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| FetchError::PoolClosed)?;

        let mut schedule =
            RetrySchedule::new(self.config.max_retries, BACKOFF_BASE, BACKOFF_CAP);

        loop {
            let delay = {
                let pacing = pacing.lock().await;
                pacing.politeness_delay(&self.config)
            };
            tokio::time::sleep(delay).await;

            let user_agent = pick_user_agent();
            let result = self
                .client
                .get(url.clone())
                .header(USER_AGENT, user_agent)
                .send()
                .await;

            let reason = match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                tracing::debug!("Fetched {} ({})", url, status.as_u16());
                                return Ok(FetchedPage {
                                    url: url.clone(),
                                    status: status.as_u16(),
                                    body,
                                });
                            }
                            Err(e) => format!("body read failed: {}", e),
                        }
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        let mut pacing = pacing.lock().await;
                        pacing.record_rate_limit();
                        tracing::warn!(
                            "HTTP 429 for {}, widening delay window to {}x",
                            url,
                            pacing.widen_factor()
                        );
                        "HTTP 429".to_string()
                    } else if status.is_server_error() {
                        format!("HTTP {}", status.as_u16())
                    } else {
                        // Other 4xx: logged and skipped by the caller
                        return Err(FetchError::NonRetryable {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) if e.is_timeout() => "request timeout".to_string(),
                Err(e) if e.is_connect() => "connection failed".to_string(),
                Err(e) => e.to_string(),
            };

            match schedule.record_failure() {
                RetryState::BackingOff(backoff) => {
                    tracing::debug!(
                        "Transient failure for {} ({}), retry {} in {:?}",
                        url,
                        reason,
                        schedule.attempts(),
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                RetryState::Exhausted => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: schedule.attempts(),
                        reason,
                    });
                }
            }
        }
    }
}

fn pick_user_agent() -> &'static str {
    let index = rand::Rng::gen_range(&mut rand::thread_rng(), 0..USER_AGENTS.len());
    USER_AGENTS[index]
}
