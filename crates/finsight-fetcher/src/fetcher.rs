//! C1 Fetcher orchestration. Resolves a `(ticker, year,
//! filing_type)` triple against the SEC EDGAR submissions index, downloads
//! the instance document and its linkbase siblings, and persists them to
//! the content-addressed cache. Retries transient network failures with
//! capped exponential backoff (3 attempts, 1s/4s/16s); a filing
//! that genuinely doesn't exist fails fast with `FETCH_NOT_FOUND` instead.

use std::time::Duration;

use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use tracing::{info, warn};

use crate::cache::{content_hash, CachedFiling, CachedFilingMeta, FilingCache};
use crate::error::{FetchError, FetchResult};
use crate::rate_limiter::RateLimiter;
use crate::sec_edgar::{filing_directory_url, submissions_url, CompanySubmissions};

const USER_AGENT: &str = "FinSight research@finsight.example";

pub struct Fetcher {
    client: Client,
    rate_limiter: RateLimiter,
    cache: FilingCache,
}

/// The linkbase suffixes a filer conventionally publishes alongside the
/// instance document. Missing siblings are tolerated; only the
/// instance document itself is mandatory.
const LINKBASE_SUFFIXES: [&str; 5] = ["_pre.xml", "_cal.xml", "_lab.xml", "_ref.xml", "_def.xml"];

impl Fetcher {
    pub fn new(cache_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("reqwest client build"),
            rate_limiter: RateLimiter::sec_edgar(),
            cache: FilingCache::new(cache_root),
        }
    }

    /// Fetches a filing, using the disk cache when a complete copy is
    /// already present. Returns the local paths of the instance document
    /// and any linkbase siblings actually retrieved.
    pub async fn fetch(
        &self,
        cik: &str,
        ticker: &str,
        fiscal_year: i32,
        filing_type: &str,
    ) -> FetchResult<CachedFiling> {
        if let Some(cached) = self.cache.get(ticker, fiscal_year, filing_type).await {
            info!(ticker, fiscal_year, filing_type, "filing cache hit");
            return Ok(cached);
        }

        let submissions = self.fetch_submissions(cik).await?;
        let resolved = submissions.find_filing(filing_type, fiscal_year)?;

        let dir_url = filing_directory_url(cik, &resolved.accession_number);
        let stem = resolved
            .primary_document
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&resolved.primary_document)
            .to_string();

        let mut files = Vec::new();
        files.push((
            resolved.primary_document.clone(),
            self.fetch_bytes(&format!("{dir_url}{}", resolved.primary_document))
                .await?,
        ));

        for suffix in LINKBASE_SUFFIXES {
            let name = format!("{stem}{suffix}");
            match self.fetch_bytes(&format!("{dir_url}{name}")).await {
                Ok(bytes) => files.push((name, bytes)),
                Err(FetchError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        let _hash = content_hash(&files);
        let meta = CachedFilingMeta {
            accession_number: resolved.accession_number.clone(),
            filing_date: resolved.filing_date,
            fiscal_year_end: resolved.fiscal_year_end,
            source_url: format!("{dir_url}{}", resolved.primary_document),
        };
        self.cache.put(ticker, fiscal_year, filing_type, files, meta).await
    }

    async fn fetch_submissions(&self, cik: &str) -> FetchResult<CompanySubmissions> {
        let url = submissions_url(cik);
        let bytes = self.fetch_bytes(&url).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Network(format!("invalid submissions JSON: {e}")))
    }

    /// Fetches `url`, retrying `FetchError::Network` with capped
    /// exponential backoff (3 attempts, 1s/4s/16s). A 404 is reported as
    /// `FetchError::NotFound` immediately and is never retried.
    async fn fetch_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.wait_for_permit().await;

        let backoff_policy = ExponentialBackoff {
            initial_interval: Duration::from_secs(1),
            multiplier: 4.0,
            max_interval: Duration::from_secs(16),
            max_elapsed_time: Some(Duration::from_secs(1 + 4 + 16)),
            ..ExponentialBackoff::default()
        };

        retry(backoff_policy, || async {
            match self.client.get(url).send().await {
                Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
                    Err(backoff::Error::permanent(FetchError::NotFound(url.to_string())))
                }
                Ok(resp) if resp.status().is_success() => resp
                    .bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|e| backoff::Error::transient(FetchError::Network(e.to_string()))),
                Ok(resp) => {
                    let status = resp.status();
                    warn!(url, %status, "transient fetch failure, will retry");
                    Err(backoff::Error::transient(FetchError::Network(format!(
                        "unexpected status {status}"
                    ))))
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    Err(backoff::Error::transient(FetchError::Network(e.to_string())))
                }
                Err(e) => Err(backoff::Error::permanent(FetchError::Network(e.to_string()))),
            }
        })
        .await
    }

    async fn wait_for_permit(&self) {
        while self.rate_limiter.try_permit().is_err() {
            let wait = self
                .rate_limiter
                .time_until_next_permit()
                .unwrap_or(Duration::from_millis(100));
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing.xml")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(tmp.path());
        let url = format!("{}/missing.xml", server.url());
        let result = fetcher.fetch_bytes(&url).await;

        assert!(matches!(result, Err(FetchError::NotFound(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn successful_fetch_returns_body_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/instance.xml")
            .with_status(200)
            .with_body("<xbrl/>")
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(tmp.path());
        let url = format!("{}/instance.xml", server.url());
        let bytes = fetcher.fetch_bytes(&url).await.unwrap();

        assert_eq!(bytes, b"<xbrl/>");
        mock.assert_async().await;
    }
}
