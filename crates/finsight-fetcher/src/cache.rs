//! Content-addressed disk cache for fetched filings. Keyed by
//! `(ticker, year, filing_type)`; a cache hit short-circuits the network
//! call. Writes are atomic (write to a temp path, then rename) so a
//! crash mid-download never leaves a partial file behind ("emits no
//! partial files").

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone)]
pub struct FilingCache {
    root: PathBuf,
}

/// The filing-header fields a cache hit must still be able to answer,
/// since C5's `FilingHeaderInput` needs them regardless of whether the
/// filing came from the network or from disk this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFilingMeta {
    pub accession_number: String,
    pub filing_date: NaiveDate,
    pub fiscal_year_end: NaiveDate,
    pub source_url: String,
}

/// The set of files that make up one cached filing: the primary
/// instance/iXBRL document plus whichever linkbase siblings were present
/// in the source directory (the parser tolerates missing
/// linkbases except for the instance itself), plus the header metadata
/// needed to load it.
#[derive(Debug, Clone)]
pub struct CachedFiling {
    pub instance_path: PathBuf,
    pub linkbase_paths: Vec<PathBuf>,
    pub meta: CachedFilingMeta,
}

impl FilingCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn filing_dir(&self, ticker: &str, year: i32, filing_type: &str) -> PathBuf {
        self.root
            .join(ticker.to_uppercase())
            .join(year.to_string())
            .join(filing_type.replace('/', "_"))
    }

    /// Returns the cached filing if a complete copy already exists on
    /// disk (the directory contains the sentinel `.complete` marker
    /// written after the last file's atomic rename).
    pub async fn get(&self, ticker: &str, year: i32, filing_type: &str) -> Option<CachedFiling> {
        let dir = self.filing_dir(ticker, year, filing_type);
        if !dir.join(".complete").exists() {
            return None;
        }
        let meta_bytes = fs::read(dir.join("meta.json")).await.ok()?;
        let meta: CachedFilingMeta = serde_json::from_slice(&meta_bytes).ok()?;

        let mut entries = fs::read_dir(&dir).await.ok()?;
        let mut instance_path = None;
        let mut linkbase_paths = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            if name == ".complete" || name == "meta.json" {
                continue;
            }
            if is_linkbase_file(&name) {
                linkbase_paths.push(path);
            } else if instance_path.is_none() {
                instance_path = Some(path);
            }
        }
        let instance_path = instance_path?;
        debug!(ticker, year, filing_type, "cache hit");
        Some(CachedFiling {
            instance_path,
            linkbase_paths,
            meta,
        })
    }

    /// Atomically writes the instance document, any linkbase siblings,
    /// and the header metadata sidecar for `(ticker, year, filing_type)`,
    /// then marks the directory complete. `files` is `(file_name, content)`.
    pub async fn put(
        &self,
        ticker: &str,
        year: i32,
        filing_type: &str,
        files: Vec<(String, Vec<u8>)>,
        meta: CachedFilingMeta,
    ) -> FetchResult<CachedFiling> {
        let dir = self.filing_dir(ticker, year, filing_type);
        fs::create_dir_all(&dir).await?;

        let mut instance_path = None;
        let mut linkbase_paths = Vec::new();

        for (name, content) in files {
            let final_path = dir.join(&name);
            let tmp_path = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
            fs::write(&tmp_path, &content).await?;
            fs::rename(&tmp_path, &final_path).await?;

            if is_linkbase_file(&name) {
                linkbase_paths.push(final_path);
            } else if instance_path.is_none() {
                instance_path = Some(final_path);
            }
        }

        let meta_bytes = serde_json::to_vec_pretty(&meta).map_err(|e| FetchError::Cache(e.to_string()))?;
        let meta_tmp = dir.join(format!(".meta.json.{}.tmp", Uuid::new_v4()));
        fs::write(&meta_tmp, &meta_bytes).await?;
        fs::rename(&meta_tmp, dir.join("meta.json")).await?;

        let complete_marker = dir.join(".complete");
        let tmp_marker = dir.join(format!(".complete.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_marker, b"").await?;
        fs::rename(&tmp_marker, &complete_marker).await?;

        let instance_path = instance_path.ok_or_else(|| {
            crate::error::FetchError::Cache("no instance document among fetched files".into())
        })?;

        Ok(CachedFiling {
            instance_path,
            linkbase_paths,
            meta,
        })
    }
}

fn is_linkbase_file(name: &str) -> bool {
    const SUFFIXES: [&str; 5] = ["_pre.xml", "_cal.xml", "_lab.xml", "_ref.xml", "_def.xml"];
    SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// SHA-256 of a filing's combined content, used as `source_documents.content_hash`.
pub fn content_hash(files: &[(String, Vec<u8>)]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for (name, content) in files {
        hasher.update(name.as_bytes());
        hasher.update(content);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips_and_is_atomic() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FilingCache::new(tmp.path());

        assert!(cache.get("AAPL", 2023, "10-K").await.is_none());

        let files = vec![
            ("aapl-20230930.htm".to_string(), b"<xbrl/>".to_vec()),
            ("aapl-20230930_pre.xml".to_string(), b"<presentation/>".to_vec()),
            ("aapl-20230930_cal.xml".to_string(), b"<calculation/>".to_vec()),
        ];
        let meta = CachedFilingMeta {
            accession_number: "0000320193-23-000106".to_string(),
            filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
            fiscal_year_end: NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
            source_url: "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/".to_string(),
        };
        cache.put("AAPL", 2023, "10-K", files, meta).await.unwrap();

        let cached = cache.get("AAPL", 2023, "10-K").await.unwrap();
        assert!(cached.instance_path.ends_with("aapl-20230930.htm"));
        assert_eq!(cached.linkbase_paths.len(), 2);
        assert_eq!(cached.meta.accession_number, "0000320193-23-000106");
    }

    #[test]
    fn content_hash_is_deterministic() {
        let files = vec![("a.xml".to_string(), b"hello".to_vec())];
        assert_eq!(content_hash(&files), content_hash(&files));
    }
}
