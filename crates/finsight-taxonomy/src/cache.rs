//! Taxonomy package download + disk cache. On first reference to
//! a taxonomy (e.g. `us-gaap-2023`) the full package is fetched and
//! parsed into the four indexes, then persisted as JSON so subsequent
//! runs never re-download it.

use std::path::PathBuf;

use reqwest::Client;
use tokio::fs;
use tracing::{debug, info};

use crate::equivalence::EquivalenceGroups;
use crate::error::{TaxonomyError, TaxonomyResult};
use crate::parse::parse_taxonomy_package;
use crate::types::TaxonomyIndex;

pub struct TaxonomyCache {
    root: PathBuf,
    client: Client,
}

impl TaxonomyCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            client: Client::new(),
        }
    }

    fn index_path(&self, taxonomy: &str) -> PathBuf {
        self.root.join(format!("{taxonomy}.json"))
    }

    /// Returns the cached, parsed taxonomy together with its derived
    /// equivalence groups, downloading and parsing on first reference.
    pub async fn load(&self, taxonomy: &str, package_url: &str) -> TaxonomyResult<(TaxonomyIndex, EquivalenceGroups)> {
        let index = match self.load_cached(taxonomy).await? {
            Some(index) => {
                debug!(taxonomy, "taxonomy cache hit");
                index
            }
            None => {
                info!(taxonomy, package_url, "downloading taxonomy package");
                let bytes = self
                    .client
                    .get(package_url)
                    .send()
                    .await
                    .map_err(|e| TaxonomyError::Fetch(taxonomy.to_string(), e.to_string()))?
                    .bytes()
                    .await
                    .map_err(|e| TaxonomyError::Fetch(taxonomy.to_string(), e.to_string()))?;
                let index = parse_taxonomy_package(taxonomy, &bytes)?;
                self.store(taxonomy, &index).await?;
                index
            }
        };
        let groups = EquivalenceGroups::build(&index);
        Ok((index, groups))
    }

    async fn load_cached(&self, taxonomy: &str) -> TaxonomyResult<Option<TaxonomyIndex>> {
        let path = self.index_path(taxonomy);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn store(&self, taxonomy: &str, index: &TaxonomyIndex) -> TaxonomyResult<()> {
        fs::create_dir_all(&self.root).await?;
        let path = self.index_path(taxonomy);
        let tmp_path = self.root.join(format!(".{taxonomy}.{}.tmp", uuid::Uuid::new_v4()));
        let bytes = serde_json::to_vec_pretty(index)?;
        fs::write(&tmp_path, bytes).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}
