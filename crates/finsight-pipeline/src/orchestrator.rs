//! C9 Orchestrator: stitches C1 (fetch) through C8 (validate) into
//! the single `run_pipeline` entry point, and exposes `validate` as the
//! standalone callable. Each stage is sequential within a filing
//! ("single-threaded cooperative per filing"); the whole run is
//! wrapped in the per-filing wall-clock cap from via
//! `tokio::time::timeout`.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use finsight_core::config::Config;
use finsight_core::database::DatabasePool;
use finsight_core::error::AppError;
use finsight_core::models::{FilingType, NewCompany, NewSourceDocument};
use finsight_core::schema::source_documents;
use finsight_fetcher::Fetcher;
use finsight_load::loader::FilingHeaderInput;
use finsight_materialize::{materialize_statements, run_derived_totals};
use finsight_taxonomy::TaxonomyCache;
use finsight_validate::report::{FilingReport, ValidationReport};
use finsight_xbrl::{parse_filing, Linkbases};

use crate::error::{PipelineError, PipelineResult};
use crate::taxonomy_source::{package_url, standard_for_filing_type, taxonomy_name};
use crate::ticker_resolver::TickerResolver;

/// Everything one `run_pipeline` call needs that isn't recreated per
/// filing: the HTTP/db clients and caches a batch run amortises across
/// many filings (fetch/taxonomy caches are shared; the DB pool is
/// the only mutable shared resource).
pub struct Pipeline {
    config: Config,
    pool: DatabasePool,
    fetcher: Fetcher,
    taxonomy_cache: TaxonomyCache,
    ticker_resolver: TickerResolver,
}

impl Pipeline {
    pub fn new(config: Config, pool: DatabasePool) -> Self {
        let fetcher = Fetcher::new(config.filing_cache_dir.clone());
        let taxonomy_cache = TaxonomyCache::new(config.taxonomy_cache_dir.clone());
        let ticker_resolver = TickerResolver::new(reqwest::Client::new());
        Self {
            config,
            pool,
            fetcher,
            taxonomy_cache,
            ticker_resolver,
        }
    }

    /// `run_pipeline(ticker, year, filing_type)`. Resolves the
    /// ticker, fetches the filing (C1), parses it (C3), normalizes and
    /// loads it into the star schema (C4/C5), materialises its
    /// statements and derives missing totals (C6/C7), then runs the
    /// per-filing validator checks (C8) and persists them. The whole
    /// sequence is bounded by the configured per-filing timeout.
    pub async fn run_pipeline(&self, ticker: &str, year: i32, filing_type: FilingType) -> PipelineResult<Uuid> {
        let timeout = self.config.filing_timeout();
        match tokio::time::timeout(timeout, self.run_pipeline_inner(ticker, year, filing_type)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(timeout)),
        }
    }

    async fn run_pipeline_inner(&self, ticker: &str, year: i32, filing_type: FilingType) -> PipelineResult<Uuid> {
        let span = info_span!("run_pipeline", ticker, year, filing_type = filing_type.as_str());
        async move {
            info!("resolving ticker");
            let resolved = self.ticker_resolver.resolve(ticker).await?;

            info!(cik = %resolved.cik, "fetching filing (C1)");
            let cached = self
                .fetcher
                .fetch(&resolved.cik, ticker, year, filing_type.as_str())
                .await
                .map_err(AppError::from)?;

            let standard = standard_for_filing_type(filing_type);
            let taxonomy = taxonomy_name(standard, year);
            info!(taxonomy, "loading taxonomy (C2)");
            let (taxonomy_index, equivalence_groups) = self
                .taxonomy_cache
                .load(&taxonomy, &package_url(standard, year))
                .await
                .map_err(AppError::from)?;

            info!("parsing filing (C3)");
            let instance_bytes = tokio::fs::read(&cached.instance_path).await.map_err(AppError::from)?;
            self.record_source_document(ticker, year, filing_type, &cached, &instance_bytes).await?;
            let instance_text = String::from_utf8_lossy(&instance_bytes).into_owned();
            let linkbases = self.collect_linkbases(&cached.linkbase_paths).await?;
            let parsed = parse_filing(&instance_text, &linkbases).map_err(AppError::from)?;
            if parsed.malformed_count > 0 {
                warn!(malformed = parsed.malformed_count, "skipped malformed facts during parse");
            }

            info!(facts = parsed.facts.len(), "loading filing into warehouse (C4/C5)");
            let new_company = NewCompany::new(ticker.to_uppercase(), resolved.legal_name.clone(), resolved.cik.clone(), standard);
            let header = FilingHeaderInput {
                filing_type,
                fiscal_year_end: cached.meta.fiscal_year_end,
                filing_date: cached.meta.filing_date,
                accession_number: cached.meta.accession_number.clone(),
                source_url: cached.meta.source_url.clone(),
            };
            let filing_id = finsight_load::load_filing(
                &self.pool,
                &new_company,
                &header,
                &taxonomy,
                &parsed,
                &taxonomy_index,
                &equivalence_groups,
                self.config.fact_insert_batch_size,
            )
            .await?;

            info!("materialising statements (C6)");
            let statement_rows = materialize_statements(&self.pool, filing_id, &parsed.labels).await?;
            info!(statement_rows, "derived totals (C7)");
            let derived = run_derived_totals(&self.pool, filing_id).await?;
            info!(derived, "running validator (C8)");
            self.persist_filing_report(filing_id).await?;

            Ok(filing_id)
        }
        .instrument(span)
        .await
    }

    /// The fetcher's "no partial files" guarantee stops at the
    /// filesystem; the warehouse-side record of what was fetched (used
    /// to report cache hits without re-stat'ing disk) is upserted here.
    async fn record_source_document(
        &self,
        ticker: &str,
        year: i32,
        filing_type: FilingType,
        cached: &finsight_fetcher::CachedFiling,
        instance_bytes: &[u8],
    ) -> PipelineResult<()> {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use sha2::{Digest, Sha256};

        let mut conn = self.pool.get().await.map_err(AppError::from)?;
        let linkbase_paths: Vec<String> = cached.linkbase_paths.iter().map(|p| p.display().to_string()).collect();
        let content_hash = hex::encode(Sha256::digest(instance_bytes));
        let row = NewSourceDocument {
            ticker: ticker.to_uppercase(),
            fiscal_year: year,
            filing_type: filing_type.as_str().to_string(),
            instance_path: cached.instance_path.display().to_string(),
            linkbase_paths: serde_json::json!(linkbase_paths),
            content_hash: content_hash.clone(),
        };

        diesel::insert_into(source_documents::table)
            .values(&row)
            .on_conflict((source_documents::ticker, source_documents::fiscal_year, source_documents::filing_type))
            .do_update()
            .set((
                source_documents::instance_path.eq(&row.instance_path),
                source_documents::linkbase_paths.eq(&row.linkbase_paths),
                source_documents::content_hash.eq(&row.content_hash),
                source_documents::fetched_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// Loads each cached linkbase sibling into the `Linkbases` bundle C3
    /// expects, keyed by the SEC-conventional filename suffix.
    async fn collect_linkbases(&self, paths: &[std::path::PathBuf]) -> PipelineResult<Linkbases> {
        let mut linkbases = Linkbases::default();
        for path in paths {
            let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            let bytes = tokio::fs::read(path).await.map_err(AppError::from)?;
            if name.ends_with("_pre.xml") {
                linkbases.presentation = Some(bytes);
            } else if name.ends_with("_cal.xml") {
                linkbases.calculation = Some(bytes);
            } else if name.ends_with("_lab.xml") {
                linkbases.label = Some(bytes);
            } else if name.ends_with("_ref.xml") {
                linkbases.reference = Some(bytes);
            }
        }
        Ok(linkbases)
    }

    /// Runs C8's per-filing checks (plus the retained-earnings
    /// rollforward, which needs the two-period lookup in
    /// `retained_earnings_check`) and persists the resulting
    /// `quality_scores` rows, replacing any rows left from a prior load
    /// of the same filing ("Validator rows are replaced per filing
    /// per check").
    async fn persist_filing_report(&self, filing_id: Uuid) -> PipelineResult<FilingReport> {
        let mut report = finsight_validate::run_filing_checks(&self.pool, filing_id).await?;
        if let Some(re_check) = finsight_validate::retained_earnings_check(&self.pool, filing_id).await? {
            report.checks.push(re_check);
        }
        self.write_quality_scores(filing_id, &report).await?;
        Ok(report)
    }

    async fn write_quality_scores(&self, filing_id: Uuid, report: &FilingReport) -> PipelineResult<()> {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use finsight_core::models::NewQualityScore;
        use finsight_core::schema::quality_scores;

        let mut conn = self.pool.get().await.map_err(AppError::from)?;
        diesel::delete(quality_scores::table.filter(quality_scores::filing_id.eq(filing_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        let rows: Vec<NewQualityScore> = report
            .checks
            .iter()
            .map(|check| NewQualityScore {
                filing_id,
                check_name: check.check_name.clone(),
                passed: check.passed,
                severity: check.severity.as_str().to_string(),
                expected: check.expected,
                actual: check.actual,
                difference: check.difference,
                details: check.details.clone(),
            })
            .collect();

        if !rows.is_empty() {
            diesel::insert_into(quality_scores::table).values(&rows).execute(&mut conn).await.map_err(AppError::from)?;
        }

        let score = report.weighted_score();
        diesel::update(finsight_core::schema::dim_filings::table.find(filing_id))
            .set((
                finsight_core::schema::dim_filings::validation_score.eq(score),
                finsight_core::schema::dim_filings::completeness_score.eq(score),
                finsight_core::schema::dim_filings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}

/// `validate(database_connection)`: runs the full check suite
/// (per-filing plus cross-filing population checks) over every filing
/// already loaded into `pool`, independent of any particular run.
pub async fn validate(pool: &DatabasePool) -> PipelineResult<ValidationReport> {
    // `validate()` is invoked standalone, often long after the taxonomy
    // that produced a given filing's concepts has left the in-process
    // cache; reference-equivalence here degrades to "never additionally
    // equivalent" rather than re-downloading every taxonomy a company's
    // filings might span. Concepts are still compared via the
    // `normalized_label`/`INTENTIONAL_MERGES` checks that don't need it.
    let report = finsight_validate::validate(pool, |_, _| false).await?;
    Ok(report)
}

/// Convenience timeout wrapper: a per-filing wall-clock cap that
/// aborts the current filing transaction cleanly when exceeded.
pub fn default_timeout(config: &Config) -> Duration {
    config.filing_timeout()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use finsight_core::models::{AccountingStandard, ExtractionMethod, NewCompany};
    use finsight_core::test_utils::TestContainer;
    use finsight_taxonomy::{EquivalenceGroups, TaxonomyIndex};
    use finsight_xbrl::context::XbrlPeriod;
    use finsight_xbrl::fact::ParsedFact;
    use serial_test::serial;

    use super::*;

    fn test_pipeline(pool: DatabasePool) -> Pipeline {
        Pipeline::new(Config::default(), pool)
    }

    fn sample_fact(concept: &str, value: f64, instant: NaiveDate) -> ParsedFact {
        ParsedFact {
            concept_qname: concept.to_string(),
            taxonomy: "us-gaap".to_string(),
            context_id: "FY2023".to_string(),
            period: XbrlPeriod { instant: Some(instant), start_date: None, end_date: None },
            dimensions: Vec::new(),
            unit: Some("iso4217:USD".to_string()),
            decimals: Some(-6),
            scale: None,
            value_text: None,
            value_numeric: Some(value),
            xbrl_fact_id: Some(format!("f-{concept}")),
            source_line: None,
            order_index: 0,
            is_primary: true,
            extraction_method: ExtractionMethod::Instance,
        }
    }

    async fn seed_filing(pool: &DatabasePool) -> Uuid {
        let instant = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        let parsed = finsight_xbrl::ParsedFiling {
            facts: vec![
                sample_fact("Assets", 1_000_000.0, instant),
                sample_fact("LiabilitiesAndStockholdersEquity", 1_000_000.0, instant),
            ],
            malformed_count: 0,
            calculation_arcs: Vec::new(),
            presentation_arcs: Vec::new(),
            labels: Vec::new(),
            references: Vec::new(),
        };
        let taxonomy_index = TaxonomyIndex { taxonomy: "us-gaap-2023".to_string(), ..Default::default() };
        let groups = EquivalenceGroups::build(&taxonomy_index);
        let new_company = NewCompany::new("AAPL", "Apple Inc.", "0000320193", AccountingStandard::UsGaap);
        let header = FilingHeaderInput {
            filing_type: FilingType::TenK,
            fiscal_year_end: instant,
            filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
            accession_number: "0000320193-23-000106".to_string(),
            source_url: "https://www.sec.gov/Archives/edgar/data/320193/filing.htm".to_string(),
        };
        finsight_load::load_filing(pool, &new_company, &header, "us-gaap", &parsed, &taxonomy_index, &groups, 500)
            .await
            .expect("seed load should succeed")
    }

    #[tokio::test]
    #[serial]
    async fn persist_filing_report_writes_quality_scores_and_filing_score() {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use finsight_core::schema::{dim_filings, quality_scores};

        let container = TestContainer::new().await;
        let pool = container.pool().clone();
        let filing_id = seed_filing(&pool).await;
        let pipeline = test_pipeline(pool.clone());

        let report = pipeline.persist_filing_report(filing_id).await.expect("report should persist");
        assert!(!report.checks.is_empty());

        let mut conn = pool.get().await.unwrap();
        let stored: i64 = quality_scores::table
            .filter(quality_scores::filing_id.eq(filing_id))
            .count()
            .get_result(&mut conn)
            .await
            .unwrap();
        assert_eq!(stored as usize, report.checks.len());

        let score: Option<f64> = dim_filings::table.find(filing_id).select(dim_filings::validation_score).first(&mut conn).await.unwrap();
        assert!(score.is_some());
    }

    #[tokio::test]
    #[serial]
    async fn persist_filing_report_replaces_rows_on_rerun_instead_of_duplicating() {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use finsight_core::schema::quality_scores;

        let container = TestContainer::new().await;
        let pool = container.pool().clone();
        let filing_id = seed_filing(&pool).await;
        let pipeline = test_pipeline(pool.clone());

        pipeline.persist_filing_report(filing_id).await.unwrap();
        pipeline.persist_filing_report(filing_id).await.unwrap();

        let mut conn = pool.get().await.unwrap();
        let names: Vec<String> = quality_scores::table.filter(quality_scores::filing_id.eq(filing_id)).select(quality_scores::check_name).load(&mut conn).await.unwrap();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
    }

    #[tokio::test]
    #[serial]
    async fn record_source_document_upserts_on_repeated_fetch() {
        let container = TestContainer::new().await;
        let pool = container.pool().clone();
        seed_filing(&pool).await;
        let pipeline = test_pipeline(pool.clone());

        let cached = finsight_fetcher::CachedFiling {
            instance_path: "/tmp/aapl-20230930.htm".into(),
            linkbase_paths: vec!["/tmp/aapl-20230930_pre.xml".into()],
            meta: finsight_fetcher::cache::CachedFilingMeta {
                accession_number: "0000320193-23-000106".to_string(),
                filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
                fiscal_year_end: NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
                source_url: "https://www.sec.gov/Archives/edgar/data/320193/filing.htm".to_string(),
            },
        };

        pipeline.record_source_document("AAPL", 2023, FilingType::TenK, &cached, b"<xbrl/>").await.unwrap();
        pipeline.record_source_document("AAPL", 2023, FilingType::TenK, &cached, b"<xbrl/>").await.unwrap();

        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use finsight_core::schema::source_documents;
        let mut conn = pool.get().await.unwrap();
        let count: i64 = source_documents::table
            .filter(source_documents::ticker.eq("AAPL"))
            .filter(source_documents::fiscal_year.eq(2023))
            .count()
            .get_result(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn collect_linkbases_sorts_by_filename_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config { filing_cache_dir: tmp.path().to_path_buf(), taxonomy_cache_dir: tmp.path().to_path_buf(), ..Config::default() };
        let pool_result = finsight_core::database::create_pool(&config.database_url).await;
        let pool = match pool_result {
            Ok(pool) => pool,
            Err(_) => return,
        };
        let pipeline = Pipeline::new(config, pool);

        let pre = tmp.path().join("foo_pre.xml");
        let cal = tmp.path().join("foo_cal.xml");
        tokio::fs::write(&pre, b"<presentation/>").await.unwrap();
        tokio::fs::write(&cal, b"<calculation/>").await.unwrap();

        let linkbases = pipeline.collect_linkbases(&[pre, cal]).await.unwrap();
        assert!(linkbases.presentation.is_some());
        assert!(linkbases.calculation.is_some());
        assert!(linkbases.label.is_none());
    }

    #[tokio::test]
    async fn run_pipeline_wraps_timeouts_as_pipeline_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config { filing_cache_dir: tmp.path().to_path_buf(), taxonomy_cache_dir: tmp.path().to_path_buf(), filing_timeout_secs: 0, ..Config::default() };
        let pool_result = finsight_core::database::create_pool(&config.database_url).await;
        let pool = match pool_result {
            Ok(pool) => pool,
            Err(_) => return,
        };
        let pipeline = Pipeline::new(config, pool);
        let result = pipeline.run_pipeline("AAPL", 2023, FilingType::TenK).await;
        assert!(matches!(result, Err(PipelineError::Timeout(_))));
    }
}
