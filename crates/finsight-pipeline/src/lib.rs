// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C9 Orchestrator: the single entry point that stitches fetch (C1)
//! through validate (C8) into one filing load, plus the standalone
//! `validate` callable that re-runs the check suite over
//! whatever is already in the warehouse.
//!
//! [`Pipeline`] holds the HTTP/disk caches a batch run amortises across
//! many filings; [`run_pipeline`] is a convenience free function for
//! one-off callers that don't want to construct a `Pipeline` themselves.

pub mod error;
pub mod orchestrator;
pub mod taxonomy_source;
pub mod ticker_resolver;

use finsight_core::config::Config;
use finsight_core::database::DatabasePool;
use finsight_core::models::FilingType;
use uuid::Uuid;

pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{validate, Pipeline};

/// One-shot convenience wrapper around [`Pipeline`] for callers that
/// only ever load a single filing (e.g. a script, or a test). A batch
/// run over many tickers should construct a `Pipeline` directly instead
/// so its fetch/taxonomy caches and ticker index are reused rather than
/// rebuilt per filing.
pub async fn run_pipeline(ticker: &str, year: i32, filing_type: FilingType, config: &Config, pool: &DatabasePool) -> PipelineResult<Uuid> {
    Pipeline::new(config.clone(), pool.clone()).run_pipeline(ticker, year, filing_type).await
}
