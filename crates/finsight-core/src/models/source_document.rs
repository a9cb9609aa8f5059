use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::source_documents;

/// The on-disk cache index row for a fetched filing, mirroring the
/// fetcher's content-addressed cache keyed by `(ticker, year,
/// filing_type)`. Lets re-runs report cache hits from this table
/// without re-stat'ing the filesystem.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = source_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SourceDocument {
    pub id: Uuid,
    pub ticker: String,
    pub fiscal_year: i32,
    pub filing_type: String,
    pub instance_path: String,
    pub linkbase_paths: JsonValue,
    pub content_hash: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = source_documents)]
pub struct NewSourceDocument {
    pub ticker: String,
    pub fiscal_year: i32,
    pub filing_type: String,
    pub instance_path: String,
    pub linkbase_paths: JsonValue,
    pub content_hash: String,
}
