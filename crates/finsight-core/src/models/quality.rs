use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{derived_totals_audit, quality_scores};

/// One validator check result for one filing. Replaced per
/// filing per check on every re-load.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = quality_scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QualityScore {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub check_name: String,
    pub passed: bool,
    pub severity: String,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
    pub difference: Option<f64>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = quality_scores)]
pub struct NewQualityScore {
    pub filing_id: Uuid,
    pub check_name: String,
    pub passed: bool,
    pub severity: String,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
    pub difference: Option<f64>,
    pub details: Option<String>,
}

/// `severity ∈ {info, warning, error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// an audit entry for every derived total C7 writes back.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = derived_totals_audit)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DerivedTotalsAudit {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub concept_id: Uuid,
    pub fact_id: Uuid,
    pub computed_value: f64,
    pub component_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = derived_totals_audit)]
pub struct NewDerivedTotalsAudit {
    pub filing_id: Uuid,
    pub concept_id: Uuid,
    pub fact_id: Uuid,
    pub computed_value: f64,
    pub component_count: i32,
}
