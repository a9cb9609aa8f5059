use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::dim_filings;

/// One per `(company, filing_type, fiscal_year_end)`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = dim_filings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Filing {
    pub id: Uuid,
    pub company_id: Uuid,
    pub filing_type: String,
    pub fiscal_year_end: NaiveDate,
    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub source_url: String,
    pub extraction_timestamp: DateTime<Utc>,
    pub validation_score: Option<f64>,
    pub completeness_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = dim_filings)]
pub struct NewFiling {
    pub company_id: Uuid,
    pub filing_type: String,
    pub fiscal_year_end: NaiveDate,
    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub source_url: String,
    pub validation_score: Option<f64>,
    pub completeness_score: Option<f64>,
}

/// the three filing forms the fetcher resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingType {
    TenK,
    TwentyF,
    TenQ,
}

impl FilingType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilingType::TenK => "10-K",
            FilingType::TwentyF => "20-F",
            FilingType::TenQ => "10-Q",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "10-K" => Some(FilingType::TenK),
            "20-F" => Some(FilingType::TwentyF),
            "10-Q" => Some(FilingType::TenQ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filing_type_round_trips_through_str() {
        for ft in [FilingType::TenK, FilingType::TwentyF, FilingType::TenQ] {
            assert_eq!(FilingType::parse(ft.as_str()), Some(ft));
        }
    }
}
