use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::dim_companies;

/// A filing company, keyed by ticker.
///
/// Companies are upserted: created on first sight, never deleted.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = dim_companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Company {
    pub id: Uuid,
    pub ticker: String,
    pub legal_name: String,
    pub cik: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub primary_accounting_standard: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two accounting standards FinSight normalizes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountingStandard {
    UsGaap,
    Ifrs,
}

impl AccountingStandard {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountingStandard::UsGaap => "us_gaap",
            AccountingStandard::Ifrs => "ifrs",
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset, Validate, Serialize, Deserialize)]
#[diesel(table_name = dim_companies)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 16))]
    pub ticker: String,
    #[validate(length(min = 1))]
    pub legal_name: String,
    #[validate(length(min = 10, max = 10))]
    pub cik: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub primary_accounting_standard: String,
}

impl NewCompany {
    pub fn new(ticker: impl Into<String>, legal_name: impl Into<String>, cik: impl Into<String>, standard: AccountingStandard) -> Self {
        Self {
            ticker: ticker.into(),
            legal_name: legal_name.into(),
            cik: cik.into(),
            sector: None,
            industry: None,
            country: None,
            primary_accounting_standard: standard.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_company_validates_cik_length() {
        let good = NewCompany::new("AAPL", "Apple Inc.", "0000320193", AccountingStandard::UsGaap);
        assert!(good.validate().is_ok());

        let mut bad = good.clone();
        bad.cik = "123".to_string();
        assert!(bad.validate().is_err());
    }
}
