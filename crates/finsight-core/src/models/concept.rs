use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::dim_concepts;

/// A taxonomy element, e.g. `us-gaap:Assets` or `ifrs-full:ProfitLoss`.
///
/// Business key is `(concept_name, taxonomy)`; `normalized_label` is
/// written by the normalizer (C4) at load time and is otherwise owned by
/// this table, not recomputed by readers.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = dim_concepts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Concept {
    pub id: Uuid,
    pub concept_name: String,
    pub taxonomy: String,
    pub balance_type: Option<String>,
    pub period_type: String,
    pub data_type: Option<String>,
    pub is_abstract: bool,
    pub statement_type: Option<String>,
    pub normalized_label: String,
    pub preferred_label: Option<String>,
    pub hierarchy_level: Option<i32>,
    pub parent_concept_id: Option<Uuid>,
    pub calculation_weight: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = dim_concepts)]
pub struct NewConcept {
    pub concept_name: String,
    pub taxonomy: String,
    pub balance_type: Option<String>,
    pub period_type: String,
    pub data_type: Option<String>,
    pub is_abstract: bool,
    pub statement_type: Option<String>,
    pub normalized_label: String,
    pub preferred_label: Option<String>,
    pub hierarchy_level: Option<i32>,
    pub parent_concept_id: Option<Uuid>,
    pub calculation_weight: Option<i32>,
}

/// `balance type (debit/credit/none)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceType {
    Debit,
    Credit,
    None,
}

impl BalanceType {
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceType::Debit => "debit",
            BalanceType::Credit => "credit",
            BalanceType::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(BalanceType::Debit),
            "credit" => Some(BalanceType::Credit),
            "none" => Some(BalanceType::None),
            _ => None,
        }
    }
}

/// `period type (instant/duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Instant,
    Duration,
}

impl PeriodType {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodType::Instant => "instant",
            PeriodType::Duration => "duration",
        }
    }
}

/// inferred `statement_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementType {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    ComprehensiveIncome,
    EquityStatement,
    Notes,
    Other,
}

impl StatementType {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "balance_sheet",
            StatementType::IncomeStatement => "income_statement",
            StatementType::CashFlow => "cash_flow",
            StatementType::ComprehensiveIncome => "comprehensive_income",
            StatementType::EquityStatement => "equity_statement",
            StatementType::Notes => "notes",
            StatementType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "balance_sheet" => Some(StatementType::BalanceSheet),
            "income_statement" => Some(StatementType::IncomeStatement),
            "cash_flow" => Some(StatementType::CashFlow),
            "comprehensive_income" => Some(StatementType::ComprehensiveIncome),
            "equity_statement" => Some(StatementType::EquityStatement),
            "notes" => Some(StatementType::Notes),
            "other" => Some(StatementType::Other),
            _ => None,
        }
    }
}
