use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::fact_generic;

/// The central datum of the warehouse. Value is numeric xor
/// textual ("polymorphism of fact value" — modeled as two nullable
/// columns plus a derived discriminator, no subclass hierarchy).
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = fact_generic)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Fact {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub company_id: Uuid,
    pub concept_id: Uuid,
    pub period_id: Uuid,
    pub dimension_id: Option<Uuid>,
    pub value_numeric: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
    pub decimals: Option<i32>,
    pub scale: Option<i32>,
    pub context_id: Option<String>,
    pub xbrl_fact_id: Option<String>,
    pub source_line: Option<i32>,
    pub order_index: i32,
    pub is_primary: bool,
    pub is_calculated: bool,
    pub extraction_method: String,
    pub created_at: DateTime<Utc>,
}

impl Fact {
    /// "downstream consumers key off `value_numeric IS NOT NULL`".
    pub fn is_numeric(&self) -> bool {
        self.value_numeric.is_some()
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = fact_generic)]
pub struct NewFact {
    pub filing_id: Uuid,
    pub company_id: Uuid,
    pub concept_id: Uuid,
    pub period_id: Uuid,
    pub dimension_id: Option<Uuid>,
    pub value_numeric: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
    pub decimals: Option<i32>,
    pub scale: Option<i32>,
    pub context_id: Option<String>,
    pub xbrl_fact_id: Option<String>,
    pub source_line: Option<i32>,
    pub order_index: i32,
    pub is_primary: bool,
    pub is_calculated: bool,
    pub extraction_method: String,
}

/// "extraction method" provenance; 's parser reports one of
/// these per fact, stamps derived totals as `Calculated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    Instance,
    InlineXbrl,
    LinkbaseFallback,
    Calculated,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::Instance => "instance",
            ExtractionMethod::InlineXbrl => "inline_xbrl",
            ExtractionMethod::LinkbaseFallback => "linkbase_fallback",
            ExtractionMethod::Calculated => "calculated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_method_names_match_provenance_vocabulary() {
        assert_eq!(ExtractionMethod::Calculated.as_str(), "calculated");
        assert_eq!(ExtractionMethod::LinkbaseFallback.as_str(), "linkbase_fallback");
    }
}
