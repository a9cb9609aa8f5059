use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{calc_rel, footnote_ref, pres_rel};

/// A calculation-linkbase parent/child summation relationship.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = calc_rel)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CalcRel {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub weight: f64,
    pub order_index: i32,
    pub source: String,
    pub is_synthetic: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = calc_rel)]
pub struct NewCalcRel {
    pub filing_id: Uuid,
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub weight: f64,
    pub order_index: i32,
    pub source: String,
    pub is_synthetic: bool,
    pub confidence: f64,
}

/// A presentation-linkbase parent/child display relationship.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = pres_rel)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PresRel {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub order_index: i32,
    pub role_uri: String,
    pub statement_type: Option<String>,
    pub source: String,
    pub is_synthetic: bool,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = pres_rel)]
pub struct NewPresRel {
    pub filing_id: Uuid,
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub order_index: i32,
    pub role_uri: String,
    pub statement_type: Option<String>,
    pub source: String,
    pub is_synthetic: bool,
}

/// A footnote attached to a fact or, more broadly, a concept.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = footnote_ref)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FootnoteRef {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub fact_id: Option<Uuid>,
    pub concept_id: Option<Uuid>,
    pub text: String,
    pub label: Option<String>,
    pub role: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = footnote_ref)]
pub struct NewFootnoteRef {
    pub filing_id: Uuid,
    pub fact_id: Option<Uuid>,
    pub concept_id: Option<Uuid>,
    pub text: String,
    pub label: Option<String>,
    pub role: Option<String>,
    pub lang: Option<String>,
}

/// `source ∈ {xbrl, dimensional, standard}` on `calc_rel`/`pres_rel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipSource {
    Xbrl,
    Dimensional,
    Standard,
}

impl RelationshipSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipSource::Xbrl => "xbrl",
            RelationshipSource::Dimensional => "dimensional",
            RelationshipSource::Standard => "standard",
        }
    }
}
