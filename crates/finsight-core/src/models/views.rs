use diesel::prelude::*;
use diesel::sql_types::{Bool, Float8, Int4, Nullable, Text, Timestamptz, Uuid as SqlUuid, Varchar};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only mapping of `v_facts_deduplicated`: one row per
/// `(company, normalized_label, fiscal_year, dimension, rounded_value)`,
/// with the canonical tie-break priority order among tied rows already
/// applied by the view's `row_number()` window function.
#[derive(Debug, Clone, QueryableByName, Serialize, Deserialize)]
pub struct FactDeduplicated {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub filing_id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub company_id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub concept_id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub period_id: Uuid,
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub dimension_id: Option<Uuid>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub value_numeric: Option<f64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub value_text: Option<String>,
    #[diesel(sql_type = Bool)]
    pub is_primary: bool,
    #[diesel(sql_type = Bool)]
    pub is_calculated: bool,
    #[diesel(sql_type = Int4)]
    pub order_index: i32,
    #[diesel(sql_type = Varchar)]
    pub normalized_label: String,
    #[diesel(sql_type = Varchar)]
    pub concept_name: String,
    #[diesel(sql_type = Nullable<Int4>)]
    pub hierarchy_level: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub calculation_weight: Option<i32>,
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub parent_concept_id: Option<Uuid>,
    #[diesel(sql_type = Int4)]
    pub fiscal_year: i32,
}

/// Read-only mapping of `v_facts_hierarchical`: the deduplicated
/// view joined with the parent concept's name/label.
#[derive(Debug, Clone, QueryableByName, Serialize, Deserialize)]
pub struct FactHierarchical {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub company_id: Uuid,
    #[diesel(sql_type = Nullable<Float8>)]
    pub value_numeric: Option<f64>,
    #[diesel(sql_type = Varchar)]
    pub normalized_label: String,
    #[diesel(sql_type = Nullable<Int4>)]
    pub hierarchy_level: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub calculation_weight: Option<i32>,
    #[diesel(sql_type = Int4)]
    pub fiscal_year: i32,
    #[diesel(sql_type = Nullable<Varchar>)]
    pub parent_concept_name: Option<String>,
    #[diesel(sql_type = Nullable<Varchar>)]
    pub parent_normalized_label: Option<String>,
}
