//! C6 statement materialization: turns a filing's presentation
//! tree into `statement_item` rows and the five denormalized per-
//! statement fact tables. Delete-then-reinsert per filing, matching the
//! relationship tables' pattern — neither table has a natural
//! per-row business key that survives reparsing.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use finsight_core::database::DatabasePool;
use finsight_core::error::{AppError, AppResult};
use finsight_core::models::{
    BalanceSheetSide, NewFactBalanceSheet, NewFactCashFlow, NewFactComprehensiveIncome, NewFactEquityStatement,
    NewFactIncomeStatement, NewStatementItem, StatementType,
};
use finsight_core::schema::{
    dim_concepts, dim_xbrl_dimensions, fact_balance_sheet, fact_cash_flow, fact_comprehensive_income,
    fact_equity_statement, fact_generic, fact_income_statement, pres_rel, statement_item,
};
use finsight_xbrl::linkbase::LinkbaseLabel;

use crate::balance_sheet_side::attribute_side;
use crate::preferred_label::resolve_preferred_label;
use crate::presentation_tree::{child_to_parent_map, reduce_main_items, ConceptInfo, MainItem, PresentationEdge};
use crate::sign_correction::apply_sign_correction;

const EQUITY_COMPONENTS_AXIS_NEEDLE: &str = "equitycomponentsaxis";

/// Materializes every primary statement for `filing_id` from its
/// presentation tree: clears the filing's prior `statement_item`
/// and denormalized fact rows, rebuilds `statement_item` from
/// `pres_rel`, resolves one or more consolidated facts per main item,
/// applies sign correction and balance-sheet side attribution, and
/// refreshes `dim_concepts.preferred_label` from the filing's own label
/// linkbase (`labels` — never persisted, so the caller must supply it).
pub async fn materialize_statements(pool: &DatabasePool, filing_id: Uuid, labels: &[LinkbaseLabel]) -> AppResult<usize> {
    let mut conn = pool.get().await?;

    conn.transaction::<_, AppError, _>(|conn| {
        async move {
            let edges: Vec<(Uuid, Uuid, i32, String)> = pres_rel::table
                .filter(pres_rel::filing_id.eq(filing_id))
                .select((pres_rel::parent_concept_id, pres_rel::child_concept_id, pres_rel::order_index, pres_rel::role_uri))
                .load(conn)
                .await?;

            let mut edges_by_role: HashMap<String, Vec<PresentationEdge>> = HashMap::new();
            let mut flat_edges = Vec::with_capacity(edges.len());
            let mut concept_ids: std::collections::HashSet<Uuid> = std::collections::HashSet::new();
            for (parent_concept_id, child_concept_id, order_index, role_uri) in edges {
                concept_ids.insert(parent_concept_id);
                concept_ids.insert(child_concept_id);
                let edge = PresentationEdge { parent_concept_id, child_concept_id, order_index };
                edges_by_role.entry(role_uri).or_default().push(edge);
                flat_edges.push(edge);
            }

            let concept_rows: Vec<(Uuid, String, bool)> = dim_concepts::table
                .filter(dim_concepts::id.eq_any(&concept_ids))
                .select((dim_concepts::id, dim_concepts::concept_name, dim_concepts::is_abstract))
                .load(conn)
                .await?;
            let concepts: HashMap<Uuid, ConceptInfo> = concept_rows
                .into_iter()
                .map(|(id, concept_name, is_abstract)| (id, ConceptInfo { concept_name, is_abstract }))
                .collect();

            let main_items = reduce_main_items(&edges_by_role, &concepts);
            let ancestors_by_role: HashMap<&String, HashMap<Uuid, (Uuid, String)>> = edges_by_role
                .iter()
                .map(|(role, edges)| (role, child_to_parent_map(edges, &concepts)))
                .collect();

            diesel::delete(statement_item::table.filter(statement_item::filing_id.eq(filing_id))).execute(conn).await?;
            diesel::delete(fact_income_statement::table.filter(fact_income_statement::filing_id.eq(filing_id))).execute(conn).await?;
            diesel::delete(fact_balance_sheet::table.filter(fact_balance_sheet::filing_id.eq(filing_id))).execute(conn).await?;
            diesel::delete(fact_cash_flow::table.filter(fact_cash_flow::filing_id.eq(filing_id))).execute(conn).await?;
            diesel::delete(fact_comprehensive_income::table.filter(fact_comprehensive_income::filing_id.eq(filing_id))).execute(conn).await?;
            diesel::delete(fact_equity_statement::table.filter(fact_equity_statement::filing_id.eq(filing_id))).execute(conn).await?;

            if main_items.is_empty() {
                return Ok(0);
            }

            let mut new_statement_items = Vec::with_capacity(main_items.len());
            for item in &main_items {
                let side = if item.statement_type == StatementType::BalanceSheet {
                    let empty = HashMap::new();
                    let ancestors = ancestors_by_role.get(&item.role_uri).unwrap_or(&empty);
                    let concept_name = concepts.get(&item.concept_id).map(|c| c.concept_name.as_str()).unwrap_or_default();
                    attribute_side(item.concept_id, concept_name, ancestors).map(BalanceSheetSide::as_str).map(str::to_string)
                } else {
                    None
                };

                new_statement_items.push(NewStatementItem {
                    filing_id,
                    concept_id: item.concept_id,
                    statement_type: item.statement_type.as_str().to_string(),
                    display_order: item.display_order,
                    is_header: item.is_header,
                    is_main_item: true,
                    role_uri: item.role_uri.clone(),
                    side,
                });
            }
            diesel::insert_into(statement_item::table).values(&new_statement_items).execute(conn).await?;

            let mut preferred_labels: HashMap<Uuid, String> = HashMap::new();
            for item in &main_items {
                if preferred_labels.contains_key(&item.concept_id) {
                    continue;
                }
                if let Some(info) = concepts.get(&item.concept_id) {
                    preferred_labels.insert(item.concept_id, resolve_preferred_label(&info.concept_name, labels));
                }
            }
            for (concept_id, label) in &preferred_labels {
                diesel::update(dim_concepts::table.filter(dim_concepts::id.eq(concept_id)))
                    .set(dim_concepts::preferred_label.eq(label))
                    .execute(conn)
                    .await?;
            }

            let mut materialized = 0usize;
            for item in &main_items {
                materialized += materialize_item(conn, filing_id, item, &concepts, &preferred_labels).await?;
            }

            Ok(materialized)
        }
        .scope_boxed()
    })
    .await
}

async fn materialize_item(
    conn: &mut AsyncPgConnection,
    filing_id: Uuid,
    item: &MainItem,
    concepts: &HashMap<Uuid, ConceptInfo>,
    preferred_labels: &HashMap<Uuid, String>,
) -> AppResult<usize> {
    let normalized_label = preferred_labels
        .get(&item.concept_id)
        .cloned()
        .or_else(|| concepts.get(&item.concept_id).map(|c| c.concept_name.clone()))
        .unwrap_or_default();

    let hierarchy_level: Option<i32> = dim_concepts::table
        .find(item.concept_id)
        .select(dim_concepts::hierarchy_level)
        .first(conn)
        .await?;
    let hierarchy_level = hierarchy_level.unwrap_or(1);

    if item.statement_type == StatementType::EquityStatement {
        return materialize_equity_item(conn, filing_id, item, &normalized_label, hierarchy_level).await;
    }

    let facts: Vec<(Uuid, Option<f64>)> = fact_generic::table
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::concept_id.eq(item.concept_id))
        .filter(fact_generic::dimension_id.is_null())
        .select((fact_generic::id, fact_generic::value_numeric))
        .load(conn)
        .await?;

    let side = if item.statement_type == StatementType::BalanceSheet {
        statement_item::table
            .filter(statement_item::filing_id.eq(filing_id))
            .filter(statement_item::concept_id.eq(item.concept_id))
            .filter(statement_item::role_uri.eq(&item.role_uri))
            .select(statement_item::side)
            .first::<Option<String>>(conn)
            .await
            .ok()
            .flatten()
    } else {
        None
    };

    let mut rows = 0usize;
    for (fact_id, value_numeric) in facts {
        match item.statement_type {
            StatementType::IncomeStatement => {
                diesel::insert_into(fact_income_statement::table)
                    .values(&NewFactIncomeStatement {
                        filing_id,
                        fact_id,
                        concept_id: item.concept_id,
                        normalized_label: normalized_label.clone(),
                        value_numeric,
                        display_order: item.display_order,
                        is_header: item.is_header,
                        hierarchy_level,
                    })
                    .execute(conn)
                    .await?;
            }
            StatementType::BalanceSheet => {
                diesel::insert_into(fact_balance_sheet::table)
                    .values(&NewFactBalanceSheet {
                        filing_id,
                        fact_id,
                        concept_id: item.concept_id,
                        normalized_label: normalized_label.clone(),
                        value_numeric,
                        display_order: item.display_order,
                        is_header: item.is_header,
                        hierarchy_level,
                        side: side.clone(),
                    })
                    .execute(conn)
                    .await?;
            }
            StatementType::CashFlow => {
                diesel::insert_into(fact_cash_flow::table)
                    .values(&NewFactCashFlow {
                        filing_id,
                        fact_id,
                        concept_id: item.concept_id,
                        normalized_label: normalized_label.clone(),
                        value_numeric,
                        display_order: item.display_order,
                        is_header: item.is_header,
                        hierarchy_level,
                    })
                    .execute(conn)
                    .await?;
            }
            StatementType::ComprehensiveIncome => {
                let concept_name = concepts.get(&item.concept_id).map(|c| c.concept_name.as_str()).unwrap_or_default();
                let (corrected_value, sign_corrected) = match value_numeric {
                    Some(raw) => {
                        let (value, corrected) = apply_sign_correction(concept_name, raw);
                        (Some(value), corrected)
                    }
                    None => (None, false),
                };
                diesel::insert_into(fact_comprehensive_income::table)
                    .values(&NewFactComprehensiveIncome {
                        filing_id,
                        fact_id,
                        concept_id: item.concept_id,
                        normalized_label: normalized_label.clone(),
                        value_numeric: corrected_value,
                        display_order: item.display_order,
                        is_header: item.is_header,
                        hierarchy_level,
                        sign_corrected,
                    })
                    .execute(conn)
                    .await?;
            }
            _ => {}
        }
        rows += 1;
    }
    Ok(rows)
}

/// Equity-statement facts are inherently broken down by an
/// `EquityComponentsAxis`-style dimension — unlike the other
/// statements, which materialize only the consolidated value — so this
/// pulls in dimensioned facts too and reads the component name back out
/// of `dim_xbrl_dimensions.dimension_json`.
async fn materialize_equity_item(
    conn: &mut AsyncPgConnection,
    filing_id: Uuid,
    item: &MainItem,
    normalized_label: &str,
    hierarchy_level: i32,
) -> AppResult<usize> {
    let facts: Vec<(Uuid, Option<f64>, Option<Uuid>)> = fact_generic::table
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::concept_id.eq(item.concept_id))
        .select((fact_generic::id, fact_generic::value_numeric, fact_generic::dimension_id))
        .load(conn)
        .await?;

    let mut rows = 0usize;
    for (fact_id, value_numeric, dimension_id) in facts {
        let equity_component = match dimension_id {
            Some(dimension_id) => {
                let dimension_json: JsonValue = dim_xbrl_dimensions::table
                    .find(dimension_id)
                    .select(dim_xbrl_dimensions::dimension_json)
                    .first(conn)
                    .await?;
                equity_component_from_json(&dimension_json)
            }
            None => None,
        };

        diesel::insert_into(fact_equity_statement::table)
            .values(&NewFactEquityStatement {
                filing_id,
                fact_id,
                concept_id: item.concept_id,
                normalized_label: normalized_label.to_string(),
                value_numeric,
                display_order: item.display_order,
                is_header: item.is_header,
                hierarchy_level,
                equity_component,
            })
            .execute(conn)
            .await?;
        rows += 1;
    }
    Ok(rows)
}

fn equity_component_from_json(dimension_json: &JsonValue) -> Option<String> {
    let object = dimension_json.as_object()?;
    for (axis, member) in object {
        if axis.to_ascii_lowercase().contains(EQUITY_COMPONENTS_AXIS_NEEDLE) {
            return member.as_str().map(str::to_string);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_the_equity_components_axis_case_insensitively() {
        let dimension_json = json!({ "us-gaap:StatementEquityComponentsAxis": "us-gaap:CommonStockMember" });
        assert_eq!(equity_component_from_json(&dimension_json).as_deref(), Some("us-gaap:CommonStockMember"));
    }

    #[test]
    fn returns_none_when_no_equity_axis_is_present() {
        let dimension_json = json!({ "srt:ProductOrServiceAxis": "us-gaap:ProductMember" });
        assert_eq!(equity_component_from_json(&dimension_json), None);
    }
}
