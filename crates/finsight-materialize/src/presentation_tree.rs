//! Presentation-tree reduction: turns a filing's flat `pres_rel`
//! arcs into the set of main statement items plus the per-role ancestor
//! map the balance-sheet side attribution walks. Pure and DB-agnostic —
//! the materializer supplies the arcs and concept metadata it already
//! queried.

use std::collections::HashMap;

use uuid::Uuid;

use finsight_core::models::StatementType;

use crate::classify::classify_role;
use crate::display_order::adjusted_display_order;

/// One `pres_rel` arc, reduced to what this module needs.
#[derive(Debug, Clone, Copy)]
pub struct PresentationEdge {
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub order_index: i32,
}

/// The per-concept metadata the classifier and display-order rules key
/// off of.
#[derive(Debug, Clone)]
pub struct ConceptInfo {
    pub concept_name: String,
    pub is_abstract: bool,
}

/// A concept resolved as the main item of one primary statement,
/// carrying its final (adjusted) display order and the role it was
/// found under.
#[derive(Debug, Clone)]
pub struct MainItem {
    pub concept_id: Uuid,
    pub statement_type: StatementType,
    pub role_uri: String,
    pub display_order: i32,
    pub is_header: bool,
}

/// Reduces every `(role_uri, edges)` group into its main items:
/// classifies the role, assigns adjusted display order (EPS / OCI block
/// rules), and returns one `MainItem` per concept the role's presentation
/// tree names as a child — deduplicated by keeping the lowest raw order
/// when a concept is reachable more than once in the same role.
pub fn reduce_main_items(edges_by_role: &HashMap<String, Vec<PresentationEdge>>, concepts: &HashMap<Uuid, ConceptInfo>) -> Vec<MainItem> {
    let mut items: HashMap<(String, Uuid), (i32, i32)> = HashMap::new(); // (role, concept) -> (raw_order, is_header as i32)

    for (role_uri, edges) in edges_by_role {
        let Some(statement_type) = classify_role(role_uri) else { continue };

        for edge in edges {
            let Some(info) = concepts.get(&edge.child_concept_id) else { continue };
            let key = (role_uri.clone(), edge.child_concept_id);
            let is_header = if info.is_abstract { 1 } else { 0 };
            items
                .entry(key)
                .and_modify(|(existing_order, _)| {
                    if edge.order_index < *existing_order {
                        *existing_order = edge.order_index;
                    }
                })
                .or_insert((edge.order_index, is_header));
        }
    }

    let max_non_eps_order: HashMap<String, i32> = edges_by_role
        .iter()
        .filter(|(role, _)| classify_role(role) == Some(StatementType::IncomeStatement))
        .map(|(role, edges)| {
            let max = edges
                .iter()
                .filter(|e| concepts.get(&e.child_concept_id).is_some_and(|c| !is_eps_concept(&c.concept_name)))
                .map(|e| e.order_index)
                .max()
                .unwrap_or(0);
            (role.clone(), max)
        })
        .collect();

    let mut result = Vec::with_capacity(items.len());
    for ((role_uri, concept_id), (raw_order, is_header)) in items {
        let Some(statement_type) = classify_role(&role_uri) else { continue };
        let Some(info) = concepts.get(&concept_id) else { continue };
        let max_non_eps = max_non_eps_order.get(&role_uri).copied().unwrap_or(0);
        let display_order = adjusted_display_order(statement_type, &info.concept_name, raw_order, max_non_eps);
        result.push(MainItem {
            concept_id,
            statement_type,
            role_uri,
            display_order,
            is_header: is_header == 1,
        });
    }
    result
}

fn is_eps_concept(concept_name: &str) -> bool {
    concept_name.contains("EarningsPerShare") || concept_name.contains("IncomeLossPerShare") || concept_name.contains("WeightedAverageNumberOf")
}

/// Builds a `child -> (parent, parent_concept_name)` map scoped to one
/// role's edges, for [`crate::balance_sheet_side::attribute_side`]'s
/// ancestor walk.
pub fn child_to_parent_map(edges: &[PresentationEdge], concepts: &HashMap<Uuid, ConceptInfo>) -> HashMap<Uuid, (Uuid, String)> {
    edges
        .iter()
        .filter_map(|e| concepts.get(&e.parent_concept_id).map(|p| (e.child_concept_id, (e.parent_concept_id, p.concept_name.clone()))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(id: Uuid, name: &str, is_abstract: bool) -> (Uuid, ConceptInfo) {
        (id, ConceptInfo { concept_name: name.to_string(), is_abstract })
    }

    #[test]
    fn classifies_children_of_a_matched_role_as_main_items() {
        let balance_sheet_role = "http://company.com/role/BalanceSheet".to_string();
        let assets = Uuid::new_v4();
        let assets_current = Uuid::new_v4();

        let mut concepts = HashMap::new();
        concepts.extend([concept(assets, "Assets", false), concept(assets_current, "AssetsCurrent", false)]);

        let mut edges_by_role = HashMap::new();
        edges_by_role.insert(
            balance_sheet_role.clone(),
            vec![PresentationEdge { parent_concept_id: assets, child_concept_id: assets_current, order_index: 1 }],
        );

        let items = reduce_main_items(&edges_by_role, &concepts);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].concept_id, assets_current);
        assert_eq!(items[0].statement_type, StatementType::BalanceSheet);
    }

    #[test]
    fn unmatched_role_contributes_no_main_items() {
        let detail_role = "http://company.com/role/AssetsDisclosureDetails".to_string();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut concepts = HashMap::new();
        concepts.extend([concept(a, "Foo", false), concept(b, "Bar", false)]);

        let mut edges_by_role = HashMap::new();
        edges_by_role.insert(detail_role, vec![PresentationEdge { parent_concept_id: a, child_concept_id: b, order_index: 1 }]);

        assert!(reduce_main_items(&edges_by_role, &concepts).is_empty());
    }

    #[test]
    fn eps_items_sort_after_the_rest_of_the_income_statement() {
        let role = "http://company.com/role/IncomeStatement".to_string();
        let revenues = Uuid::new_v4();
        let net_income = Uuid::new_v4();
        let eps = Uuid::new_v4();
        let root = Uuid::new_v4();

        let mut concepts = HashMap::new();
        concepts.extend([
            concept(root, "IncomeStatementAbstract", true),
            concept(revenues, "Revenues", false),
            concept(net_income, "NetIncomeLoss", false),
            concept(eps, "EarningsPerShareBasic", false),
        ]);

        let mut edges_by_role = HashMap::new();
        edges_by_role.insert(
            role,
            vec![
                PresentationEdge { parent_concept_id: root, child_concept_id: revenues, order_index: 1 },
                PresentationEdge { parent_concept_id: root, child_concept_id: net_income, order_index: 2 },
                PresentationEdge { parent_concept_id: root, child_concept_id: eps, order_index: 3 },
            ],
        );

        let items = reduce_main_items(&edges_by_role, &concepts);
        let eps_order = items.iter().find(|i| i.concept_id == eps).unwrap().display_order;
        let net_income_order = items.iter().find(|i| i.concept_id == net_income).unwrap().display_order;
        assert!(eps_order > net_income_order);
    }

    #[test]
    fn a_concept_reachable_twice_in_one_role_keeps_the_lower_order() {
        let role = "http://company.com/role/BalanceSheet".to_string();
        let parent_a = Uuid::new_v4();
        let parent_b = Uuid::new_v4();
        let child = Uuid::new_v4();

        let mut concepts = HashMap::new();
        concepts.extend([concept(parent_a, "SectionA", true), concept(parent_b, "SectionB", true), concept(child, "CashAndCashEquivalents", false)]);

        let mut edges_by_role = HashMap::new();
        edges_by_role.insert(
            role,
            vec![
                PresentationEdge { parent_concept_id: parent_a, child_concept_id: child, order_index: 5 },
                PresentationEdge { parent_concept_id: parent_b, child_concept_id: child, order_index: 2 },
            ],
        );

        let items = reduce_main_items(&edges_by_role, &concepts);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_order, 2);
    }
}
