//! Balance-sheet side attribution: walks a concept's ancestors in
//! the balance-sheet presentation tree up to its root, and reports which
//! side of the equation that root belongs to.

use std::collections::HashMap;
use uuid::Uuid;

use finsight_core::models::BalanceSheetSide;

/// Walks `child_to_parent` from `concept_id` to its root and classifies
/// the root by name. Returns `None` when the walk doesn't terminate at
/// one of the two recognized roots (e.g. a malformed or partial
/// presentation tree) within a bounded number of hops.
pub fn attribute_side(concept_id: Uuid, concept_name: &str, child_to_parent: &HashMap<Uuid, (Uuid, String)>) -> Option<BalanceSheetSide> {
    if let Some(side) = side_for_root_name(concept_name) {
        return Some(side);
    }

    let mut current = concept_id;
    for _ in 0..64 {
        match child_to_parent.get(&current) {
            Some((parent_id, parent_name)) => {
                if let Some(side) = side_for_root_name(parent_name) {
                    return Some(side);
                }
                current = *parent_id;
            }
            None => return None,
        }
    }
    None
}

fn side_for_root_name(name: &str) -> Option<BalanceSheetSide> {
    if name == "Assets" {
        Some(BalanceSheetSide::Assets)
    } else if name == "LiabilitiesAndStockholdersEquity" || name == "LiabilitiesAndStockholdersEquityIncludingPortionAttributableToNoncontrollingInterest" {
        Some(BalanceSheetSide::LiabilitiesEquity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_concept_whose_own_name_is_a_root_resolves_directly() {
        let map = HashMap::new();
        assert_eq!(attribute_side(Uuid::nil(), "Assets", &map), Some(BalanceSheetSide::Assets));
    }

    #[test]
    fn walks_up_through_intermediate_ancestors_to_the_root() {
        let assets_current = Uuid::new_v4();
        let cash = Uuid::new_v4();
        let assets = Uuid::new_v4();

        let mut map = HashMap::new();
        map.insert(cash, (assets_current, "AssetsCurrent".to_string()));
        map.insert(assets_current, (assets, "Assets".to_string()));

        assert_eq!(attribute_side(cash, "CashAndCashEquivalentsAtCarryingValue", &map), Some(BalanceSheetSide::Assets));
    }

    #[test]
    fn an_unreachable_root_returns_none() {
        let orphan = Uuid::new_v4();
        let map = HashMap::new();
        assert_eq!(attribute_side(orphan, "SomeDetailLineItem", &map), None);
    }
}
