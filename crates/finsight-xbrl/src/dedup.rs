//! Within-document deduplication. The same fact can be tagged
//! more than once in a single filing — most commonly inline XBRL
//! repeating a number in both the body text and a hidden `ix:hidden`
//! block. Facts that agree on `(concept, context, rounded value)` are
//! the same fact tagged twice: the earliest occurrence (lowest
//! `order_index`) is kept as primary and the rest are marked
//! non-primary. Facts that share a concept and context but disagree on
//! value are *not* duplicates — both are kept as distinct, primary
//! facts, since that disagreement is itself informative (e.g. a
//! restated prior-period value).

use std::collections::HashMap;

use crate::fact::ParsedFact;

/// Rounds to the precision `decimals` implies so that e.g. `383285000000`
/// (decimals = -6) and `383285000001` (decimals = -6) are recognized as
/// the same reported value. Facts with no numeric value never collide.
fn dedup_key(fact: &ParsedFact) -> (String, String, Option<i64>) {
    let rounded = fact.value_numeric.map(|v| {
        let precision = fact.decimals.unwrap_or(0).max(-12).min(12);
        let factor = 10f64.powi(precision);
        (v * factor).round() as i64
    });
    (fact.concept_qname.clone(), fact.context_id.clone(), rounded)
}

/// Marks `is_primary` on every fact in place, per the rule above.
/// Facts whose value is textual (no `value_numeric`) are deduplicated
/// by their raw text instead of a rounded number, using the same
/// earliest-wins rule.
pub fn mark_duplicates(facts: &mut [ParsedFact]) {
    let mut earliest: HashMap<(String, String, Option<i64>, Option<String>), usize> = HashMap::new();

    for (idx, fact) in facts.iter().enumerate() {
        let (concept, context, numeric) = dedup_key(fact);
        let text_key = if numeric.is_none() { fact.value_text.clone() } else { None };
        let key = (concept, context, numeric, text_key);
        earliest
            .entry(key)
            .and_modify(|best| {
                if facts[*best].order_index > facts[idx].order_index {
                    *best = idx;
                }
            })
            .or_insert(idx);
    }

    let primary_indices: std::collections::HashSet<usize> = earliest.values().copied().collect();
    for (idx, fact) in facts.iter_mut().enumerate() {
        fact.is_primary = primary_indices.contains(&idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::XbrlPeriod;
    use finsight_core::models::ExtractionMethod;

    fn fact(concept: &str, context: &str, value: f64, decimals: Option<i32>, order: i32) -> ParsedFact {
        ParsedFact {
            concept_qname: concept.to_string(),
            taxonomy: "us-gaap".to_string(),
            context_id: context.to_string(),
            period: XbrlPeriod { instant: None, start_date: None, end_date: None },
            dimensions: Vec::new(),
            unit: Some("iso4217:USD".to_string()),
            decimals,
            scale: None,
            value_text: None,
            value_numeric: Some(value),
            xbrl_fact_id: None,
            source_line: None,
            order_index: order,
            is_primary: true,
            extraction_method: ExtractionMethod::InlineXbrl,
        }
    }

    #[test]
    fn later_duplicate_of_same_value_is_marked_non_primary() {
        let mut facts = vec![
            fact("Assets", "FY2023", 1000.0, Some(-6), 0),
            fact("Assets", "FY2023", 1000.0, Some(-6), 5),
        ];
        mark_duplicates(&mut facts);
        assert!(facts[0].is_primary);
        assert!(!facts[1].is_primary);
    }

    #[test]
    fn differing_values_are_both_kept_primary() {
        let mut facts = vec![
            fact("Assets", "FY2023", 1_000_000.0, Some(-6), 0),
            fact("Assets", "FY2023", 2_000_000.0, Some(-6), 1),
        ];
        mark_duplicates(&mut facts);
        assert!(facts[0].is_primary);
        assert!(facts[1].is_primary);
    }

    #[test]
    fn different_contexts_are_not_duplicates() {
        let mut facts = vec![
            fact("Assets", "FY2023", 1000.0, Some(-6), 0),
            fact("Assets", "FY2022", 1000.0, Some(-6), 1),
        ];
        mark_duplicates(&mut facts);
        assert!(facts[0].is_primary);
        assert!(facts[1].is_primary);
    }
}
