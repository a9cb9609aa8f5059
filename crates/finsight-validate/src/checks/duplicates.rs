//! User-facing duplicates: for each `(company, normalized_label,
//! fiscal_year, dimension)` tuple, flag where more than one concept
//! contributes facts with *different* numeric values. Identical-value
//! duplicates are already resolved by `v_facts_deduplicated` and are not
//! flagged here — this check is about genuinely conflicting source data,
//! which the core does not attempt to repair (Non-goals), only report.

use std::collections::{HashMap, HashSet};

use finsight_core::models::Severity;

use crate::report::CheckResult;

/// One raw (non-deduplicated) fact as it bears on this check.
#[derive(Debug, Clone)]
pub struct LabeledFact {
    pub company_ticker: String,
    pub normalized_label: String,
    pub fiscal_year: i32,
    pub dimension_key: Option<String>,
    pub concept_name: String,
    pub value: f64,
}

/// Rounds to the cent, matching `v_facts_deduplicated`'s grouping key
/// ("`rounded_value`").
fn rounded(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

pub fn user_facing_duplicates(facts: &[LabeledFact]) -> CheckResult {
    let mut by_tuple: HashMap<(&str, &str, i32, Option<&str>), HashMap<i64, HashSet<&str>>> = HashMap::new();
    for f in facts {
        by_tuple
            .entry((f.company_ticker.as_str(), f.normalized_label.as_str(), f.fiscal_year, f.dimension_key.as_deref()))
            .or_default()
            .entry(rounded(f.value))
            .or_default()
            .insert(f.concept_name.as_str());
    }

    let mut violations = Vec::new();
    for ((ticker, label, year, dim), by_value) in by_tuple.iter() {
        if by_value.len() > 1 {
            violations.push(format!("{ticker}/{label}/{year}/{dim:?}: {} distinct values reported", by_value.len()));
        }
    }

    let passed = violations.is_empty();
    CheckResult {
        check_name: "user_facing_duplicates".to_string(),
        passed,
        severity: if passed { Severity::Info } else { Severity::Error },
        expected: Some(0.0),
        actual: Some(violations.len() as f64),
        difference: None,
        details: if passed { None } else { Some(violations.join("; ")) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(ticker: &str, label: &str, year: i32, concept: &str, value: f64) -> LabeledFact {
        LabeledFact { company_ticker: ticker.to_string(), normalized_label: label.to_string(), fiscal_year: year, dimension_key: None, concept_name: concept.to_string(), value }
    }

    #[test]
    fn identical_values_from_two_concepts_are_not_a_duplicate() {
        let facts = vec![fact("AAPL", "total_assets", 2023, "Assets", 1000.0), fact("AAPL", "total_assets", 2023, "LiabilitiesAndStockholdersEquity", 1000.0)];
        assert!(user_facing_duplicates(&facts).passed);
    }

    #[test]
    fn differing_values_from_two_concepts_are_flagged() {
        let facts = vec![fact("AAPL", "net_income", 2023, "NetIncomeLoss", 95.0), fact("AAPL", "net_income", 2023, "ProfitLoss", 95.5)];
        assert!(!user_facing_duplicates(&facts).passed);
    }

    #[test]
    fn different_fiscal_years_never_collide() {
        let facts = vec![fact("AAPL", "net_income", 2022, "NetIncomeLoss", 95.0), fact("AAPL", "net_income", 2023, "NetIncomeLoss", 100.0)];
        assert!(user_facing_duplicates(&facts).passed);
    }

    #[test]
    fn different_companies_never_collide() {
        let facts = vec![fact("AAPL", "net_income", 2023, "NetIncomeLoss", 95.0), fact("MSFT", "net_income", 2023, "NetIncomeLoss", 72.0)];
        assert!(user_facing_duplicates(&facts).passed);
    }
}
