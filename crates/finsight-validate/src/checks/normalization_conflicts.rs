//! Normalization conflicts: for each `(normalized_label,
//! taxonomy)` pair, flag any case where more than one distinct concept
//! maps to the label, unless the label is on [`finsight_normalize::INTENTIONAL_MERGES`]
//! or the concepts are reference-equivalent. Target is zero unintentional
//! conflicts.

use std::collections::{HashMap, HashSet};

use finsight_core::models::Severity;
use finsight_normalize::INTENTIONAL_MERGES;

use crate::report::CheckResult;

/// One `dim_concepts` row's identity as it bears on this check.
#[derive(Debug, Clone)]
pub struct ConceptLabel {
    pub concept_name: String,
    pub taxonomy: String,
    pub normalized_label: String,
}

/// Evaluated over every concept in a taxonomy the runner has loaded.
/// `reference_equivalent` answers whether two concept names in the same
/// taxonomy are known reference-equivalent (C2's equivalence groups) —
/// such a pair maps to one label legitimately and is not a conflict.
pub fn normalization_conflicts(concepts: &[ConceptLabel], reference_equivalent: impl Fn(&str, &str) -> bool) -> CheckResult {
    let mut by_label: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    for c in concepts {
        by_label.entry((c.normalized_label.as_str(), c.taxonomy.as_str())).or_default().insert(c.concept_name.as_str());
    }

    let mut violations = Vec::new();
    for ((label, taxonomy), names) in by_label.iter() {
        if names.len() < 2 || INTENTIONAL_MERGES.contains(label) {
            continue;
        }
        let names: Vec<&str> = names.iter().copied().collect();
        let mut unexplained = Vec::new();
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                if !reference_equivalent(names[i], names[j]) {
                    unexplained.push((names[i], names[j]));
                }
            }
        }
        if !unexplained.is_empty() {
            violations.push(format!("{label} ({taxonomy}): {names:?} not all reference-equivalent"));
        }
    }

    let passed = violations.is_empty();
    CheckResult {
        check_name: "normalization_conflicts".to_string(),
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

    fn label(concept: &str, taxonomy: &str, label: &str) -> ConceptLabel {
        ConceptLabel { concept_name: concept.to_string(), taxonomy: taxonomy.to_string(), normalized_label: label.to_string() }
    }

    #[test]
    fn a_single_concept_per_label_never_conflicts() {
        let concepts = vec![label("Assets", "us-gaap", "total_assets")];
        assert!(normalization_conflicts(&concepts, |_, _| false).passed);
    }

    #[test]
    fn two_distinct_concepts_sharing_a_label_without_equivalence_is_a_conflict() {
        let concepts = vec![label("FooBar", "us-gaap", "deferred_tax_assets_other"), label("BazQux", "us-gaap", "deferred_tax_assets_other")];
        assert!(!normalization_conflicts(&concepts, |_, _| false).passed);
    }

    #[test]
    fn reference_equivalent_concepts_sharing_a_label_are_not_a_conflict() {
        let concepts = vec![label("FooBar", "us-gaap", "some_label"), label("BazQux", "us-gaap", "some_label")];
        assert!(normalization_conflicts(&concepts, |_, _| true).passed);
    }

    #[test]
    fn intentional_merges_are_exempt_even_without_reference_equivalence() {
        let concepts = vec![label("AccountsReceivableNetCurrent", "us-gaap", "accounts_receivable_current"), label("ReceivablesNetCurrent", "us-gaap", "accounts_receivable_current")];
        assert!(normalization_conflicts(&concepts, |_, _| false).passed);
    }

    #[test]
    fn different_taxonomies_never_conflict_with_each_other() {
        let concepts = vec![label("ProfitLoss", "ifrs-full", "net_income_raw"), label("ProfitLoss", "us-gaap", "net_income_raw")];
        assert!(normalization_conflicts(&concepts, |_, _| false).passed);
    }
}
