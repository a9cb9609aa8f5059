//! Unit consistency: flags a filing whose numeric value range
//! spans an implausible ratio, which usually means a scale/decimals bug
//! rather than a real number. Bank-specific large aggregates (derivative
//! notional, off-balance-sheet commitments) are excluded by concept-name
//! heuristic and by the filing being classified as a bank.

use finsight_core::models::Severity;

use crate::report::CheckResult;

/// value range ratios above this are implausible for an ordinary
/// (non-bank) filer.
const MAX_PLAUSIBLE_RANGE_RATIO: f64 = 1_000_000.0;

const BANK_LARGE_AGGREGATE_KEYWORDS: [&str; 4] = ["notional", "offbalancesheet", "unusedcommitment", "derivativeliability"];

/// A company is classified as a bank when it reports deposit
/// liabilities or financing receivables — the two universal-metric
/// concepts that have no non-bank analogue.
pub fn is_bank(reported_concept_names: &[String]) -> bool {
    reported_concept_names.iter().any(|name| name == "Deposits" || name == "FinancingReceivableRecordedInvestment" || name.starts_with("DepositsDomestic"))
}

fn is_bank_large_aggregate(concept_name: &str) -> bool {
    let lower = concept_name.to_ascii_lowercase();
    BANK_LARGE_AGGREGATE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Filters `values` (concept_name, abs_value) to exclude bank large
/// aggregates when `bank` is true, then flags the filing when the ratio
/// between the largest and smallest remaining nonzero value exceeds the
/// plausible range.
pub fn unit_consistency(values: &[(String, f64)], bank: bool) -> CheckResult {
    let filtered: Vec<f64> = values
        .iter()
        .filter(|(name, value)| *value > 0.0 && !(bank && is_bank_large_aggregate(name)))
        .map(|(_, value)| *value)
        .collect();

    if filtered.len() < 2 {
        return CheckResult::pass("unit_consistency");
    }

    let max = filtered.iter().cloned().fold(f64::MIN, f64::max);
    let min = filtered.iter().cloned().fold(f64::MAX, f64::min);
    let ratio = max / min;

    let passed = ratio <= MAX_PLAUSIBLE_RANGE_RATIO;
    CheckResult {
        check_name: "unit_consistency".to_string(),
        passed,
        severity: if passed { Severity::Info } else { Severity::Warning },
        expected: Some(MAX_PLAUSIBLE_RANGE_RATIO),
        actual: Some(ratio),
        difference: None,
        details: if passed { None } else { Some(format!("value range ratio {ratio:.0} exceeds plausible bound")) },
    }
}
