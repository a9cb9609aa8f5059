//! Validation report shape: one [`CheckResult`] per check, each
//! with a severity, optional numeric expected/actual/difference detail,
//! and a free-text breakdown. A [`ValidationReport`] groups the
//! per-filing results with the cross-filing (company-population) ones.

use finsight_core::models::Severity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: String,
    pub passed: bool,
    pub severity: Severity,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
    pub difference: Option<f64>,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed: true,
            severity: Severity::Info,
            expected: None,
            actual: None,
            difference: None,
            details: None,
        }
    }

    pub fn identity_mismatch(check_name: impl Into<String>, expected: f64, actual: f64, tolerance: f64, severity_if_breached: Severity) -> Self {
        let difference = if expected.abs() > f64::EPSILON { (actual - expected).abs() / expected.abs() } else { (actual - expected).abs() };
        let passed = difference <= tolerance;
        Self {
            check_name: check_name.into(),
            passed,
            severity: if passed { Severity::Info } else { severity_if_breached },
            expected: Some(expected),
            actual: Some(actual),
            difference: Some(difference),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// One filing's full set of per-filing check results, persisted
/// to `quality_scores`, plus the weighted overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReport {
    pub filing_id: Uuid,
    pub checks: Vec<CheckResult>,
}

impl FilingReport {
    /// Weighted pass rate: `error` checks weigh 3x, `warning` 2x,
    /// `info` 1x, so a single failed equation-level check moves the
    /// score far more than an informational coverage note.
    pub fn weighted_score(&self) -> f64 {
        if self.checks.is_empty() {
            return 1.0;
        }
        let mut total_weight = 0.0;
        let mut earned_weight = 0.0;
        for check in &self.checks {
            let weight = match check.severity {
                Severity::Error => 3.0,
                Severity::Warning => 2.0,
                Severity::Info => 1.0,
            };
            total_weight += weight;
            if check.passed {
                earned_weight += weight;
            }
        }
        earned_weight / total_weight
    }
}

/// The full `validate()` output: every loaded filing's report plus
/// the company-population checks that span filings ("normalization
/// conflicts", "user-facing duplicates", "metric coverage",
/// "missing-data matrix").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    pub filings: Vec<FilingReport>,
    pub population_checks: Vec<CheckResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_tolerance_passes_with_info_severity() {
        let result = CheckResult::identity_mismatch("balance_sheet_equation", 100.0, 100.5, 0.01, Severity::Error);
        assert!(result.passed);
        assert_eq!(result.severity, Severity::Info);
    }

    #[test]
    fn outside_tolerance_fails_with_the_supplied_severity() {
        let result = CheckResult::identity_mismatch("balance_sheet_equation", 100.0, 110.0, 0.01, Severity::Error);
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Error);
    }

    #[test]
    fn weighted_score_weighs_error_checks_more_than_info() {
        let report = FilingReport {
            filing_id: Uuid::nil(),
            checks: vec![
                CheckResult { severity: Severity::Error, passed: false, ..CheckResult::pass("a") },
                CheckResult { severity: Severity::Info, passed: true, ..CheckResult::pass("b") },
            ],
        };
        assert!(report.weighted_score() < 0.5);
    }
}
