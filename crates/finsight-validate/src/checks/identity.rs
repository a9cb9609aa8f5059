//! Identity checks: a filing's primary accounting equations,
//! evaluated over its consolidated universal-metric values. Pure and
//! DB-agnostic; the runner resolves `normalized_label -> value` for one
//! filing and hands the map in.

use std::collections::HashMap;

use finsight_core::models::Severity;

use crate::report::CheckResult;

const BALANCE_SHEET_TOLERANCE: f64 = 0.01;
const MARGIN_IDENTITY_TOLERANCE: f64 = 0.01;
const CALC_AUDIT_TOLERANCE: f64 = 0.001;
const RE_ROLLFORWARD_TOLERANCE_WITH_FULL_DATA: f64 = 0.10;

/// `Assets ≈ Liabilities + Equity`. `None` when either side is
/// absent from this filing's universal metrics.
pub fn balance_sheet_equation(metrics: &HashMap<String, f64>) -> Option<CheckResult> {
    let assets = *metrics.get("total_assets")?;
    let liabilities = metrics.get("total_liabilities").copied().unwrap_or(0.0);
    let equity = metrics.get("total_equity").copied().unwrap_or(0.0);
    if !metrics.contains_key("total_liabilities") && !metrics.contains_key("total_equity") {
        return None;
    }
    Some(CheckResult::identity_mismatch("balance_sheet_equation", assets, liabilities + equity, BALANCE_SHEET_TOLERANCE, Severity::Error))
}

/// `Revenue - CostOfRevenue = GrossProfit`, only evaluated when
/// the filer reports gross profit at all.
pub fn gross_profit_margin_identity(metrics: &HashMap<String, f64>) -> Option<CheckResult> {
    let revenue = *metrics.get("revenue")?;
    let cost_of_revenue = *metrics.get("cost_of_revenue")?;
    let gross_profit = *metrics.get("gross_profit")?;
    Some(CheckResult::identity_mismatch(
        "gross_profit_margin_identity",
        gross_profit,
        revenue - cost_of_revenue,
        MARGIN_IDENTITY_TOLERANCE,
        Severity::Error,
    ))
}

/// Operating income identity, supporting the two income-
/// statement shapes filers use. Prefers the `GrossProfit -
/// OperatingExpenses` shape when both operands are present, falling
/// back to `Revenue - CostsAndExpenses` for issuers who consolidate the
/// whole income statement into those two lines.
pub fn operating_income_identity(metrics: &HashMap<String, f64>) -> Option<CheckResult> {
    let operating_income = *metrics.get("operating_income")?;

    if let (Some(&gross_profit), Some(&operating_expenses)) = (metrics.get("gross_profit"), metrics.get("operating_expenses")) {
        return Some(CheckResult::identity_mismatch(
            "operating_income_identity",
            operating_income,
            gross_profit - operating_expenses,
            MARGIN_IDENTITY_TOLERANCE,
            Severity::Error,
        ));
    }

    if let (Some(&revenue), Some(&costs_and_expenses)) = (metrics.get("revenue"), metrics.get("costs_and_expenses")) {
        return Some(CheckResult::identity_mismatch(
            "operating_income_identity",
            operating_income,
            revenue - costs_and_expenses,
            MARGIN_IDENTITY_TOLERANCE,
            Severity::Error,
        ));
    }

    None
}

/// Cash-flow reconciliation: compares the *actual* change in
/// total cash (period-end minus period-start, from the balance sheet)
/// against the sum of the three (or four, with FX) cash-flow statement
/// sections. Never trusts `cash_change_in_period` — its sign convention
/// is filer-dependent.
pub fn cash_flow_reconciliation(metrics: &HashMap<String, f64>) -> Option<CheckResult> {
    let ending_cash = *metrics.get("ending_total_cash")?;
    let beginning_cash = *metrics.get("beginning_total_cash")?;
    let operating = metrics.get("net_cash_operating").copied().unwrap_or(0.0);
    let investing = metrics.get("net_cash_investing").copied().unwrap_or(0.0);
    let financing = metrics.get("net_cash_financing").copied().unwrap_or(0.0);
    let fx = metrics.get("fx_effect_on_cash").copied().unwrap_or(0.0);

    let actual_change = ending_cash - beginning_cash;
    let reported_change = operating + investing + financing + fx;
    Some(CheckResult::identity_mismatch("cash_flow_reconciliation", actual_change, reported_change, MARGIN_IDENTITY_TOLERANCE, Severity::Error))
}

/// Retained-earnings rollforward. `net_income` should already be
/// the consolidated figure the runner resolved (preferring an
/// undimensioned `NetIncomeLoss`, falling back to the RE delta itself
/// when it's dimensioned — "AMZN-FY2023 case"); `full_adjustment_data`
/// reports whether every optional adjustment term was actually present,
/// which governs whether a breach is `warning` or `error`.
#[allow(clippy::too_many_arguments)]
pub fn retained_earnings_rollforward(
    beginning_re: f64,
    ending_re: f64,
    net_income: f64,
    dividends: f64,
    treasury_stock_retirement: f64,
    reclassifications_from_aoci: f64,
    pension_adjustments_to_re: f64,
    fx_translation_to_re: f64,
    other_equity_adjustments: f64,
    full_adjustment_data: bool,
) -> CheckResult {
    let expected_ending_re =
        beginning_re + net_income - dividends - treasury_stock_retirement + reclassifications_from_aoci + pension_adjustments_to_re + fx_translation_to_re + other_equity_adjustments;

    let severity = if full_adjustment_data { Severity::Error } else { Severity::Warning };
    CheckResult::identity_mismatch("retained_earnings_rollforward", ending_re, expected_ending_re, RE_ROLLFORWARD_TOLERANCE_WITH_FULL_DATA, severity)
}

/// Calculation-relationship audit: for one `calc_rel` parent, its
/// value should equal `Σ weight_i * child_i` within 0.1% when the
/// relationship's `confidence ≥ 0.995`. Lower-confidence synthetic
/// relationships are informational only and never fail the check.
pub fn calculation_relationship_audit(parent_value: f64, weighted_children_sum: f64, confidence: f64) -> CheckResult {
    if confidence < 0.995 {
        let mut result = CheckResult::pass("calculation_relationship_audit");
        result.details = Some(format!("confidence {confidence:.3} below audit threshold, informational only"));
        return result;
    }
    CheckResult::identity_mismatch("calculation_relationship_audit", parent_value, weighted_children_sum, CALC_AUDIT_TOLERANCE, Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn balance_sheet_equation_passes_within_tolerance() {
        let m = metrics(&[("total_assets", 1000.0), ("total_liabilities", 600.0), ("total_equity", 400.0)]);
        let result = balance_sheet_equation(&m).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn balance_sheet_equation_is_none_without_both_sides() {
        let m = metrics(&[("total_assets", 1000.0)]);
        assert!(balance_sheet_equation(&m).is_none());
    }

    #[test]
    fn operating_income_prefers_gross_profit_shape_over_revenue_shape() {
        let m = metrics(&[("operating_income", 100.0), ("gross_profit", 300.0), ("operating_expenses", 200.0), ("revenue", 900.0), ("costs_and_expenses", 750.0)]);
        let result = operating_income_identity(&m).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn operating_income_falls_back_to_consolidated_shape() {
        let m = metrics(&[("operating_income", 150.0), ("revenue", 900.0), ("costs_and_expenses", 750.0)]);
        let result = operating_income_identity(&m).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn retained_earnings_breach_with_full_data_is_an_error() {
        let result = retained_earnings_rollforward(1000.0, 1500.0, 200.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0, true);
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Error);
    }

    #[test]
    fn retained_earnings_breach_with_partial_data_is_a_warning() {
        let result = retained_earnings_rollforward(1000.0, 1500.0, 200.0, 50.0, 0.0, 0.0, 0.0, 0.0, 0.0, false);
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);
    }

    #[test]
    fn calc_audit_below_confidence_threshold_is_informational() {
        let result = calculation_relationship_audit(100.0, 50.0, 0.5);
        assert!(result.passed);
    }

    #[test]
    fn calc_audit_above_confidence_threshold_enforces_tolerance() {
        let result = calculation_relationship_audit(100.0, 50.0, 0.999);
        assert!(!result.passed);
    }
}
