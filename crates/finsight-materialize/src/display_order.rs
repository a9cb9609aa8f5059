//! Display-order computation. Base order comes from the
//! presentation arc's `order` attribute; this module applies the fixed
//! adjustments on top of it — EPS pushed after the income-statement
//! body, and the standard comprehensive-income block order.

use finsight_core::models::StatementType;

/// EPS line items interleave with the income-statement body in the
/// taxonomy's raw presentation order but read better grouped at the
/// bottom ("EPS items appear after the income-statement body").
fn is_eps_item(concept_name: &str) -> bool {
    concept_name.contains("EarningsPerShare") || concept_name.contains("IncomeLossPerShare") || concept_name.contains("WeightedAverageNumberOf")
}

/// Standard comprehensive-income block rank: starting net income,
/// then items that will not be reclassified (with their subtotal), then
/// items that will be reclassified (cash-flow hedges first, then
/// reclassification adjustments out of AOCI), then the OCI total, then
/// total comprehensive income.
fn comprehensive_income_block(concept_name: &str) -> i32 {
    if concept_name.contains("ComprehensiveIncomeNetOfTax") && !concept_name.contains("OtherComprehensiveIncome") {
        return 600;
    }
    if concept_name.starts_with("OtherComprehensiveIncomeLossNetOfTax") || concept_name == "OtherComprehensiveIncomeLossBeforeTax" {
        return 500;
    }
    if concept_name.contains("ReclassificationAdjustment") {
        return 300;
    }
    if concept_name.contains("CashFlowHedge") {
        return 250;
    }
    if concept_name.contains("Pension") || concept_name.contains("Postretirement") {
        if concept_name.contains("Adjustment") && (concept_name.contains("Total") || concept_name.ends_with("NetOfTax")) {
            return 150;
        }
        return 100;
    }
    if concept_name.contains("NetIncomeLoss") || concept_name.contains("ProfitLoss") {
        return 0;
    }
    // Foreign-currency translation, available-for-sale securities and
    // anything else not pinned above defaults to the "to be reclassified"
    // block, ahead of its own reclassification-adjustment line.
    200
}

/// Computes the final `display_order` for one presentation-tree concept
/// within one statement, given the arc's raw `order` attribute and
/// (for income statements) the highest raw order seen among non-EPS
/// items in the same statement.
pub fn adjusted_display_order(statement_type: StatementType, concept_name: &str, raw_order: i32, max_non_eps_order: i32) -> i32 {
    match statement_type {
        StatementType::IncomeStatement if is_eps_item(concept_name) => max_non_eps_order + 1 + raw_order,
        StatementType::ComprehensiveIncome => comprehensive_income_block(concept_name) * 1000 + raw_order,
        _ => raw_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eps_items_sort_after_the_income_statement_body() {
        let order = adjusted_display_order(StatementType::IncomeStatement, "EarningsPerShareBasic", 3, 40);
        assert!(order > 40);
    }

    #[test]
    fn non_eps_income_statement_items_keep_raw_order() {
        let order = adjusted_display_order(StatementType::IncomeStatement, "Revenues", 3, 40);
        assert_eq!(order, 3);
    }

    #[test]
    fn comprehensive_income_follows_the_standard_block_order() {
        let net_income = adjusted_display_order(StatementType::ComprehensiveIncome, "NetIncomeLoss", 1, 0);
        let pension = adjusted_display_order(
            StatementType::ComprehensiveIncome,
            "OtherComprehensiveIncomeLossPensionAndOtherPostretirementBenefitPlansAdjustmentNetOfTax",
            2,
            0,
        );
        let fx = adjusted_display_order(
            StatementType::ComprehensiveIncome,
            "OtherComprehensiveIncomeLossForeignCurrencyTranslationAdjustmentNetOfTax",
            3,
            0,
        );
        let reclass = adjusted_display_order(
            StatementType::ComprehensiveIncome,
            "OtherComprehensiveIncomeLossReclassificationAdjustmentFromAOCIForSaleOfSecuritiesNetOfTax",
            4,
            0,
        );
        let oci_total = adjusted_display_order(StatementType::ComprehensiveIncome, "OtherComprehensiveIncomeLossNetOfTax", 5, 0);
        let total_ci = adjusted_display_order(StatementType::ComprehensiveIncome, "ComprehensiveIncomeNetOfTax", 6, 0);

        assert!(net_income < pension);
        assert!(pension < fx);
        assert!(fx < reclass);
        assert!(reclass < oci_total);
        assert!(oci_total < total_ci);
    }
}
