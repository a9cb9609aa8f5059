//! Comprehensive-income sign corrections. Two universal rules,
//! applied uniformly across filers — never a per-company table.

/// True when `concept_name` is a reclassification-adjustment line item,
/// whose reported sign needs reversing when copied into
/// `fact_comprehensive_income` (it is stated from the "amount removed
/// from AOCI" perspective in the taxonomy, the opposite of how the rest
/// of the OCI block reads).
fn is_reclassification_adjustment(concept_name: &str) -> bool {
    concept_name.contains("ReclassificationAdjustment")
}

/// True when `concept_name` is a tax effect allocated to an OCI
/// component (e.g. `OtherComprehensiveIncomeLossForeignCurrencyTranslationAdjustmentTax`).
fn is_oci_tax_item(concept_name: &str) -> bool {
    concept_name.starts_with("OtherComprehensiveIncome") && concept_name.contains("Tax")
}

/// Returns `(value, sign_corrected)` for a comprehensive-income fact,
/// applying both universal rules from this module.
pub fn apply_sign_correction(concept_name: &str, value: f64) -> (f64, bool) {
    if is_reclassification_adjustment(concept_name) || is_oci_tax_item(concept_name) {
        (-value, true)
    } else {
        (value, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reclassification_adjustments_are_reversed() {
        let (value, corrected) = apply_sign_correction(
            "OtherComprehensiveIncomeLossReclassificationAdjustmentFromAOCIForSaleOfSecuritiesNetOfTax",
            100.0,
        );
        assert_eq!(value, -100.0);
        assert!(corrected);
    }

    #[test]
    fn oci_tax_items_are_reversed() {
        let (value, corrected) = apply_sign_correction(
            "OtherComprehensiveIncomeLossForeignCurrencyTranslationAdjustmentTax",
            50.0,
        );
        assert_eq!(value, -50.0);
        assert!(corrected);
    }

    #[test]
    fn ordinary_oci_items_are_untouched() {
        let (value, corrected) = apply_sign_correction("OtherComprehensiveIncomeLossForeignCurrencyTranslationAdjustmentNetOfTax", 75.0);
        assert_eq!(value, 75.0);
        assert!(!corrected);
    }
}
