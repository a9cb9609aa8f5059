//! Hierarchy-level inference for when the taxonomy itself leaves a
//! concept unleveled. Kept as a single module, shared by the loader (C5, which
//! calls this once per load for concepts the taxonomy left unleveled)
//! and the statement materialiser (C6, which calls it while assembling
//! denormalised statements) so the pattern rules live in exactly one
//! place to audit and improve.

/// `hierarchy_level ∈ {1 detail, 2 subtotal, 3 section_total, 4 statement_total}`.
pub const DETAIL: i32 = 1;
pub const SUBTOTAL: i32 = 2;
pub const SECTION_TOTAL: i32 = 3;
pub const STATEMENT_TOTAL: i32 = 4;

const STATEMENT_KEYWORDS: [&str; 5] = ["assets", "liabilities", "equity", "revenue", "expenses"];

const SUBTOTAL_PREFIXES: [&str; 4] = ["Accrued", "Other", "Trade", "Employee"];

/// Pattern-based inference for a concept the taxonomy did not assign a
/// level to ("Hierarchy inference"). `calc_is_top_level_total`
/// reflects the concept's position in the filing's calc trees: true when
/// the concept never appears as a child of any calculation relationship
/// (a summation root).
pub fn infer_hierarchy_level(concept_name: &str, calc_is_top_level_total: bool) -> i32 {
    let lower = concept_name.to_ascii_lowercase();

    if lower.contains("total") && STATEMENT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return STATEMENT_TOTAL;
    }
    if calc_is_top_level_total {
        return STATEMENT_TOTAL;
    }
    if lower.ends_with("current") || lower.ends_with("noncurrent") {
        return SECTION_TOTAL;
    }
    if SUBTOTAL_PREFIXES.iter().any(|p| concept_name.starts_with(p)) {
        return SUBTOTAL;
    }
    DETAIL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_plus_statement_keyword_is_statement_total() {
        assert_eq!(infer_hierarchy_level("TotalAssets", false), STATEMENT_TOTAL);
        assert_eq!(infer_hierarchy_level("TotalLiabilitiesAndEquity", false), STATEMENT_TOTAL);
    }

    #[test]
    fn current_noncurrent_suffix_is_section_total() {
        assert_eq!(infer_hierarchy_level("AssetsCurrent", false), SECTION_TOTAL);
        assert_eq!(infer_hierarchy_level("LiabilitiesNoncurrent", false), SECTION_TOTAL);
    }

    #[test]
    fn accrued_other_trade_employee_prefix_is_subtotal() {
        assert_eq!(infer_hierarchy_level("AccruedLiabilities", false), SUBTOTAL);
        assert_eq!(infer_hierarchy_level("OtherAssets", false), SUBTOTAL);
    }

    #[test]
    fn current_noncurrent_suffix_wins_over_prefix() {
        // lists the suffix rule before the prefix rule.
        assert_eq!(infer_hierarchy_level("AccruedLiabilitiesCurrent", false), SECTION_TOTAL);
    }

    #[test]
    fn unmatched_pattern_defaults_to_detail() {
        assert_eq!(infer_hierarchy_level("CashAndCashEquivalentsAtCarryingValue", false), DETAIL);
    }

    #[test]
    fn calc_tree_root_wins_over_pattern_when_no_keyword_match() {
        assert_eq!(infer_hierarchy_level("StockholdersEquity", true), STATEMENT_TOTAL);
    }
}
