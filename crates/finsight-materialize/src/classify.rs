//! Statement classification from presentation `role_uri` tuples.
//! Universal — the same keyword table applies to every filer, never a
//! per-company override.

use finsight_core::models::StatementType;

const EXCLUDED_KEYWORDS: [&str; 6] = ["detail", "disclosure", "reconciliation", "segment", "tax", "parenthetical"];

/// Canonical role patterns, checked in an order chosen so more specific
/// substrings (`comprehensiveincome`, `statementofcashflows`) are tried
/// before the shorter ones they could otherwise be mistaken for.
const ROLE_PATTERNS: [(&str, StatementType); 5] = [
    ("balancesheet", StatementType::BalanceSheet),
    ("statementofcashflows", StatementType::CashFlow),
    ("comprehensiveincome", StatementType::ComprehensiveIncome),
    ("incomestatement", StatementType::IncomeStatement),
    ("equity", StatementType::EquityStatement),
];

/// Classifies a presentation role into the primary statement it belongs
/// to, or `None` when it's a detail/disclosure/reconciliation/segment/
/// tax role (or matches none of the canonical patterns at all).
pub fn classify_role(role_uri: &str) -> Option<StatementType> {
    let lower = role_uri.to_ascii_lowercase();

    if EXCLUDED_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return None;
    }

    ROLE_PATTERNS.iter().find(|(pattern, _)| lower.contains(pattern)).map(|(_, st)| *st)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_canonical_role_patterns() {
        assert_eq!(
            classify_role("http://www.company.com/role/ConsolidatedBalanceSheet"),
            Some(StatementType::BalanceSheet)
        );
        assert_eq!(
            classify_role("http://www.company.com/role/StatementOfCashFlows"),
            Some(StatementType::CashFlow)
        );
        assert_eq!(
            classify_role("http://www.company.com/role/ComprehensiveIncome"),
            Some(StatementType::ComprehensiveIncome)
        );
        assert_eq!(
            classify_role("http://www.company.com/role/ConsolidatedIncomeStatement"),
            Some(StatementType::IncomeStatement)
        );
        assert_eq!(
            classify_role("http://www.company.com/role/StatementOfStockholdersEquity"),
            Some(StatementType::EquityStatement)
        );
    }

    #[test]
    fn excludes_detail_disclosure_reconciliation_segment_and_tax_roles() {
        assert_eq!(classify_role("http://www.company.com/role/BalanceSheetParenthetical"), None);
        assert_eq!(classify_role("http://www.company.com/role/IncomeTaxesDisclosure"), None);
        assert_eq!(classify_role("http://www.company.com/role/SegmentReportingDetails"), None);
        assert_eq!(classify_role("http://www.company.com/role/ScheduleOfIncomeTaxReconciliation"), None);
    }

    #[test]
    fn unrecognized_role_returns_none() {
        assert_eq!(classify_role("http://www.company.com/role/CoverPage"), None);
    }
}
