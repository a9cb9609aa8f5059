//! The explicit mapping table (priority 1): curated cross-taxonomy
//! intentional merges, context-specific suffix patterns, and
//! industry-specific (bank) mappings. Checked before any derived
//! equivalence, since a human has already settled these cases.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// `{normalized_label -> [concept_name, ...]}` exact-match entries.
/// Every label with more than one concept here is, by construction, an
/// intentional same-taxonomy merge and belongs in [`INTENTIONAL_MERGES`].
static EXACT_MATCHES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        // Cross-taxonomy / cross-vintage revenue synonyms.
        ("revenue", &["Revenues", "Revenue", "RevenueFromContractWithCustomerExcludingAssessedTax"][..]),
        // accounts_receivable_current merges two concepts known never to co-occur.
        ("accounts_receivable_current", &["AccountsReceivableNetCurrent", "ReceivablesNetCurrent"][..]),
        // scenario 3 (BAC): bank-specific mappings onto universal labels.
        ("cash_and_equivalents", &["CashAndDueFromBanks", "CashAndCashEquivalentsAtCarryingValue", "Cash"][..]),
        ("accounts_payable", &["AccountsPayableAndOtherAccruedLiabilities", "AccountsPayableCurrent"][..]),
        ("net_income", &["NetIncomeLoss", "ProfitLoss"][..]),
        ("stockholders_equity", &["StockholdersEquity", "TotalEquity"][..]),
        ("total_assets", &["Assets"][..]),
        ("total_liabilities", &["Liabilities"][..]),
        ("total_liabilities_and_equity", &["LiabilitiesAndStockholdersEquity"][..]),
        ("operating_cash_flow", &["NetCashProvidedByUsedInOperatingActivities"][..]),
        // identity-check operands not otherwise forced through a
        // calc-linkbase-child or auto-generated label: the validator's
        // runner resolves its `metrics` map by normalized label, so these
        // need a stable cross-taxonomy name even though each is already a
        // single canonical concept in most filings.
        ("cost_of_revenue", &["CostOfRevenue", "CostOfGoodsAndServicesSold"][..]),
        ("gross_profit", &["GrossProfit"][..]),
        ("operating_income", &["OperatingIncomeLoss"][..]),
        ("operating_expenses", &["OperatingExpenses", "CostsAndExpensesOperating"][..]),
        ("costs_and_expenses", &["CostsAndExpenses"][..]),
        ("net_cash_investing", &["NetCashProvidedByUsedInInvestingActivities"][..]),
        ("net_cash_financing", &["NetCashProvidedByUsedInFinancingActivities"][..]),
        ("fx_effect_on_cash", &["EffectOfExchangeRateOnCashAndCashEquivalents"][..]),
        (
            "cash_and_equivalents_restricted",
            &["CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents"][..],
        ),
    ])
});

/// Context-specific suffix patterns: two concepts whose names
/// share a common root but diverge in a context-bearing suffix, where
/// folding them to the same label would silently conflate distinct
/// measurements (a pension discount rate used to measure the obligation
/// is not the rate used to measure the period's net periodic cost).
static SUFFIX_PATTERNS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        (
            "DefinedBenefitPlanAssumedDiscountRateNetPeriodicBenefitCost",
            "pension_discount_rate_periodic_cost",
        ),
        (
            "DefinedBenefitPlanAssumedDiscountRateBenefitObligation",
            "pension_discount_rate_obligation",
        ),
    ]
});

/// labels where multiple same-taxonomy concept names are
/// acceptable because the underlying concepts are proven synonyms that
/// never co-occur in a single filing. The validator's normalization-
/// conflict and user-facing-duplicate checks exempt these labels.
pub const INTENTIONAL_MERGES: &[&str] = &[
    "revenue",
    "accounts_receivable_current",
    "cash_and_equivalents",
    "accounts_payable",
    "net_income",
    "stockholders_equity",
    "total_assets",
    "total_liabilities_and_equity",
    "operating_cash_flow",
];

/// Looks up `concept_name` in the explicit mapping table (priority
/// 1). Suffix patterns are checked first since they disambiguate names
/// that would otherwise collide in the exact table's reverse lookup.
pub fn explicit_label_for(concept_name: &str) -> Option<&'static str> {
    for (suffix, label) in SUFFIX_PATTERNS.iter() {
        if concept_name.ends_with(suffix) {
            return Some(label);
        }
    }
    for (label, concept_names) in EXACT_MATCHES.iter() {
        if concept_names.contains(&concept_name) {
            return Some(label);
        }
    }
    None
}
