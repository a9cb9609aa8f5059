//! Maps a filing's accounting standard and fiscal year to the taxonomy
//! package C2 should load. US-GAAP ships one consolidated package per
//! calendar year from the FASB's taxonomy archive; IFRS is published by
//! the IFRS Foundation on the same yearly cadence. The taxonomy name is
//! what's persisted as `dim_concepts.taxonomy` and keys C2's disk cache.

use finsight_core::models::AccountingStandard;

pub fn taxonomy_name(standard: AccountingStandard, fiscal_year: i32) -> String {
    match standard {
        AccountingStandard::UsGaap => format!("us-gaap-{fiscal_year}"),
        AccountingStandard::Ifrs => format!("ifrs-{fiscal_year}"),
    }
}

pub fn package_url(standard: AccountingStandard, fiscal_year: i32) -> String {
    match standard {
        AccountingStandard::UsGaap => format!("https://xbrl.fasb.org/us-gaap/{fiscal_year}/us-gaap-{fiscal_year}.zip"),
        AccountingStandard::Ifrs => format!("https://www.ifrs.org/content/dam/ifrs/standards/taxonomy/ifrs-taxonomies/IFRST_{fiscal_year}.zip"),
    }
}

/// A 20-F is the only form FinSight treats as IFRS; everything
/// else is US-GAAP.
pub fn standard_for_filing_type(filing_type: finsight_core::models::FilingType) -> AccountingStandard {
    match filing_type {
        finsight_core::models::FilingType::TwentyF => AccountingStandard::Ifrs,
        finsight_core::models::FilingType::TenK | finsight_core::models::FilingType::TenQ => AccountingStandard::UsGaap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_f_filings_use_ifrs() {
        assert_eq!(standard_for_filing_type(finsight_core::models::FilingType::TwentyF), AccountingStandard::Ifrs);
        assert_eq!(standard_for_filing_type(finsight_core::models::FilingType::TenK), AccountingStandard::UsGaap);
    }

    #[test]
    fn taxonomy_name_includes_fiscal_year() {
        assert_eq!(taxonomy_name(AccountingStandard::UsGaap, 2023), "us-gaap-2023");
    }
}
