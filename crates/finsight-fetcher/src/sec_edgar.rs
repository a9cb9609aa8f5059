//! SEC EDGAR URL construction and the company-submissions index lookup,
//! narrowed to what C1 needs: resolving a `(ticker, year, filing_type)`
//! triple to a filing's accession number and directory.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{FetchError, FetchResult};

/// Pad a CIK to 10 digits with leading zeros, as SEC EDGAR URLs require.
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim_start_matches('0'))
}

pub fn submissions_url(cik: &str) -> String {
    format!("https://data.sec.gov/submissions/CIK{}.json", pad_cik(cik))
}

pub fn ticker_lookup_url() -> &'static str {
    "https://www.sec.gov/files/company_tickers.json"
}

/// The directory a filing's instance document and linkbase siblings live
/// in: `https://www.sec.gov/Archives/edgar/data/{cik}/{accession-no-dashes}/`.
pub fn filing_directory_url(cik: &str, accession_number: &str) -> String {
    let cik_unpadded = cik.trim_start_matches('0');
    let accession_clean = accession_number.replace('-', "");
    format!(
        "https://www.sec.gov/Archives/edgar/data/{}/{}/",
        cik_unpadded, accession_clean
    )
}

pub fn filing_index_url(cik: &str, accession_number: &str) -> String {
    format!(
        "{}{}-index.json",
        filing_directory_url(cik, accession_number),
        accession_number
    )
}

#[derive(Debug, Deserialize)]
pub struct CompanySubmissions {
    pub cik: String,
    pub name: String,
    pub tickers: Vec<String>,
    pub filings: RecentFilings,
}

#[derive(Debug, Deserialize)]
pub struct RecentFilings {
    pub recent: RecentFilingColumns,
}

/// The submissions API returns filings as parallel arrays rather than a
/// list of records; `nth_filing` reassembles the ith row.
#[derive(Debug, Deserialize)]
pub struct RecentFilingColumns {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<String>,
    #[serde(rename = "reportDate")]
    pub report_date: Vec<String>,
    pub form: Vec<String>,
    #[serde(rename = "isXBRL")]
    pub is_xbrl: Vec<i32>,
    #[serde(rename = "primaryDocument")]
    pub primary_document: Vec<String>,
}

pub struct ResolvedFiling {
    pub accession_number: String,
    pub filing_date: NaiveDate,
    pub fiscal_year_end: NaiveDate,
    pub primary_document: String,
}

impl CompanySubmissions {
    /// Finds the filing of `filing_type` whose report (fiscal) period
    /// falls in `fiscal_year` per the fiscal-year mapping rule, with
    /// XBRL data present. Returns `FetchError::NotFound`
    /// (`FETCH_NOT_FOUND`, non-retryable) when nothing matches.
    pub fn find_filing(&self, filing_type: &str, fiscal_year: i32) -> FetchResult<ResolvedFiling> {
        let cols = &self.filings.recent;
        for i in 0..cols.accession_number.len() {
            if cols.form.get(i).map(String::as_str) != Some(filing_type) {
                continue;
            }
            if cols.is_xbrl.get(i).copied().unwrap_or(0) == 0 {
                continue;
            }
            let Some(report_date) = cols.report_date.get(i).and_then(|d| parse_sec_date(d)) else {
                continue;
            };
            if finsight_core::models::NewTimePeriod::fiscal_year_for(report_date) != fiscal_year {
                continue;
            }
            let Some(filing_date) = cols.filing_date.get(i).and_then(|d| parse_sec_date(d)) else {
                continue;
            };
            return Ok(ResolvedFiling {
                accession_number: cols.accession_number[i].clone(),
                filing_date,
                fiscal_year_end: report_date,
                primary_document: cols.primary_document.get(i).cloned().unwrap_or_default(),
            });
        }
        Err(FetchError::NotFound(format!(
            "no {filing_type} filing for fiscal year {fiscal_year}"
        )))
    }
}

fn parse_sec_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_cik_adds_leading_zeros() {
        assert_eq!(pad_cik("320193"), "0000320193");
        assert_eq!(pad_cik("0000320193"), "0000320193");
    }

    #[test]
    fn filing_directory_strips_dashes_and_leading_cik_zeros() {
        let url = filing_directory_url("0000320193", "0000320193-23-000106");
        assert_eq!(
            url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/"
        );
    }

    #[test]
    fn find_filing_matches_form_and_xbrl_and_fiscal_year() {
        let submissions = CompanySubmissions {
            cik: "320193".into(),
            name: "Apple Inc.".into(),
            tickers: vec!["AAPL".into()],
            filings: RecentFilings {
                recent: RecentFilingColumns {
                    accession_number: vec!["0000320193-23-000106".into(), "0000320193-22-000108".into()],
                    filing_date: vec!["2023-11-03".into(), "2022-10-28".into()],
                    report_date: vec!["2023-09-30".into(), "2022-09-24".into()],
                    form: vec!["10-K".into(), "10-K".into()],
                    is_xbrl: vec![1, 1],
                    primary_document: vec!["aapl-20230930.htm".into(), "aapl-20220924.htm".into()],
                },
            },
        };

        let found = submissions.find_filing("10-K", 2023).unwrap();
        assert_eq!(found.accession_number, "0000320193-23-000106");

        assert!(submissions.find_filing("10-K", 2020).is_err());
        assert!(submissions.find_filing("20-F", 2023).is_err());
    }
}
