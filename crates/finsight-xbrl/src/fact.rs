//! The parser's intermediate fact representation, before C4/C5
//! resolve it against the warehouse's concept/period/dimension dimension
//! tables.

use finsight_core::models::ExtractionMethod;

use crate::context::{DimensionMember, XbrlPeriod};

#[derive(Debug, Clone)]
pub struct ParsedFact {
    pub concept_qname: String,
    pub taxonomy: String,
    pub context_id: String,
    pub period: XbrlPeriod,
    pub dimensions: Vec<DimensionMember>,
    pub unit: Option<String>,
    pub decimals: Option<i32>,
    pub scale: Option<i32>,
    pub value_text: Option<String>,
    pub value_numeric: Option<f64>,
    pub xbrl_fact_id: Option<String>,
    pub source_line: Option<i32>,
    pub order_index: i32,
    pub is_primary: bool,
    pub extraction_method: ExtractionMethod,
}

impl ParsedFact {
    /// Resolves the raw text content against `decimals`/`scale` into the
    /// numeric value the warehouse stores ("numeric value (after
    /// scale resolution)"). A fact with no numeric-looking content is
    /// left textual.
    pub fn resolve_value(raw: &str, scale: Option<i32>) -> (Option<f64>, Option<String>) {
        let trimmed = raw.trim();
        let cleaned = trimmed.replace(',', "");
        match cleaned.parse::<f64>() {
            Ok(v) => {
                let scaled = match scale {
                    Some(s) => v * 10f64.powi(s),
                    None => v,
                };
                (Some(scaled), None)
            }
            Err(_) => (None, Some(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_value_applies_scale() {
        let (num, text) = ParsedFact::resolve_value("383285", Some(6));
        assert_eq!(num, Some(383_285_000_000.0));
        assert!(text.is_none());
    }

    #[test]
    fn resolve_value_strips_thousands_separators() {
        let (num, _) = ParsedFact::resolve_value("1,234.56", None);
        assert_eq!(num, Some(1234.56));
    }

    #[test]
    fn non_numeric_content_stays_textual() {
        let (num, text) = ParsedFact::resolve_value("Apple Inc.", None);
        assert!(num.is_none());
        assert_eq!(text.as_deref(), Some("Apple Inc."));
    }
}
