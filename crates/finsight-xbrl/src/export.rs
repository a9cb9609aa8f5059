//! `FilingExport`: the intermediate JSON representation a parsed filing
//! is serialised to — used both as an on-disk cache of a parse
//! and as the payload handed across a process boundary to C4/C5 when
//! they run against a remote database.

use serde::{Deserialize, Serialize};

use crate::context::{DimensionMember, XbrlPeriod};
use crate::fact::ParsedFact;
use crate::linkbase::{LinkbaseArc, LinkbaseLabel, LinkbaseReference};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingExportHeader {
    pub ticker: String,
    pub year: i32,
    pub filing_type: String,
    pub accession: String,
    pub source_url: String,
    pub extraction_timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactExport {
    pub concept: String,
    pub taxonomy: String,
    pub value_numeric: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
    pub decimals: Option<i32>,
    pub scale: Option<i32>,
    pub period_type: String,
    pub period_start: Option<chrono::NaiveDate>,
    pub period_end: Option<chrono::NaiveDate>,
    pub instant_date: Option<chrono::NaiveDate>,
    pub dimensions: Vec<DimensionMember>,
    pub context_id: String,
    pub fact_id: Option<String>,
    pub source_line: Option<i32>,
    pub order_index: i32,
    pub is_primary: bool,
}

impl From<&ParsedFact> for FactExport {
    fn from(fact: &ParsedFact) -> Self {
        let period_type = if fact.period.is_duration() { "duration" } else { "instant" };
        FactExport {
            concept: fact.concept_qname.clone(),
            taxonomy: fact.taxonomy.clone(),
            value_numeric: fact.value_numeric,
            value_text: fact.value_text.clone(),
            unit: fact.unit.clone(),
            decimals: fact.decimals,
            scale: fact.scale,
            period_type: period_type.to_string(),
            period_start: fact.period.start_date,
            period_end: fact.period.end_date,
            instant_date: fact.period.instant,
            dimensions: fact.dimensions.clone(),
            context_id: fact.context_id.clone(),
            fact_id: fact.xbrl_fact_id.clone(),
            source_line: fact.source_line,
            order_index: fact.order_index,
            is_primary: fact.is_primary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRelExport {
    pub parent: String,
    pub child: String,
    pub weight: f64,
    pub order: i32,
    pub role_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationRelExport {
    pub parent: String,
    pub child: String,
    pub order: i32,
    pub role_uri: String,
    pub preferred_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootnoteExport {
    pub fact_id: Option<String>,
    pub concept: String,
    pub text: String,
    pub label: Option<String>,
    pub role: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelationshipsExport {
    pub calculation: Vec<CalculationRelExport>,
    pub presentation: Vec<PresentationRelExport>,
    pub footnotes: Vec<FootnoteExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingExport {
    pub filing: FilingExportHeader,
    pub facts: Vec<FactExport>,
    pub relationships: RelationshipsExport,
}

impl FilingExport {
    pub fn new(header: FilingExportHeader, facts: &[ParsedFact]) -> Self {
        FilingExport {
            filing: header,
            facts: facts.iter().map(FactExport::from).collect(),
            relationships: RelationshipsExport::default(),
        }
    }

    pub fn with_calculation_arcs(mut self, arcs: &[LinkbaseArc]) -> Self {
        self.relationships.calculation = arcs
            .iter()
            .map(|a| CalculationRelExport {
                parent: a.parent_qname.clone(),
                child: a.child_qname.clone(),
                weight: a.weight,
                order: a.order,
                role_uri: a.role_uri.clone(),
            })
            .collect();
        self
    }

    pub fn with_presentation_arcs(mut self, arcs: &[LinkbaseArc], labels: &[LinkbaseLabel]) -> Self {
        self.relationships.presentation = arcs
            .iter()
            .map(|a| {
                let preferred_label = labels
                    .iter()
                    .find(|l| l.concept_qname == a.child_qname)
                    .map(|l| l.label.clone());
                PresentationRelExport {
                    parent: a.parent_qname.clone(),
                    child: a.child_qname.clone(),
                    order: a.order,
                    role_uri: a.role_uri.clone(),
                    preferred_label,
                }
            })
            .collect();
        self
    }

    pub fn with_footnotes(mut self, footnotes: Vec<FootnoteExport>) -> Self {
        self.relationships.footnotes = footnotes;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Referenced only to keep `roxmltree`-derived reference tuples
/// reachable from an export consumer without re-parsing the linkbase.
pub type ReferenceExport = LinkbaseReference;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::XbrlPeriod;
    use finsight_core::models::ExtractionMethod;

    fn sample_fact() -> ParsedFact {
        ParsedFact {
            concept_qname: "Assets".to_string(),
            taxonomy: "us-gaap".to_string(),
            context_id: "FY2023".to_string(),
            period: XbrlPeriod { instant: Some(chrono::NaiveDate::from_ymd_opt(2023, 9, 30).unwrap()), start_date: None, end_date: None },
            dimensions: Vec::new(),
            unit: Some("iso4217:USD".to_string()),
            decimals: Some(-6),
            scale: None,
            value_text: None,
            value_numeric: Some(1_000_000.0),
            xbrl_fact_id: Some("f1".to_string()),
            source_line: None,
            order_index: 0,
            is_primary: true,
            extraction_method: ExtractionMethod::Instance,
        }
    }

    #[test]
    fn exports_round_trip_through_json() {
        let header = FilingExportHeader {
            ticker: "AAPL".to_string(),
            year: 2023,
            filing_type: "10-K".to_string(),
            accession: "0000320193-23-000106".to_string(),
            source_url: "https://www.sec.gov/Archives/edgar/data/320193/...".to_string(),
            extraction_timestamp: chrono::DateTime::parse_from_rfc3339("2023-11-03T00:00:00Z").unwrap().with_timezone(&chrono::Utc),
        };
        let export = FilingExport::new(header, &[sample_fact()]);
        let json = export.to_json().unwrap();
        let parsed: FilingExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.facts.len(), 1);
        assert_eq!(parsed.facts[0].concept, "Assets");
        assert_eq!(parsed.facts[0].period_type, "instant");
    }

    #[test]
    fn calculation_arcs_attach_to_relationships() {
        let header = FilingExportHeader {
            ticker: "AAPL".to_string(),
            year: 2023,
            filing_type: "10-K".to_string(),
            accession: "0".to_string(),
            source_url: "https://example.com".to_string(),
            extraction_timestamp: chrono::DateTime::parse_from_rfc3339("2023-11-03T00:00:00Z").unwrap().with_timezone(&chrono::Utc),
        };
        let arcs = vec![LinkbaseArc {
            parent_qname: "Assets".to_string(),
            child_qname: "AssetsCurrent".to_string(),
            order: 1,
            weight: 1.0,
            role_uri: "http://taxonomy/role/BalanceSheet".to_string(),
        }];
        let export = FilingExport::new(header, &[]).with_calculation_arcs(&arcs);
        assert_eq!(export.relationships.calculation.len(), 1);
        assert_eq!(export.relationships.calculation[0].child, "AssetsCurrent");
    }
}
