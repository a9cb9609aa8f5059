// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C3: turns one filing's raw XBRL documents into an enumerated,
//! deduplicated, fully-provenanced set of facts plus the presentation
//! and calculation relationships that give them structure.
//!
//! The entry point is [`parse_filing`]: it parses the primary
//! instance/inline-XBRL document with [`instance::parse_instance`],
//! deduplicates the resulting facts with [`dedup::mark_duplicates`],
//! and — when the primary document carries no embedded presentation or
//! calculation metadata of its own — reconstructs both relationship
//! sets from the filing's sibling linkbase files via [`linkbase`].

pub mod context;
pub mod dedup;
pub mod error;
pub mod export;
pub mod fact;
pub mod instance;
pub mod linkbase;

pub use context::{DimensionMember, XbrlContext, XbrlPeriod, XbrlUnit};
pub use error::{ParseError, ParseResult};
pub use export::{FilingExport, FilingExportHeader};
pub use fact::ParsedFact;
pub use instance::{parse_instance, ParsedDocument};
pub use linkbase::{LinkbaseArc, LinkbaseLabel, LinkbaseReference};

/// The sibling linkbase documents shipped alongside a filing's primary
/// document, keyed the way SEC EDGAR names them (`*_pre.xml` etc). Any
/// of the four may be absent — a filer sometimes omits a linkbase
/// entirely, most often the reference linkbase.
#[derive(Debug, Clone, Default)]
pub struct Linkbases {
    pub presentation: Option<Vec<u8>>,
    pub calculation: Option<Vec<u8>>,
    pub label: Option<Vec<u8>>,
    pub reference: Option<Vec<u8>>,
}

/// A fully parsed filing: deduplicated facts plus whatever relationship
/// data could be reconstructed, ready for C4 normalization.
#[derive(Debug, Clone)]
pub struct ParsedFiling {
    pub facts: Vec<ParsedFact>,
    pub malformed_count: u32,
    pub calculation_arcs: Vec<LinkbaseArc>,
    pub presentation_arcs: Vec<LinkbaseArc>,
    pub labels: Vec<LinkbaseLabel>,
    pub references: Vec<LinkbaseReference>,
}

/// Parses a filing's primary document and, when present, its sibling
/// linkbase files. Facts come exclusively from the primary
/// document; linkbases only ever contribute relationship structure —
/// a filing with no primary-document facts at all is still a parse
/// failure even if its linkbases are well-formed.
pub fn parse_filing(primary_document: &str, linkbases: &Linkbases) -> ParseResult<ParsedFiling> {
    let mut parsed = parse_instance(primary_document)?;
    dedup::mark_duplicates(&mut parsed.facts);

    let calculation_arcs = linkbases
        .calculation
        .as_deref()
        .map(linkbase::parse_calculation_linkbase)
        .transpose()?
        .unwrap_or_default();
    let presentation_arcs = linkbases
        .presentation
        .as_deref()
        .map(linkbase::parse_presentation_linkbase)
        .transpose()?
        .unwrap_or_default();
    let labels = linkbases
        .label
        .as_deref()
        .map(linkbase::parse_label_linkbase)
        .transpose()?
        .unwrap_or_default();
    let references = linkbases
        .reference
        .as_deref()
        .map(linkbase::parse_reference_linkbase)
        .transpose()?
        .unwrap_or_default();

    Ok(ParsedFiling {
        facts: parsed.facts,
        malformed_count: parsed.malformed_count,
        calculation_arcs,
        presentation_arcs,
        labels,
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCE: &str = r#"<?xml version="1.0"?>
        <xbrl>
          <context id="FY2023">
            <entity><identifier>0000320193</identifier></entity>
            <period><startDate>2022-10-01</startDate><endDate>2023-09-30</endDate></period>
          </context>
          <unit id="usd"><measure>iso4217:USD</measure></unit>
          <us-gaap:Revenues contextRef="FY2023" unitRef="usd" decimals="-6">383285000000</us-gaap:Revenues>
          <us-gaap:Revenues contextRef="FY2023" unitRef="usd" decimals="-6">383285000000</us-gaap:Revenues>
        </xbrl>
    "#;

    const CAL: &str = r#"
        <linkbase>
          <calculationLink role="http://taxonomy/role/IncomeStatement">
            <calculationArc from="GrossProfit" to="Revenues" weight="1" order="1"/>
          </calculationLink>
        </linkbase>
    "#;

    #[test]
    fn parse_filing_dedups_facts_and_attaches_linkbase_relationships() {
        let linkbases = Linkbases { calculation: Some(CAL.as_bytes().to_vec()), ..Default::default() };
        let filing = parse_filing(INSTANCE, &linkbases).unwrap();

        assert_eq!(filing.facts.len(), 2);
        assert!(filing.facts[0].is_primary);
        assert!(!filing.facts[1].is_primary);
        assert_eq!(filing.calculation_arcs.len(), 1);
        assert_eq!(filing.calculation_arcs[0].child_qname, "Revenues");
    }

    #[test]
    fn parse_filing_with_no_linkbases_yields_empty_relationships() {
        let filing = parse_filing(INSTANCE, &Linkbases::default()).unwrap();
        assert!(filing.calculation_arcs.is_empty());
        assert!(filing.presentation_arcs.is_empty());
    }

    #[test]
    fn invalid_primary_document_is_a_hard_error() {
        let result = parse_filing("not xml at all", &Linkbases::default());
        assert!(result.is_err());
    }
}
