//! Streaming instance/inline-XBRL parser, built on `quick-xml`'s
//! pull-event reader in the same `Event::Start`/`Event::Text`/`Event::End`
//! style as the fallback parser this workspace's fetcher lineage uses.
//!
//! Two passes over the document: the first collects every `<context>`
//! and `<unit>` (inline XBRL embeds these inside an arbitrary HTML
//! document, so a fact can appear before the context it references),
//! the second walks every fact-bearing element and resolves it against
//! the context/unit maps built in the first pass.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use finsight_core::models::ExtractionMethod;

use crate::context::{DimensionMember, XbrlContext, XbrlPeriod, XbrlUnit};
use crate::error::{ParseError, ParseResult};
use crate::fact::ParsedFact;

const STANDARD_ELEMENTS: &[&str] = &[
    "xbrl", "context", "entity", "identifier", "period", "startDate", "endDate", "instant", "unit",
    "measure", "linkbaseRef", "schemaRef", "roleRef", "arcroleRef", "segment", "scenario",
    "explicitMember", "typedMember", "divide", "numerator", "denominator", "footnoteLink",
];

/// Non-fact `ix:` control elements (header, references, exclusions) that
/// appear in an inline-XBRL document's `<ix:header>` alongside the real
/// `ix:nonFraction`/`ix:nonNumeric` facts.
const INLINE_CONTROL_ELEMENTS: &[&str] = &[
    "header", "references", "resources", "hidden", "exclude", "tuple", "footnote",
];

pub struct ParsedDocument {
    pub facts: Vec<ParsedFact>,
    pub malformed_count: u32,
}

pub fn parse_instance(content: &str) -> ParseResult<ParsedDocument> {
    let is_inline = content.contains("ix:nonFraction") || content.contains("ix:nonNumeric") || content.contains("<ix:");

    let (contexts, units) = collect_contexts_and_units(content)?;

    let mut facts = Vec::new();
    let mut malformed_count = 0u32;
    let mut order_index = 0i32;

    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;
        match event {
            Event::Start(ref e) => {
                let name = qname(e.name().as_ref());
                let (prefix, local) = split_qname(&name);

                let is_inline_fact = prefix == "ix" && (local == "nonFraction" || local == "nonNumeric");
                let is_plain_fact = prefix != "ix"
                    && prefix != "xbrli"
                    && prefix != "xbrldi"
                    && !STANDARD_ELEMENTS.contains(&local.as_str());
                let is_inline_control = prefix == "ix" && INLINE_CONTROL_ELEMENTS.contains(&local.as_str());

                if is_inline_control || !(is_inline_fact || is_plain_fact) {
                    continue;
                }

                let text = read_text(&mut reader)?;
                match build_fact(e, &name, &text, &contexts, &units, order_index, is_inline) {
                    Ok(Some(fact)) => {
                        facts.push(fact);
                        order_index += 1;
                    }
                    Ok(None) => {}
                    Err(_) => malformed_count += 1,
                }
            }
            Event::Empty(ref e) => {
                let name = qname(e.name().as_ref());
                let (prefix, local) = split_qname(&name);

                let is_inline_fact = prefix == "ix" && (local == "nonFraction" || local == "nonNumeric");
                let is_plain_fact = prefix != "ix"
                    && prefix != "xbrli"
                    && prefix != "xbrldi"
                    && !STANDARD_ELEMENTS.contains(&local.as_str());

                if !(is_inline_fact || is_plain_fact) {
                    continue;
                }

                match build_fact(e, &name, "", &contexts, &units, order_index, is_inline) {
                    Ok(Some(fact)) => {
                        facts.push(fact);
                        order_index += 1;
                    }
                    Ok(None) => {}
                    Err(_) => malformed_count += 1,
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if facts.is_empty() && malformed_count == 0 && !content.trim_start().starts_with('<') {
        return Err(ParseError::InvalidXbrl("document does not start with an XML element".into()));
    }

    Ok(ParsedDocument { facts, malformed_count })
}

fn collect_contexts_and_units(
    content: &str,
) -> ParseResult<(HashMap<String, XbrlContext>, HashMap<String, XbrlUnit>)> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut contexts = HashMap::new();
    let mut units = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = qname(e.name().as_ref());
                let (_, local) = split_qname(&name);
                match local.as_str() {
                    "context" => {
                        if let Some(ctx) = parse_context(e, &mut reader)? {
                            contexts.insert(ctx.id.clone(), ctx);
                        }
                    }
                    "unit" => {
                        if let Some(unit) = parse_unit(e, &mut reader)? {
                            units.insert(unit.id.clone(), unit);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidXbrl(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok((contexts, units))
}

fn parse_context(
    element: &quick_xml::events::BytesStart,
    reader: &mut Reader<&[u8]>,
) -> ParseResult<Option<XbrlContext>> {
    let id = attr(element, "id").ok_or_else(|| ParseError::MalformedFact("context without id".into()))?;

    let mut entity_identifier = String::new();
    let mut period = XbrlPeriod {
        instant: None,
        start_date: None,
        end_date: None,
    };
    let mut dimensions = Vec::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let (_, local) = split_qname(&qname(e.name().as_ref()));
                match local.as_str() {
                    "identifier" => {
                        entity_identifier = read_text(reader)?;
                    }
                    "startDate" => period.start_date = parse_date(&read_text(reader)?),
                    "endDate" => period.end_date = parse_date(&read_text(reader)?),
                    "instant" => period.instant = parse_date(&read_text(reader)?),
                    "explicitMember" => {
                        let axis = attr(e, "dimension").unwrap_or_default();
                        let member = read_text(reader)?;
                        dimensions.push(DimensionMember { axis, member });
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let (_, local) = split_qname(&qname(e.name().as_ref()));
                if local == "context" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidXbrl(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(Some(XbrlContext {
        id,
        entity_identifier,
        period,
        dimensions,
    }))
}

fn parse_unit(
    element: &quick_xml::events::BytesStart,
    reader: &mut Reader<&[u8]>,
) -> ParseResult<Option<XbrlUnit>> {
    let id = attr(element, "id").ok_or_else(|| ParseError::MalformedFact("unit without id".into()))?;
    let mut measure = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let (_, local) = split_qname(&qname(e.name().as_ref()));
                if local == "measure" {
                    measure = read_text(reader)?;
                }
            }
            Ok(Event::End(ref e)) => {
                let (_, local) = split_qname(&qname(e.name().as_ref()));
                if local == "unit" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidXbrl(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(Some(XbrlUnit { id, measure }))
}

fn build_fact(
    element: &quick_xml::events::BytesStart,
    qualified_name: &str,
    raw_text: &str,
    contexts: &HashMap<String, XbrlContext>,
    units: &HashMap<String, XbrlUnit>,
    order_index: i32,
    is_inline: bool,
) -> ParseResult<Option<ParsedFact>> {
    let (prefix, local) = split_qname(qualified_name);

    let context_ref = attr(element, "contextRef")
        .ok_or_else(|| ParseError::MalformedFact(format!("{qualified_name} missing contextRef")))?;
    let context = contexts
        .get(&context_ref)
        .ok_or_else(|| ParseError::MalformedFact(format!("{qualified_name} references unknown context {context_ref}")))?;

    let unit_ref = attr(element, "unitRef");
    let unit = unit_ref.as_ref().and_then(|u| units.get(u)).map(|u| u.measure.clone());

    let decimals = attr(element, "decimals").and_then(|d| d.parse().ok());
    let scale = attr(element, "scale").and_then(|s| s.parse().ok());

    let (concept_name, taxonomy) = if prefix == "ix" {
        let name_attr = attr(element, "name").unwrap_or_default();
        split_qname(&name_attr)
    } else {
        (local.clone(), prefix.clone())
    };

    let sign = attr(element, "sign").map(|s| s == "-").unwrap_or(false);

    let (mut value_numeric, value_text) = ParsedFact::resolve_value(raw_text, scale);
    if sign {
        value_numeric = value_numeric.map(|v| -v);
    }

    let extraction_method = if is_inline {
        ExtractionMethod::InlineXbrl
    } else {
        ExtractionMethod::Instance
    };

    Ok(Some(ParsedFact {
        concept_qname: concept_name,
        taxonomy,
        context_id: context_ref,
        period: context.period.clone(),
        dimensions: context.dimensions.clone(),
        unit,
        decimals,
        scale,
        value_text,
        value_numeric,
        xbrl_fact_id: attr(element, "id"),
        source_line: None,
        order_index,
        is_primary: true,
        extraction_method,
    }))
}

fn qname(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

fn split_qname(name: &str) -> (String, String) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), name.to_string()),
    }
}

fn attr(element: &quick_xml::events::BytesStart, key: &str) -> Option<String> {
    element.attributes().filter_map(|a| a.ok()).find_map(|a| {
        let attr_name = qname(a.key.as_ref());
        let (_, local) = split_qname(&attr_name);
        if local == key {
            Some(String::from_utf8_lossy(&a.value).to_string())
        } else {
            None
        }
    })
}

fn read_text(reader: &mut Reader<&[u8]>) -> ParseResult<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidXbrl(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(text.trim().to_string())
}

fn parse_date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCE: &str = r#"<?xml version="1.0"?>
        <xbrl>
          <context id="FY2023">
            <entity><identifier scheme="cik">0000320193</identifier></entity>
            <period><startDate>2022-10-01</startDate><endDate>2023-09-30</endDate></period>
          </context>
          <unit id="usd"><measure>iso4217:USD</measure></unit>
          <us-gaap:Revenues contextRef="FY2023" unitRef="usd" decimals="-6">383285000000</us-gaap:Revenues>
        </xbrl>
    "#;

    #[test]
    fn parses_a_plain_instance_fact_with_context_and_unit() {
        let doc = parse_instance(INSTANCE).unwrap();
        assert_eq!(doc.facts.len(), 1);
        let fact = &doc.facts[0];
        assert_eq!(fact.concept_qname, "Revenues");
        assert_eq!(fact.taxonomy, "us-gaap");
        assert_eq!(fact.value_numeric, Some(383_285_000_000.0));
        assert!(fact.period.is_duration());
        assert_eq!(fact.unit.as_deref(), Some("iso4217:USD"));
    }

    #[test]
    fn fact_referencing_unknown_context_is_malformed_not_fatal() {
        let bad = r#"<xbrl><us-gaap:Assets contextRef="missing">1</us-gaap:Assets></xbrl>"#;
        let doc = parse_instance(bad).unwrap();
        assert_eq!(doc.facts.len(), 0);
        assert_eq!(doc.malformed_count, 1);
    }

    #[test]
    fn unopenable_document_is_fatal() {
        let result = parse_instance("not xml at all");
        assert!(result.is_err());
    }

    #[test]
    fn explicit_dimension_member_is_captured() {
        let dimensioned = r#"<?xml version="1.0"?>
            <xbrl>
              <context id="Segment">
                <entity><identifier>0000320193</identifier></entity>
                <period><instant>2023-09-30</instant></period>
                <segment>
                  <xbrldi:explicitMember dimension="us-gaap:StatementBusinessSegmentsAxis">us-gaap:AmericasMember</xbrldi:explicitMember>
                </segment>
              </context>
              <unit id="usd"><measure>iso4217:USD</measure></unit>
              <us-gaap:Assets contextRef="Segment" unitRef="usd">1000</us-gaap:Assets>
            </xbrl>
        "#;
        let doc = parse_instance(dimensioned).unwrap();
        assert_eq!(doc.facts[0].dimensions.len(), 1);
        assert_eq!(doc.facts[0].dimensions[0].axis, "us-gaap:StatementBusinessSegmentsAxis");
    }
}
