//! Fallback linkbase parser. Inline XBRL documents often carry no
//! embedded presentation/calculation metadata at all; when that happens
//! the parser falls back to direct XML parsing of the sibling
//! `*_pre.xml`/`*_cal.xml`/`*_lab.xml`/`*_ref.xml` linkbase files and
//! reconstructs the same logical `(parent, child, order, weight,
//! role_uri)` arcs, the same way `finsight-taxonomy` reconstructs arcs
//! from a taxonomy package.

use roxmltree::Document;

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone)]
pub struct LinkbaseArc {
    pub parent_qname: String,
    pub child_qname: String,
    pub order: i32,
    pub weight: f64,
    pub role_uri: String,
}

#[derive(Debug, Clone)]
pub struct LinkbaseLabel {
    pub concept_qname: String,
    pub label: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct LinkbaseReference {
    pub concept_qname: String,
    pub document: String,
    pub paragraph: String,
    pub section: String,
}

/// Parses a `*_cal.xml` linkbase into calculation arcs.
pub fn parse_calculation_linkbase(bytes: &[u8]) -> ParseResult<Vec<LinkbaseArc>> {
    parse_arcs(bytes, "calculationArc", "calculationLink")
}

/// Parses a `*_pre.xml` linkbase into presentation arcs (weight is
/// meaningless for presentation and is always reported as `1.0`).
pub fn parse_presentation_linkbase(bytes: &[u8]) -> ParseResult<Vec<LinkbaseArc>> {
    parse_arcs(bytes, "presentationArc", "presentationLink")
}

fn parse_arcs(bytes: &[u8], arc_tag: &str, link_tag: &str) -> ParseResult<Vec<LinkbaseArc>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;
    let doc = Document::parse(text).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;

    let mut arcs = Vec::new();
    for link in doc.descendants().filter(|n| n.tag_name().name() == link_tag) {
        let role_uri = link.attribute("role").unwrap_or("default").to_string();
        for arc in link.descendants().filter(|n| n.tag_name().name() == arc_tag) {
            let (Some(from), Some(to)) = (arc.attribute("from"), arc.attribute("to")) else {
                continue;
            };
            let order = arc.attribute("order").and_then(|o| o.parse().ok()).unwrap_or(0);
            let weight = arc.attribute("weight").and_then(|w| w.parse().ok()).unwrap_or(1.0);
            arcs.push(LinkbaseArc {
                parent_qname: from.to_string(),
                child_qname: to.to_string(),
                order,
                weight,
                role_uri: role_uri.clone(),
            });
        }
    }
    Ok(arcs)
}

/// Parses a `*_lab.xml` linkbase into `(concept, label, role)` triples,
/// keyed off the `labelArc`'s `to` locator and the `label` element's
/// own `label` attribute (the XBRL spec's indirection through `loc`
/// elements is elided here, same simplification as `finsight-taxonomy`'s
/// package parser).
pub fn parse_label_linkbase(bytes: &[u8]) -> ParseResult<Vec<LinkbaseLabel>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;
    let doc = Document::parse(text).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;

    let mut labels = Vec::new();
    for node in doc.descendants().filter(|n| n.tag_name().name() == "label") {
        let Some(concept_qname) = node.attribute("for").or_else(|| node.attribute("label")) else {
            continue;
        };
        let role = node
            .attribute("role")
            .unwrap_or("http://www.xbrl.org/2003/role/label")
            .to_string();
        let label = node.text().unwrap_or_default().trim().to_string();
        if label.is_empty() {
            continue;
        }
        labels.push(LinkbaseLabel { concept_qname: concept_qname.to_string(), label, role });
    }
    Ok(labels)
}

/// Parses a `*_ref.xml` linkbase into `(concept, document, paragraph,
/// section)` tuples.
pub fn parse_reference_linkbase(bytes: &[u8]) -> ParseResult<Vec<LinkbaseReference>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;
    let doc = Document::parse(text).map_err(|e| ParseError::InvalidXbrl(e.to_string()))?;

    let mut references = Vec::new();
    for node in doc.descendants().filter(|n| n.tag_name().name() == "reference") {
        let Some(concept_qname) = node.attribute("concept").or_else(|| node.attribute("for")) else {
            continue;
        };
        let document = node.children().find(|c| c.tag_name().name() == "Name").and_then(|c| c.text()).unwrap_or_default();
        let paragraph = node.children().find(|c| c.tag_name().name() == "Paragraph").and_then(|c| c.text()).unwrap_or_default();
        let section = node.children().find(|c| c.tag_name().name() == "Section").and_then(|c| c.text()).unwrap_or_default();
        references.push(LinkbaseReference {
            concept_qname: concept_qname.to_string(),
            document: document.to_string(),
            paragraph: paragraph.to_string(),
            section: section.to_string(),
        });
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAL: &str = r#"
        <linkbase>
          <calculationLink role="http://taxonomy/role/BalanceSheet">
            <calculationArc from="Assets" to="AssetsCurrent" weight="1" order="1"/>
            <calculationArc from="Assets" to="AssetsNoncurrent" weight="1" order="2"/>
          </calculationLink>
        </linkbase>
    "#;

    const PRE: &str = r#"
        <linkbase>
          <presentationLink role="http://taxonomy/role/BalanceSheet">
            <presentationArc from="Assets" to="AssetsCurrent" order="1"/>
          </presentationLink>
        </linkbase>
    "#;

    const LAB: &str = r#"
        <linkbase>
          <labelLink>
            <label for="Assets" role="http://www.xbrl.org/2003/role/terseLabel">Assets</label>
          </labelLink>
        </linkbase>
    "#;

    const REF: &str = r#"
        <linkbase>
          <referenceLink>
            <reference concept="Assets">
              <Name>FASB ASC</Name>
              <Paragraph>210-10-45</Paragraph>
              <Section>1</Section>
            </reference>
          </referenceLink>
        </linkbase>
    "#;

    #[test]
    fn calculation_linkbase_reconstructs_weighted_arcs() {
        let arcs = parse_calculation_linkbase(CAL.as_bytes()).unwrap();
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].parent_qname, "Assets");
        assert_eq!(arcs[0].child_qname, "AssetsCurrent");
        assert_eq!(arcs[0].role_uri, "http://taxonomy/role/BalanceSheet");
    }

    #[test]
    fn presentation_linkbase_reconstructs_display_order() {
        let arcs = parse_presentation_linkbase(PRE.as_bytes()).unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].order, 1);
    }

    #[test]
    fn label_linkbase_extracts_preferred_labels() {
        let labels = parse_label_linkbase(LAB.as_bytes()).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].concept_qname, "Assets");
        assert_eq!(labels[0].label, "Assets");
    }

    #[test]
    fn reference_linkbase_extracts_citations() {
        let refs = parse_reference_linkbase(REF.as_bytes()).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].paragraph, "210-10-45");
    }

    #[test]
    fn malformed_linkbase_is_rejected() {
        assert!(parse_calculation_linkbase(b"<not-xml").is_err());
    }
}
