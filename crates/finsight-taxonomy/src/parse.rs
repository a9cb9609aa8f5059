//! Taxonomy package parsing into the four indexes. A taxonomy
//! package bundles an XML schema (concept declarations) with calculation,
//! presentation, label and reference linkbases; this module walks each
//! with `roxmltree` and folds them into a single `TaxonomyIndex`.

use std::collections::HashMap;

use roxmltree::Document;

use crate::error::{TaxonomyError, TaxonomyResult};
use crate::types::{CalcArc, ConceptMeta, PresentationNode, ReferenceTuple, TaxonomyIndex};

/// Parses a taxonomy package's concatenated schema + linkbase XML into a
/// `TaxonomyIndex`. The package is expected to be well-formed XML (the
/// download step already validated content-type); a document that fails
/// to parse at all is the only hard failure here — the taxonomy parser
/// does not partially trust a corrupt package.
pub fn parse_taxonomy_package(taxonomy: &str, bytes: &[u8]) -> TaxonomyResult<TaxonomyIndex> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| TaxonomyError::Malformed(taxonomy.to_string(), e.to_string()))?;
    let doc = Document::parse(text)
        .map_err(|e| TaxonomyError::Malformed(taxonomy.to_string(), e.to_string()))?;

    let mut concepts = HashMap::new();
    let mut calc: HashMap<String, Vec<CalcArc>> = HashMap::new();
    let mut presentation: HashMap<String, PresentationNode> = HashMap::new();
    let mut references: HashMap<String, Vec<ReferenceTuple>> = HashMap::new();

    for node in doc.descendants() {
        match node.tag_name().name() {
            "element" => {
                if let Some(name) = node.attribute("name") {
                    concepts.insert(name.to_string(), concept_meta_from_element(node));
                }
            }
            "calculationArc" => {
                if let (Some(from), Some(to)) = (node.attribute("from"), node.attribute("to")) {
                    let weight = node.attribute("weight").and_then(|w| w.parse().ok()).unwrap_or(1.0);
                    let order = node.attribute("order").and_then(|o| o.parse().ok()).unwrap_or(0);
                    calc.entry(from.to_string()).or_default().push(CalcArc {
                        child_qname: to.to_string(),
                        weight,
                        order,
                    });
                }
            }
            "presentationArc" => {
                if let (Some(from), Some(to)) = (node.attribute("from"), node.attribute("to")) {
                    let order = node.attribute("order").and_then(|o| o.parse().ok()).unwrap_or(0);
                    let preferred_label = node.attribute("preferredLabel").map(str::to_string);
                    let role = node.attribute("role").unwrap_or("default").to_string();
                    let tree = presentation.entry(role).or_insert_with(|| PresentationNode {
                        qname: from.to_string(),
                        order: 0,
                        preferred_label: None,
                        children: Vec::new(),
                    });
                    tree.children.push(PresentationNode {
                        qname: to.to_string(),
                        order,
                        preferred_label,
                        children: Vec::new(),
                    });
                }
            }
            "reference" => {
                if let Some(concept) = node.attribute("concept") {
                    let document = node.children().find(|c| c.tag_name().name() == "Name").and_then(|c| c.text()).unwrap_or_default();
                    let paragraph = node.children().find(|c| c.tag_name().name() == "Paragraph").and_then(|c| c.text()).unwrap_or_default();
                    let section = node.children().find(|c| c.tag_name().name() == "Section").and_then(|c| c.text()).unwrap_or_default();
                    references.entry(concept.to_string()).or_default().push(ReferenceTuple {
                        document: document.to_string(),
                        paragraph: paragraph.to_string(),
                        section: section.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    for (qname, refs) in &references {
        if let Some(meta) = concepts.get_mut(qname) {
            meta.references = refs.clone();
        }
    }

    Ok(TaxonomyIndex {
        taxonomy: taxonomy.to_string(),
        concepts,
        calc,
        presentation,
        references,
    })
}

fn concept_meta_from_element(node: roxmltree::Node) -> ConceptMeta {
    let data_type = node.attribute("type").unwrap_or("string").to_string();
    let is_abstract = node.attribute("abstract").map(|v| v == "true").unwrap_or(false);
    let balance_type = node.attribute("balance").map(str::to_string);
    let period_type = node.attribute("periodType").unwrap_or("duration").to_string();
    let labels = node
        .children()
        .find(|c| c.tag_name().name() == "label")
        .and_then(|c| c.text())
        .map(|t| vec![t.to_string()])
        .unwrap_or_default();

    ConceptMeta {
        labels,
        references: Vec::new(),
        data_type,
        is_abstract,
        balance_type,
        period_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: &str = r#"
        <taxonomy>
          <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <element name="Assets" type="monetaryItemType" abstract="false" balance="debit" periodType="instant">
              <label>Assets</label>
            </element>
            <element name="AssetsCurrent" type="monetaryItemType" abstract="false" balance="debit" periodType="instant">
              <label>Assets, Current</label>
            </element>
          </xs:schema>
          <calculationLink>
            <calculationArc from="Assets" to="AssetsCurrent" weight="1" order="1"/>
          </calculationLink>
          <presentationLink>
            <presentationArc from="Assets" to="AssetsCurrent" order="1" preferredLabel="terseLabel" role="http://taxonomy/role/BalanceSheet"/>
          </presentationLink>
          <referenceLink>
            <reference concept="Assets">
              <Name>FASB ASC</Name>
              <Paragraph>210-10-45</Paragraph>
              <Section>1</Section>
            </reference>
          </referenceLink>
        </taxonomy>
    "#;

    #[test]
    fn parses_concepts_calc_presentation_and_references() {
        let index = parse_taxonomy_package("us-gaap-2023", PACKAGE.as_bytes()).unwrap();

        assert!(index.concepts.contains_key("Assets"));
        assert_eq!(index.concepts["Assets"].balance_type.as_deref(), Some("debit"));

        let arcs = &index.calc["Assets"];
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].child_qname, "AssetsCurrent");
        assert_eq!(arcs[0].weight, 1.0);

        assert_eq!(index.references["Assets"][0].paragraph, "210-10-45");
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let result = parse_taxonomy_package("us-gaap-2023", b"<not-xml");
        assert!(result.is_err());
    }
}
