//! The four indexes a taxonomy package is parsed into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConceptMeta {
    pub labels: Vec<String>,
    pub references: Vec<ReferenceTuple>,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub balance_type: Option<String>,
    pub period_type: String,
}

/// A reference-linkbase authoritative citation: `(document, paragraph,
/// section)`. Two concepts whose full reference *sets* match
/// exactly are semantically equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceTuple {
    pub document: String,
    pub paragraph: String,
    pub section: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcArc {
    pub child_qname: String,
    pub weight: f64,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationNode {
    pub qname: String,
    pub order: i32,
    pub preferred_label: Option<String>,
    pub children: Vec<PresentationNode>,
}

/// The parsed form of one taxonomy package (e.g. `us-gaap-2023`), cached
/// as JSON on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaxonomyIndex {
    pub taxonomy: String,
    pub concepts: HashMap<String, ConceptMeta>,
    pub calc: HashMap<String, Vec<CalcArc>>,
    pub presentation: HashMap<String, PresentationNode>,
    pub references: HashMap<String, Vec<ReferenceTuple>>,
}
