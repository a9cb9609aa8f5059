//! Semantic equivalence groups and label fallback groups, derived
//! once from a `TaxonomyIndex` and consulted by the normalizer (C4).

use std::collections::{BTreeSet, HashMap};

use crate::types::TaxonomyIndex;

/// Concepts whose reference tuple *set* is identical form an equivalence
/// class ("Semantic equivalence groups"). A typical US-GAAP taxonomy
/// is expected to produce ten thousand-plus such mappings.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceGroups {
    /// concept qname -> canonical group id (a stable hash of the shared reference set)
    reference_group: HashMap<String, u64>,
    /// concept qname -> preferred label, used for the weaker fallback grouping
    label_group: HashMap<String, String>,
}

impl EquivalenceGroups {
    pub fn build(index: &TaxonomyIndex) -> Self {
        let mut reference_group = HashMap::new();
        let mut label_group = HashMap::new();

        for (qname, meta) in &index.concepts {
            if !meta.references.is_empty() {
                let set: BTreeSet<&crate::types::ReferenceTuple> = meta.references.iter().collect();
                let key = format!("{set:?}");
                let id = hash_key(&key);
                reference_group.insert(qname.clone(), id);
            } else if let Some(label) = meta.labels.first() {
                label_group.insert(qname.clone(), label.clone());
            }
        }

        Self {
            reference_group,
            label_group,
        }
    }

    /// True when `a` and `b` share an identical reference tuple set
    /// (strong equivalence, priority 2).
    pub fn reference_equivalent(&self, a: &str, b: &str) -> bool {
        match (self.reference_group.get(a), self.reference_group.get(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// True when `a` and `b` share a preferred label and *neither* has
    /// reference-linkbase data (weaker fallback grouping, priority
    /// 4 — "used only when reference equivalence is unavailable").
    pub fn label_fallback_equivalent(&self, a: &str, b: &str) -> bool {
        if self.reference_group.contains_key(a) || self.reference_group.contains_key(b) {
            return false;
        }
        match (self.label_group.get(a), self.label_group.get(b)) {
            (Some(la), Some(lb)) => la == lb,
            _ => false,
        }
    }

    /// The reference-equivalence group id a concept belongs to, if any.
    /// Exposed so a consumer (the normalizer) can pick one canonical
    /// member per group without an O(n^2) pairwise scan.
    pub fn reference_group_key(&self, concept: &str) -> Option<u64> {
        self.reference_group.get(concept).copied()
    }

    /// The label-fallback group key a concept belongs to, if any.
    pub fn label_group_key(&self, concept: &str) -> Option<&str> {
        self.label_group.get(concept).map(|s| s.as_str())
    }
}

fn hash_key(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConceptMeta, ReferenceTuple};

    fn meta_with_refs(refs: Vec<ReferenceTuple>) -> ConceptMeta {
        ConceptMeta {
            labels: vec![],
            references: refs,
            data_type: "monetary".into(),
            is_abstract: false,
            balance_type: Some("debit".into()),
            period_type: "instant".into(),
        }
    }

    #[test]
    fn identical_reference_sets_are_equivalent() {
        let refs = vec![ReferenceTuple {
            document: "FASB ASC".into(),
            paragraph: "210-10-45".into(),
            section: "1".into(),
        }];
        let mut index = TaxonomyIndex {
            taxonomy: "us-gaap-2023".into(),
            ..Default::default()
        };
        index.concepts.insert("AccountsReceivableNetCurrent".into(), meta_with_refs(refs.clone()));
        index.concepts.insert("ReceivablesNetCurrent".into(), meta_with_refs(refs));

        let groups = EquivalenceGroups::build(&index);
        assert!(groups.reference_equivalent("AccountsReceivableNetCurrent", "ReceivablesNetCurrent"));
    }

    #[test]
    fn different_reference_sets_are_not_equivalent() {
        let mut index = TaxonomyIndex {
            taxonomy: "us-gaap-2023".into(),
            ..Default::default()
        };
        index.concepts.insert(
            "Assets".into(),
            meta_with_refs(vec![ReferenceTuple {
                document: "FASB ASC".into(),
                paragraph: "210-10-45".into(),
                section: "1".into(),
            }]),
        );
        index.concepts.insert(
            "Liabilities".into(),
            meta_with_refs(vec![ReferenceTuple {
                document: "FASB ASC".into(),
                paragraph: "210-10-45".into(),
                section: "2".into(),
            }]),
        );

        let groups = EquivalenceGroups::build(&index);
        assert!(!groups.reference_equivalent("Assets", "Liabilities"));
    }

    #[test]
    fn label_fallback_only_applies_when_no_references() {
        let mut index = TaxonomyIndex {
            taxonomy: "us-gaap-2023".into(),
            ..Default::default()
        };
        index.concepts.insert(
            "FooBar".into(),
            ConceptMeta {
                labels: vec!["Cash and cash equivalents".into()],
                references: vec![],
                data_type: "monetary".into(),
                is_abstract: false,
                balance_type: Some("debit".into()),
                period_type: "instant".into(),
            },
        );
        index.concepts.insert(
            "BazQux".into(),
            ConceptMeta {
                labels: vec!["Cash and cash equivalents".into()],
                references: vec![],
                data_type: "monetary".into(),
                is_abstract: false,
                balance_type: Some("debit".into()),
                period_type: "instant".into(),
            },
        );

        let groups = EquivalenceGroups::build(&index);
        assert!(groups.label_fallback_equivalent("FooBar", "BazQux"));
    }
}
