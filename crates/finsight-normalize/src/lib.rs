// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C4 Normalizer: maps `concept_name -> normalized_label` deterministically
//! via a five-step priority chain — explicit mapping table, reference-
//! linkbase equivalence, calculation-linkbase child detection, label
//! fallback, then auto-generation. Pure function of a concept plus the
//! taxonomy data cached by `finsight-taxonomy` (C2); running it twice over
//! the same inputs always yields the same label.

pub mod auto_generate;
pub mod error;
pub mod mapping;

use std::collections::HashMap;

use finsight_taxonomy::{EquivalenceGroups, TaxonomyIndex};

pub use auto_generate::{auto_generate, camel_to_snake, is_text_block};
pub use error::{NormalizeError, NormalizeResult};
pub use mapping::{explicit_label_for, INTENTIONAL_MERGES};

/// Built once per cached taxonomy, reused across every
/// concept in every filing that taxonomy covers. Precomputes a single
/// canonical member per equivalence group at construction time so each
/// `normalize` call is O(1) rather than rescanning the whole taxonomy.
pub struct Normalizer<'a> {
    index: &'a TaxonomyIndex,
    groups: &'a EquivalenceGroups,
    canonical_reference_member: HashMap<u64, String>,
    canonical_label_member: HashMap<String, String>,
}

impl<'a> Normalizer<'a> {
    pub fn new(index: &'a TaxonomyIndex, groups: &'a EquivalenceGroups) -> Self {
        let mut canonical_reference_member: HashMap<u64, String> = HashMap::new();
        let mut canonical_label_member: HashMap<String, String> = HashMap::new();

        // Sorted ascending so the first assignment into each group is the
        // lexicographically smallest qname: deterministic regardless of
        // the `HashMap` iteration order the taxonomy index happens to use.
        let mut qnames: Vec<&String> = index.concepts.keys().collect();
        qnames.sort();

        for qname in qnames {
            if let Some(key) = groups.reference_group_key(qname) {
                canonical_reference_member.entry(key).or_insert_with(|| qname.clone());
            } else if let Some(label_key) = groups.label_group_key(qname) {
                canonical_label_member
                    .entry(label_key.to_string())
                    .or_insert_with(|| qname.clone());
            }
        }

        Self {
            index,
            groups,
            canonical_reference_member,
            canonical_label_member,
        }
    }

    /// Runs the five-step priority chain. `is_calc_child` and
    /// `is_top_level_total` describe `concept_name`'s position in the
    /// filing's calculation trees (C3/C5 supply these from `calc_rel`).
    pub fn normalize(
        &self,
        concept_name: &str,
        is_abstract: bool,
        data_type: &str,
        is_calc_child: bool,
        is_top_level_total: bool,
    ) -> String {
        // Priority 1: explicit mapping table.
        if let Some(label) = explicit_label_for(concept_name) {
            return label.to_string();
        }

        // Priority 2: reference-linkbase equivalence.
        if let Some(key) = self.groups.reference_group_key(concept_name) {
            if let Some(canonical) = self.canonical_reference_member.get(&key) {
                return self.label_for_member(canonical);
            }
        }

        // Priority 3: calculation-linkbase child detection — forces a
        // component-specific label distinct from the parent's even if
        // it would otherwise collide via label fallback.
        if is_calc_child && !is_top_level_total {
            return auto_generate(concept_name, is_abstract, data_type);
        }

        // Priority 4: label fallback (reference linkbase absent).
        if let Some(label_key) = self.groups.label_group_key(concept_name) {
            if let Some(canonical) = self.canonical_label_member.get(label_key) {
                return self.label_for_member(canonical);
            }
        }

        // Priority 5: auto-generation.
        auto_generate(concept_name, is_abstract, data_type)
    }

    fn label_for_member(&self, qname: &str) -> String {
        if let Some(label) = explicit_label_for(qname) {
            return label.to_string();
        }
        let meta = self.index.concepts.get(qname);
        let is_abstract = meta.map(|m| m.is_abstract).unwrap_or(false);
        let data_type = meta.map(|m| m.data_type.as_str()).unwrap_or("");
        auto_generate(qname, is_abstract, data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_taxonomy::{ConceptMeta, ReferenceTuple};
    use rstest::rstest;

    fn index_with(concepts: Vec<(&str, ConceptMeta)>) -> TaxonomyIndex {
        let mut index = TaxonomyIndex {
            taxonomy: "us-gaap-2023".into(),
            ..Default::default()
        };
        for (name, meta) in concepts {
            index.concepts.insert(name.to_string(), meta);
        }
        index
    }

    fn meta(is_abstract: bool, data_type: &str, refs: Vec<ReferenceTuple>) -> ConceptMeta {
        ConceptMeta {
            labels: vec![],
            references: refs,
            data_type: data_type.to_string(),
            is_abstract,
            balance_type: Some("debit".into()),
            period_type: "instant".into(),
        }
    }

    #[test]
    fn explicit_mapping_wins_over_everything_else() {
        let index = index_with(vec![("Revenues", meta(false, "monetary", vec![]))]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        assert_eq!(normalizer.normalize("Revenues", false, "monetary", false, true), "revenue");
    }

    #[test]
    fn reference_equivalent_concepts_share_one_label() {
        let refs = vec![ReferenceTuple {
            document: "FASB ASC".into(),
            paragraph: "210-10-45".into(),
            section: "1".into(),
        }];
        let index = index_with(vec![
            ("DeferredTaxAssetsGross", meta(false, "monetary", refs.clone())),
            ("DeferredTaxAssetsGrossAlias", meta(false, "monetary", refs)),
        ]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        let a = normalizer.normalize("DeferredTaxAssetsGross", false, "monetary", false, false);
        let b = normalizer.normalize("DeferredTaxAssetsGrossAlias", false, "monetary", false, false);
        assert_eq!(a, b);
    }

    #[test]
    fn calc_child_gets_component_specific_label_distinct_from_parent() {
        let index = index_with(vec![
            ("DeferredTaxAssetsOther", meta(false, "monetary", vec![])),
            ("DeferredTaxAssetsInventory", meta(false, "monetary", vec![])),
        ]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        // Both share the same preferred-label fallback grouping in a
        // pathological taxonomy, but as calc children neither may be
        // unified with the other.
        let a = normalizer.normalize("DeferredTaxAssetsOther", false, "monetary", true, false);
        let b = normalizer.normalize("DeferredTaxAssetsInventory", false, "monetary", true, false);
        assert_ne!(a, b);
    }

    #[test]
    fn top_level_total_is_exempt_from_calc_child_forcing() {
        let index = index_with(vec![("Assets", meta(false, "monetary", vec![]))]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        // Assets is a canonical top-level total: even if it were
        // (incorrectly) flagged as a calc child, is_top_level_total=true
        // exempts it and it still resolves through the explicit table.
        assert_eq!(normalizer.normalize("Assets", false, "monetary", true, true), "total_assets");
    }

    #[test]
    fn abstract_concept_with_no_other_rule_gets_section_header_suffix() {
        let index = index_with(vec![("SomeSectionAbstract", meta(true, "string", vec![]))]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        assert_eq!(
            normalizer.normalize("SomeSectionAbstract", true, "string", false, false),
            "some_section_abstract_section_header"
        );
    }

    #[rstest]
    #[case("Revenues", false, "monetary", false, true)]
    #[case("SomeUnseenDetailConcept", false, "monetary", false, false)]
    fn normalize_is_idempotent(
        #[case] concept: &str,
        #[case] is_abstract: bool,
        #[case] data_type: &str,
        #[case] is_calc_child: bool,
        #[case] is_top_level_total: bool,
    ) {
        let index = index_with(vec![(concept, meta(is_abstract, data_type, vec![]))]);
        let groups = EquivalenceGroups::build(&index);
        let normalizer = Normalizer::new(&index, &groups);

        let first = normalizer.normalize(concept, is_abstract, data_type, is_calc_child, is_top_level_total);
        let second = normalizer.normalize(concept, is_abstract, data_type, is_calc_child, is_top_level_total);
        assert_eq!(first, second);
    }
}
