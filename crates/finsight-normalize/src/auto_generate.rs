//! Deterministic label auto-generation (priority 5), the
//! fallback every concept ultimately resolves to when no curated or
//! derived equivalence applies.

use sha2::{Digest, Sha256};

/// Labels longer than this get an 8-hex-digit hash suffix rather than
/// being truncated blind, so two long names that agree on the first 48
/// characters still land on distinct labels.
const MAX_LABEL_LEN: usize = 48;

/// `CamelCase` -> `snake_case`, splitting both at lower-to-upper
/// boundaries and at the tail of an acronym run (`XBRLDocument` ->
/// `xbrl_document`).
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1);
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase()));
                if boundary {
                    out.push('_');
                }
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// "append an 8-hex-digit hash suffix if the generated label
/// exceeds the allowed length".
fn truncate_with_hash_suffix(label: &str) -> String {
    if label.len() <= MAX_LABEL_LEN {
        return label.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let suffix = hex::encode(&digest[..4]);
    let keep = MAX_LABEL_LEN - 1 - suffix.len();
    format!("{}_{}", &label[..keep], suffix)
}

/// Whether `concept_name`/`data_type` marks a text-block disclosure
/// concept (the XBRL convention for a footnote's full narrative body).
pub fn is_text_block(concept_name: &str, data_type: &str) -> bool {
    concept_name.ends_with("TextBlock") || data_type.ends_with(":textBlockItemType") || data_type == "textBlockItemType"
}

/// "Additional rules": abstract concepts get a `_section_header`
/// suffix; text-block concepts get `_note`/`_disclosure_note`.
pub fn auto_generate(concept_name: &str, is_abstract: bool, data_type: &str) -> String {
    let base = camel_to_snake(concept_name);

    let decorated = if is_abstract {
        format!("{base}_section_header")
    } else if is_text_block(concept_name, data_type) {
        if concept_name.contains("Disclosure") {
            format!("{base}_disclosure_note")
        } else {
            format!("{base}_note")
        }
    } else {
        base
    };

    truncate_with_hash_suffix(&decorated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_splits_on_case_boundaries() {
        assert_eq!(camel_to_snake("CashAndDueFromBanks"), "cash_and_due_from_banks");
        assert_eq!(camel_to_snake("AssetsCurrent"), "assets_current");
    }

    #[test]
    fn camel_case_splits_acronym_runs_at_their_tail() {
        assert_eq!(camel_to_snake("XBRLDocument"), "xbrl_document");
    }

    #[test]
    fn abstract_concepts_get_section_header_suffix() {
        assert_eq!(auto_generate("AssetsAbstract", true, "string"), "assets_abstract_section_header");
    }

    #[test]
    fn text_block_concepts_get_note_suffix() {
        assert_eq!(
            auto_generate("ScheduleOfAccountsReceivableTextBlock", false, "textBlockItemType"),
            "schedule_of_accounts_receivable_text_block_note"
        );
    }

    #[test]
    fn disclosure_text_blocks_get_disclosure_note_suffix() {
        assert_eq!(
            auto_generate("PensionDisclosureTextBlock", false, "textBlockItemType"),
            "pension_disclosure_text_block_disclosure_note"
        );
    }

    #[test]
    fn overlong_labels_get_hash_suffix_instead_of_blind_truncation() {
        let long_name = "ReallyExtraordinarilyLongConceptNameThatExceedsTheAllowedNormalizedLabelLength";
        let label = auto_generate(long_name, false, "monetary");
        assert!(label.len() <= MAX_LABEL_LEN);
        assert_eq!(label.len(), MAX_LABEL_LEN);
        assert!(label.contains('_'));
    }

    #[test]
    fn auto_generate_is_deterministic() {
        let a = auto_generate("SomeLongishConceptName", false, "monetary");
        let b = auto_generate("SomeLongishConceptName", false, "monetary");
        assert_eq!(a, b);
    }
}
