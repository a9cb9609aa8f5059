//! Preferred-label resolution: the taxonomy label linkbase wins
//! when a filer-facing label is available; otherwise a generic
//! concept-name humanisation table fills the gap.

use finsight_xbrl::linkbase::LinkbaseLabel;

const PREFERRED_ROLE_SUFFIX: &str = "preferredLabel";

/// Resolves the display label for `concept_name`, preferring a
/// `preferredLabel`-role entry in `labels`, then any label for that
/// concept, then a humanized rendering of the concept's own PascalCase
/// name.
pub fn resolve_preferred_label(concept_name: &str, labels: &[LinkbaseLabel]) -> String {
    let mut fallback: Option<&str> = None;
    for label in labels.iter().filter(|l| l.concept_qname == concept_name) {
        if label.role.ends_with(PREFERRED_ROLE_SUFFIX) {
            return label.label.clone();
        }
        if fallback.is_none() {
            fallback = Some(label.label.as_str());
        }
    }

    fallback.map(str::to_string).unwrap_or_else(|| humanize(concept_name))
}

/// Splits a PascalCase concept name into title-cased words: `AssetsCurrent`
/// becomes `Assets Current`. The last resort when no taxonomy label
/// exists at all.
fn humanize(concept_name: &str) -> String {
    let mut words = String::new();
    for (i, ch) in concept_name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() && !concept_name.chars().nth(i - 1).is_some_and(char::is_uppercase) {
            words.push(' ');
        }
        words.push(ch);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(concept_qname: &str, label: &str, role: &str) -> LinkbaseLabel {
        LinkbaseLabel {
            concept_qname: concept_qname.to_string(),
            label: label.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn prefers_a_preferred_label_role_entry() {
        let labels = vec![
            label("Assets", "Total assets", "http://www.xbrl.org/2003/role/label"),
            label("Assets", "Assets, total", "http://www.xbrl.org/2003/role/preferredLabel"),
        ];
        assert_eq!(resolve_preferred_label("Assets", &labels), "Assets, total");
    }

    #[test]
    fn falls_back_to_any_label_for_the_concept() {
        let labels = vec![label("Assets", "Total assets", "http://www.xbrl.org/2003/role/label")];
        assert_eq!(resolve_preferred_label("Assets", &labels), "Total assets");
    }

    #[test]
    fn falls_back_to_humanized_concept_name_when_no_label_exists() {
        assert_eq!(resolve_preferred_label("AssetsCurrent", &[]), "Assets Current");
    }
}
