use std::collections::HashSet;

use crate::rules::SimilarityRules;

/// Decides whether two street names are aliases of the same street.
///
/// This is a heuristic. Near-identical names with a spelling drift in more
/// than one word can slip through as distinct, and genuinely different
/// streets sharing generic words (or one name contained in the other, e.g.
/// "הרצל" and "הרצל הקטן") are treated as the same street.
pub struct NameSimilarity<'a> {
    rules: &'a SimilarityRules,
    prefixes: Vec<String>,
}

impl<'a> NameSimilarity<'a> {
    pub fn new(rules: &'a SimilarityRules) -> Self {
        Self {
            rules,
            prefixes: rules
                .qualifier_prefixes
                .iter()
                .map(|prefix| prefix.to_lowercase())
                .collect(),
        }
    }

    /// Lowercases, strips at most one leading qualifier and splits on whitespace.
    pub fn normalize(&self, name: &str) -> HashSet<String> {
        let name = name.to_lowercase();
        let name = self
            .prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))
            .unwrap_or(&name);

        name.split_whitespace().map(|word| word.to_string()).collect()
    }

    pub fn are_similar(&self, name_a: &str, name_b: &str) -> bool {
        let words_a = self.normalize(name_a);
        let words_b = self.normalize(name_b);

        if self.rules.subset_is_similar
            && (words_a.is_subset(&words_b) || words_b.is_subset(&words_a))
        {
            return true;
        }

        if words_a.is_empty() || words_b.is_empty() {
            return false;
        }
        let common = words_a.intersection(&words_b).count();
        let max_len = words_a.len().max(words_b.len());

        common as f64 / max_len as f64 > self.rules.overlap_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_prefix_is_stripped() {
        let rules = SimilarityRules::default();
        let similarity = NameSimilarity::new(&rules);

        assert_eq!(
            similarity.normalize("רחוב הרצל"),
            HashSet::from(["הרצל".to_string()])
        );
        assert_eq!(
            similarity.normalize("שד' בן גוריון"),
            HashSet::from(["בן".to_string(), "גוריון".to_string()])
        );
        // only leading qualifiers count
        assert_eq!(
            similarity.normalize("הרצל רחוב"),
            HashSet::from(["הרצל".to_string(), "רחוב".to_string()])
        );
    }

    #[test]
    fn only_one_qualifier_is_stripped() {
        let rules = SimilarityRules::default();
        let similarity = NameSimilarity::new(&rules);

        assert_eq!(
            similarity.normalize("דרך רחוב יפו"),
            HashSet::from(["רחוב".to_string(), "יפו".to_string()])
        );
    }

    #[test]
    fn lowercases_and_splits() {
        let rules = SimilarityRules {
            qualifier_prefixes: vec!["Street ".to_string()],
            ..SimilarityRules::default()
        };
        let similarity = NameSimilarity::new(&rules);

        assert_eq!(
            similarity.normalize("STREET  King   George"),
            HashSet::from(["king".to_string(), "george".to_string()])
        );
    }

    #[test]
    fn subset_names_are_similar() {
        let rules = SimilarityRules::default();
        let similarity = NameSimilarity::new(&rules);

        assert!(similarity.are_similar("רחוב הרצל", "הרצל"));
        assert!(similarity.are_similar("הרצל", "רחוב הרצל"));
        assert!(similarity.are_similar("בן גוריון", "גוריון בן"));
        assert!(similarity.are_similar("דוד בן גוריון", "שדרות בן גוריון"));
    }

    #[test]
    fn distinct_names_are_not_similar() {
        let rules = SimilarityRules::default();
        let similarity = NameSimilarity::new(&rules);

        assert!(!similarity.are_similar("הרצל", "ויצמן"));
        assert!(!similarity.are_similar("Alpha", "Beta"));
        // 1 common word of 2 is below the 0.7 overlap
        assert!(!similarity.are_similar("Alpha Road", "Beta Road"));
    }

    #[test]
    fn overlap_above_threshold_is_similar() {
        let rules = SimilarityRules::default();
        let similarity = NameSimilarity::new(&rules);

        // 3 of 4 words shared, 0.75 > 0.7
        assert!(similarity.are_similar("a b c d", "a b c e"));
        // 2 of 3 words shared, 0.666 is not above 0.7
        assert!(!similarity.are_similar("a b c", "a b d"));
    }

    #[test]
    fn overlap_threshold_is_strict() {
        let rules = SimilarityRules {
            overlap_threshold: 0.5,
            ..SimilarityRules::default()
        };
        let similarity = NameSimilarity::new(&rules);

        assert!(!similarity.are_similar("Alpha Road", "Beta Road"));
        assert!(similarity.are_similar("a b c", "a b d"));
    }

    #[test]
    fn subset_rule_can_be_disabled() {
        let rules = SimilarityRules {
            subset_is_similar: false,
            ..SimilarityRules::default()
        };
        let similarity = NameSimilarity::new(&rules);

        // 1 of 2 words, not above 0.7
        assert!(!similarity.are_similar("הרצל", "הרצל הקטן"));
        // identical word sets still overlap fully
        assert!(similarity.are_similar("רחוב הרצל", "הרצל"));
    }
}
