//! Stage F: Topic Extractor and Normalizer (spec.md §4.F).
//!
//! Operates purely on the residual left after stages B-E; it owns no
//! patterns of its own, only the shared edge-artifact cleanup helpers.

use crate::model::TopicExtraction;
use crate::normalize::{
    balance_and_strip_empty_groups, collapse_whitespace, normalize_topic, strip_edge_separators,
    strip_orphan_prepositions,
};

/// Run the topic extraction stage on the residual title.
pub fn extract(residual: &str) -> TopicExtraction {
    let step1 = strip_edge_separators(residual);
    let step2 = strip_orphan_prepositions(&step1);
    let step3 = collapse_whitespace(&step2);
    let topic = balance_and_strip_empty_groups(&step3);

    let normalized_topic = normalize_topic(&topic);

    let mut notes = Vec::new();
    let confidence = if topic.is_empty() {
        notes.push("residual was empty after cleanup".to_string());
        0.0
    } else {
        1.0
    };

    TopicExtraction { topic, normalized_topic, confidence, notes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_orphan_preposition_at_start() {
        let t = extract("in Technology");
        assert_eq!(t.topic, "Technology");
    }

    #[test]
    fn strips_orphan_preposition_at_end() {
        let t = extract("Retail in");
        assert_eq!(t.topic, "Retail");
    }

    #[test]
    fn keeps_qualifier_preposition_in_the_middle() {
        let t = extract("Carbon Black for Textile Fibers");
        assert_eq!(t.topic, "Carbon Black for Textile Fibers");
    }

    #[test]
    fn empty_residual_is_not_an_error() {
        let t = extract("");
        assert_eq!(t.topic, "");
        assert_eq!(t.confidence, 0.0);
        assert!(!t.notes.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let t = extract("Digital Pathology");
        let twice = normalize_topic(&t.normalized_topic);
        assert_eq!(t.normalized_topic, twice);
    }
}
