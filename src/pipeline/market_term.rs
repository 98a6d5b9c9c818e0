//! Stage B: Market-Term Classifier (spec.md §4.B).
//!
//! Decides whether the title contains a market-qualifier phrase and which
//! one. Never removes text — the title is passed through unchanged.

use crate::model::{MarketClassification, MarketType, PatternType};
use crate::pattern_library::PatternLibrary;

fn qualifier_of(term: &str) -> Option<MarketType> {
    let lower = term.to_lowercase();
    if lower.contains("for") {
        Some(MarketType::MarketFor)
    } else if lower.contains("in") {
        Some(MarketType::MarketIn)
    } else if lower.contains("by") {
        Some(MarketType::MarketBy)
    } else {
        None
    }
}

/// Classify `title` against the library's `market_term` patterns. Patterns
/// are tried in priority order (as sorted by the library); the first one
/// that matches wins.
pub fn classify(title: &str, library: &PatternLibrary) -> MarketClassification {
    for compiled in library.patterns(PatternType::MarketTerm) {
        match compiled.regex.find(title) {
            Ok(Some(m)) => {
                let Some(market_type) = qualifier_of(&compiled.record.term) else {
                    continue;
                };
                return MarketClassification {
                    market_type,
                    matched_pattern: Some(m.as_str().to_string()),
                    confidence: 1.0,
                    notes: vec![],
                };
            }
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(term = %compiled.record.term, error = %err, "market-term regex failed during scan");
                continue;
            }
        }
    }

    MarketClassification {
        market_type: MarketType::Standard,
        matched_pattern: None,
        confidence: 1.0,
        notes: vec!["no market-term pattern matched, defaulting to standard".to_string()],
    }
}
