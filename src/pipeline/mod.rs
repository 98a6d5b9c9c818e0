//! The fixed, ordered five-stage pipeline (spec.md §2, §5, §9).
//!
//! Each stage is a plain function over `(title, PatternLibrary) -> (stage
//! result, new title)`; [`Pipeline`] is the component registry the
//! re-architecture guidance calls for, replacing the original's
//! dynamic sibling-module loading with a fixed, explicit list.

pub mod date_extractor;
pub mod geo_detector;
pub mod market_term;
pub mod report_type;
pub mod topic_extractor;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::model::{PatternUsageStats, PipelineOutput};
use crate::pattern_library::PatternLibrary;

/// Run `f`, catching a panic at the stage boundary and falling back to
/// `fallback` with a note (spec.md §7: "Stage internal exception"). A
/// correctly-authored stage never panics on any title; this exists so a
/// future regex-authoring mistake degrades a single stage instead of
/// losing the whole parse.
fn guarded<T>(stage: &str, notes: &mut Vec<String>, fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            notes.push(format!("{stage} raised an internal exception; returning empty extraction"));
            fallback
        }
    }
}

/// The five-stage pipeline, bound to a single immutable pattern library.
/// Stateless otherwise: `run` may be called concurrently from multiple
/// threads over the same `Pipeline` (spec.md §5).
pub struct Pipeline<'a> {
    library: &'a PatternLibrary,
}

impl<'a> Pipeline<'a> {
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self { library }
    }

    /// Run every stage in order (B -> C -> D -> E -> F) over `title`,
    /// producing the final output record. Always produces a result; never
    /// returns an `Err` (spec.md §7: "a parse is always produced").
    pub fn run(&self, title: &str) -> PipelineOutput {
        self.run_with_usage(title).0
    }

    /// Same as [`Pipeline::run`], plus the pattern-usage accumulator
    /// (spec.md §10 supplement).
    pub fn run_with_usage(&self, title: &str) -> (PipelineOutput, PatternUsageStats) {
        let mut notes = Vec::new();
        let mut confidence_by_stage = HashMap::new();

        let market = guarded("market_term", &mut notes, Default::default(), || {
            market_term::classify(title, self.library)
        });
        confidence_by_stage.insert("market_term".to_string(), market.confidence);
        notes.extend(market.notes.clone());

        let (date, after_date) = guarded("date", &mut notes, (Default::default(), title.to_string()), || {
            date_extractor::extract(title, self.library)
        });
        confidence_by_stage.insert("date".to_string(), date.confidence);
        notes.extend(date.notes.clone());

        let (report_type, after_report_type) = guarded(
            "report_type",
            &mut notes,
            (Default::default(), after_date.clone()),
            || report_type::extract(&after_date, market.market_type, self.library),
        );
        confidence_by_stage.insert("report_type".to_string(), report_type.confidence);
        notes.extend(report_type.notes.clone());

        let (geo, after_geo) = guarded(
            "geographic_entity",
            &mut notes,
            (Default::default(), after_report_type.clone()),
            || geo_detector::extract(&after_report_type, self.library),
        );
        confidence_by_stage.insert("geographic_entity".to_string(), geo.confidence);
        notes.extend(geo.notes.clone());

        let topic = guarded("topic", &mut notes, Default::default(), || {
            topic_extractor::extract(&after_geo)
        });
        confidence_by_stage.insert("topic".to_string(), topic.confidence);
        notes.extend(topic.notes.clone());

        let matched_patterns = [
            market.matched_pattern.clone(),
            date.matched_pattern.clone(),
            report_type.matched_pattern.clone(),
            geo.matched_pattern.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        let output = PipelineOutput {
            original_title: title.to_string(),
            market_type: market.market_type,
            extracted_date_range: date.range,
            extracted_report_type: report_type.report_type,
            extracted_regions: geo.regions,
            extracted_acronym: report_type.extracted_acronym,
            topic: topic.topic,
            normalized_topic: topic.normalized_topic,
            confidence_by_stage,
            notes,
        };

        (output, PatternUsageStats { matched_patterns })
    }
}
