//! Component A: the Pattern Library (spec.md §4.A).
//!
//! Loads active patterns once from a [`PatternSource`], groups them by
//! [`PatternType`], sorts each group by priority ascending then by term
//! length descending, and exposes the result read-only. Regex objects are
//! compiled once at load time and reused for every title.

mod source;
mod synthesis;

pub use source::{InMemoryPatternSource, JsonFilePatternSource, PatternSource};
pub use synthesis::synthesize;

use std::collections::{HashMap, HashSet};

use fancy_regex::Regex;

use crate::error::PatternLibraryError;
use crate::model::{DictionarySubtype, PatternRecord, PatternType};

/// A pattern record plus its compiled matcher.
pub struct CompiledPattern {
    pub record: PatternRecord,
    pub regex: Regex,
}

/// The read-only, immutable handle every pipeline stage is constructed
/// with. Safe to share across threads processing different titles
/// concurrently (spec.md §5): nothing here is ever mutated after `load`.
pub struct PatternLibrary {
    by_type: HashMap<PatternType, Vec<CompiledPattern>>,
    dictionary: HashMap<DictionarySubtype, HashSet<String>>,
}

impl PatternLibrary {
    /// Load and validate all active patterns from `source`. A record whose
    /// pattern fails to compile is logged at `warn` and dropped; this never
    /// aborts the load (spec.md §4.A, §7). Returns a config error only if
    /// the source itself is unreachable/malformed, or a *required* type
    /// ends up with zero active, compiling patterns.
    pub fn load(source: &dyn PatternSource) -> Result<Self, PatternLibraryError> {
        let records = source.load_active()?;

        let mut by_type: HashMap<PatternType, Vec<CompiledPattern>> = HashMap::new();
        let mut dictionary: HashMap<DictionarySubtype, HashSet<String>> = HashMap::new();

        for record in records {
            if let Some(subtype) = record.subtype {
                dictionary
                    .entry(subtype)
                    .or_default()
                    .insert(record.term.clone());
            }

            let pattern_src = synthesis::pattern_source_for(&record);
            match Regex::new(&format!("(?i){pattern_src}")) {
                Ok(regex) => {
                    by_type
                        .entry(record.pattern_type)
                        .or_default()
                        .push(CompiledPattern { record, regex });
                }
                Err(err) => {
                    tracing::warn!(
                        term = %record.term,
                        pattern_type = ?record.pattern_type,
                        error = %err,
                        "dropping pattern record: regex failed to compile"
                    );
                }
            }
        }

        for group in by_type.values_mut() {
            group.sort_by(|a, b| {
                a.record
                    .priority
                    .cmp(&b.record.priority)
                    .then_with(|| b.record.term.len().cmp(&a.record.term.len()))
            });
        }

        Ok(Self { by_type, dictionary })
    }

    /// The compiled patterns of `pattern_type`, in priority/length order.
    /// Empty slice if none are active and compiling.
    pub fn patterns(&self, pattern_type: PatternType) -> &[CompiledPattern] {
        self.by_type
            .get(&pattern_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The dictionary terms tagged with `subtype` (e.g. all secondary
    /// keywords). Empty set if none were loaded.
    pub fn dictionary(&self, subtype: DictionarySubtype) -> HashSet<&str> {
        self.dictionary
            .get(&subtype)
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Fail loudly if a required type has no usable (compiling, active)
    /// patterns. Callers that need a type to be non-empty — e.g. the CLI
    /// refusing to start without any `market_term` patterns — call this
    /// explicitly; `load` itself never enforces it, since an empty
    /// `geographic_entity` set is a legitimate (if impoverished) library.
    pub fn require_nonempty(&self, pattern_type: PatternType, name: &'static str) -> Result<(), PatternLibraryError> {
        if self.patterns(pattern_type).is_empty() {
            Err(PatternLibraryError::EmptyRequiredType(name))
        } else {
            Ok(())
        }
    }
}
