//! The shared data model: pattern records and the per-stage result types
//! that flow through the pipeline (spec.md §3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The five pattern kinds the library groups records by. Priority and
/// ordering are only ever compared within one `PatternType` — across types
/// priority is meaningless (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    GeographicEntity,
    MarketTerm,
    DatePattern,
    ReportType,
    ReportTypeDictionary,
}

/// Dictionary subtype, only meaningful for `ReportTypeDictionary` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionarySubtype {
    PrimaryKeyword,
    SecondaryKeyword,
    Separator,
    BoundaryMarker,
}

/// Metadata describing how a report-type pattern is shaped. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    TerminalType,
    EmbeddedType,
    PrefixType,
    CompoundType,
    AcronymEmbedded,
}

/// One entry in the pattern library, identified by `(type, term)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub term: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub archived_aliases: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub subtype: Option<DictionarySubtype>,
    #[serde(default)]
    pub format_type: Option<FormatType>,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
}

fn default_active() -> bool {
    true
}

impl PatternRecord {
    /// All surface forms a matcher should consider: the canonical term plus
    /// live aliases. `archived_aliases` are deliberately excluded — they are
    /// quarantined for audit only (spec.md §4.A, §9).
    pub fn live_surface_forms(&self) -> Vec<&str> {
        let mut forms = vec![self.term.as_str()];
        forms.extend(self.aliases.iter().map(String::as_str));
        forms
    }
}

/// `market_type` classification produced by stage B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Standard,
    MarketFor,
    MarketIn,
    MarketBy,
}

impl Default for MarketType {
    fn default() -> Self {
        MarketType::Standard
    }
}

impl MarketType {
    /// The qualifier word a market-aware type carries (`for`/`in`/`by`), or
    /// `None` for `Standard`.
    pub fn qualifier(&self) -> Option<&'static str> {
        match self {
            MarketType::Standard => None,
            MarketType::MarketFor => Some("for"),
            MarketType::MarketIn => Some("in"),
            MarketType::MarketBy => Some("by"),
        }
    }
}

/// A half-open `[start, end)` byte-offset span into the title being
/// processed at the time it was recorded. Spans are only ever compared
/// within the same title snapshot.
pub type Span = (usize, usize);

/// Stage B's output. This stage never removes text from the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketClassification {
    pub market_type: MarketType,
    pub matched_pattern: Option<String>,
    pub confidence: f32,
    pub notes: Vec<String>,
}

/// Stage C's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateExtraction {
    pub range: Option<String>,
    pub raw_match: Option<String>,
    pub format_type: Option<String>,
    pub preserved_words: Option<String>,
    pub confidence: f32,
    pub matched_pattern: Option<String>,
    pub notes: Vec<String>,
}

/// Stage D's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportTypeExtraction {
    pub report_type: String,
    pub keywords_found: Vec<String>,
    pub keyword_positions: Vec<Span>,
    pub separators: Vec<String>,
    pub market_boundary_detected: bool,
    pub extracted_acronym: Option<String>,
    pub confidence: f32,
    pub matched_pattern: Option<String>,
    pub notes: Vec<String>,
}

/// Stage E's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoExtraction {
    pub regions: Vec<String>,
    pub confidence: f32,
    pub matched_pattern: Option<String>,
    pub notes: Vec<String>,
}

/// Stage F's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicExtraction {
    pub topic: String,
    pub normalized_topic: String,
    pub confidence: f32,
    pub notes: Vec<String>,
}

/// The final record a caller receives, matching spec.md §6's output
/// contract one field at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub original_title: String,
    pub market_type: MarketType,
    pub extracted_date_range: Option<String>,
    pub extracted_report_type: String,
    pub extracted_regions: Vec<String>,
    pub extracted_acronym: Option<String>,
    pub topic: String,
    pub normalized_topic: String,
    pub confidence_by_stage: HashMap<String, f32>,
    pub notes: Vec<String>,
}

/// Best-effort, in-memory accounting of which pattern identifiers fired
/// during one pipeline run (spec.md §3's `success_count`/`failure_count`
/// fields, realized as a per-run accumulator rather than a live-mutated
/// counter on the read-only library). Never persisted by this crate —
/// feeding it back into the pattern store is the curation workflow's job,
/// not the core's (spec.md §1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternUsageStats {
    pub matched_patterns: Vec<String>,
}
