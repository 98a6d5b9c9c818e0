//! Stage D: Report-Type Extractor (spec.md §4.D). The hardest stage: it
//! reconstructs the report-type phrase from dictionary keywords instead of
//! matching a single regex, because the surrounding separators (`,`, `&`,
//! `and`, `-`) are themselves noise that must never survive into the
//! reconstructed phrase.

use std::collections::{HashMap, HashSet};

use regex::Regex as StdRegex;

use crate::model::{DictionarySubtype, MarketType, PatternRecord, ReportTypeExtraction};
use crate::normalize::{clean_residual, collapse_whitespace, remove_span};
use crate::pattern_library::PatternLibrary;

static WORD: once_cell::sync::Lazy<StdRegex> =
    once_cell::sync::Lazy::new(|| StdRegex::new(r"[A-Za-z]+").unwrap());

/// Tokenizes a gap into words and the punctuation separator characters the
/// word regex alone would skip over, so `classify_gap` can see `,`/`&`/`-`
/// as first-class tokens rather than invisible gaps between word matches.
static GAP_TOKEN: once_cell::sync::Lazy<StdRegex> =
    once_cell::sync::Lazy::new(|| StdRegex::new(r"[A-Za-z]+|[,&\-]").unwrap());

/// The report-type dictionary, flattened out of the library's
/// `report_type_dictionary` records for fast case-insensitive lookup.
struct Dictionary {
    primary_lower: HashSet<String>,
    secondary_lower: HashSet<String>,
    canonical: HashMap<String, String>,
    separators_lower: HashSet<String>,
}

impl Dictionary {
    fn load(library: &PatternLibrary) -> Self {
        let primary = library.dictionary(DictionarySubtype::PrimaryKeyword);
        let secondary = library.dictionary(DictionarySubtype::SecondaryKeyword);
        let seps = library.dictionary(DictionarySubtype::Separator);

        let mut canonical = HashMap::new();
        let mut primary_lower = HashSet::new();
        for term in &primary {
            primary_lower.insert(term.to_lowercase());
            canonical.insert(term.to_lowercase(), term.to_string());
        }
        let mut secondary_lower = HashSet::new();
        for term in &secondary {
            secondary_lower.insert(term.to_lowercase());
            canonical.insert(term.to_lowercase(), term.to_string());
        }
        let separators_lower = seps.iter().map(|s| s.to_lowercase()).collect();

        Self {
            primary_lower,
            secondary_lower,
            canonical,
            separators_lower,
        }
    }

    fn is_keyword(&self, lower: &str) -> bool {
        self.primary_lower.contains(lower) || self.secondary_lower.contains(lower)
    }

    fn is_secondary(&self, lower: &str) -> bool {
        self.secondary_lower.contains(lower)
    }

    fn canonical_of(&self, lower: &str) -> &str {
        self.canonical.get(lower).map(String::as_str).unwrap_or(lower)
    }
}

#[derive(Debug, Clone)]
struct KeywordOccurrence {
    start: usize,
    end: usize,
    canonical: String,
    is_primary: bool,
}

fn locate_keywords(text: &str, dict: &Dictionary) -> Vec<KeywordOccurrence> {
    WORD.find_iter(text)
        .filter_map(|m| {
            let lower = m.as_str().to_lowercase();
            if dict.is_keyword(&lower) {
                Some(KeywordOccurrence {
                    start: m.start(),
                    end: m.end(),
                    canonical: dict.canonical_of(&lower).to_string(),
                    is_primary: dict.primary_lower.contains(&lower),
                })
            } else {
                None
            }
        })
        .collect()
}

fn is_acronym_shape(tok: &str) -> bool {
    (2..=6).contains(&tok.chars().count()) && tok.chars().all(|c| c.is_ascii_uppercase())
}

enum GapKind {
    Transparent,
    AcronymRescue(String),
    Blocking,
}

/// Classify the text strictly between two included keyword occurrences. A
/// gap is transparent if it contains only separator tokens/whitespace; it
/// rescues an acronym if it contains exactly one non-separator token shaped
/// like a 2-6 letter acronym (spec.md §4.D.2 step 5); otherwise it blocks
/// the chain (spec.md §4.D.2 step 2). Also returns, in order, the separator
/// tokens actually seen in the gap.
fn classify_gap(gap: &str, dict: &Dictionary) -> (GapKind, Vec<String>) {
    let mut acronym: Option<String> = None;
    let mut separators = Vec::new();
    for m in GAP_TOKEN.find_iter(gap) {
        let tok = m.as_str();
        if dict.separators_lower.contains(&tok.to_lowercase()) {
            separators.push(tok.to_string());
            continue;
        }
        if acronym.is_none() && is_acronym_shape(tok) {
            acronym = Some(tok.to_string());
            continue;
        }
        return (GapKind::Blocking, separators);
    }
    match acronym {
        Some(a) => (GapKind::AcronymRescue(a), separators),
        None => (GapKind::Transparent, separators),
    }
}

struct Chain {
    included: Vec<usize>,
    acronym: Option<String>,
    separators: Vec<String>,
    /// Byte offset, relative to the text the occurrences were located in,
    /// one past the last included keyword.
    end: usize,
}

fn build_chain(text: &str, occurrences: &[KeywordOccurrence], anchor_idx: usize, dict: &Dictionary) -> Chain {
    let mut included = vec![anchor_idx];
    let mut acronym = None;
    let mut separators = Vec::new();
    let mut cur_end = occurrences[anchor_idx].end;
    let mut i = anchor_idx + 1;

    while i < occurrences.len() {
        let gap = &text[cur_end..occurrences[i].start];
        match classify_gap(gap, dict) {
            (GapKind::Transparent, seps) => {
                separators.extend(seps);
                included.push(i);
                cur_end = occurrences[i].end;
                i += 1;
            }
            (GapKind::AcronymRescue(a), seps) => {
                if acronym.is_some() {
                    break;
                }
                acronym = Some(a);
                separators.extend(seps);
                included.push(i);
                cur_end = occurrences[i].end;
                i += 1;
            }
            (GapKind::Blocking, _) => break,
        }
    }

    Chain { included, acronym, separators, end: cur_end }
}

fn join_canonical(occurrences: &[KeywordOccurrence], included: &[usize]) -> String {
    included
        .iter()
        .map(|&i| occurrences[i].canonical.clone())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Standard workflow (spec.md §4.D.2): anchor on the primary keyword
/// ("Market"); if it's absent but secondary keywords exist, anchor on the
/// first one at reduced confidence (spec.md §9's open question: "Market"
/// alone, or a secondary-only phrase, is still a valid report type).
fn extract_standard(title: &str, dict: &Dictionary) -> (ReportTypeExtraction, String) {
    let occurrences = locate_keywords(title, dict);
    if occurrences.is_empty() {
        return (
            ReportTypeExtraction { confidence: 0.0, ..Default::default() },
            title.to_string(),
        );
    }

    let primary_idx = occurrences.iter().position(|o| o.is_primary);
    let (anchor_idx, confidence) = match primary_idx {
        Some(idx) => (idx, 1.0),
        None => (0, 0.6),
    };

    let chain = build_chain(title, &occurrences, anchor_idx, dict);
    let report_type = join_canonical(&occurrences, &chain.included);
    let span = (occurrences[anchor_idx].start, chain.end);

    let removed = remove_span(title, span);
    let cleaned = clean_residual(&removed);
    let new_title = match &chain.acronym {
        Some(acr) => collapse_whitespace(&format!("{cleaned} ({acr})")),
        None => cleaned,
    };

    let keyword_positions = chain.included.iter().map(|&i| (occurrences[i].start, occurrences[i].end)).collect();
    let keywords_found = chain.included.iter().map(|&i| occurrences[i].canonical.clone()).collect();

    (
        ReportTypeExtraction {
            report_type,
            keywords_found,
            keyword_positions,
            separators: chain.separators,
            market_boundary_detected: primary_idx.is_some(),
            extracted_acronym: chain.acronym,
            confidence,
            matched_pattern: Some("standard_workflow".to_string()),
            notes: vec![],
        },
        new_title,
    )
}

/// Market-aware workflow (spec.md §4.D.3): carve `Market <q> X` out of the
/// title, keep `q X` in the residual for the topic stage, and reconstruct
/// the trailing keyword chain into `report_type` with "Market" prepended.
fn extract_market_aware(title: &str, qualifier: &str, dict: &Dictionary) -> (ReportTypeExtraction, String) {
    let marker = StdRegex::new(&format!(r"(?i)\bMarket\s+{}\b", regex::escape(qualifier))).unwrap();
    let Some(m) = marker.find(title) else {
        return (
            ReportTypeExtraction { confidence: 0.0, ..Default::default() },
            title.to_string(),
        );
    };

    let after = &title[m.end()..];
    let ws_len = after.len() - after.trim_start().len();
    let x_start = m.end() + ws_len;

    let tail_occurrences = locate_keywords(&title[x_start..], dict);
    let cut = tail_occurrences.iter().find(|o| dict.is_secondary(&o.canonical.to_lowercase()));

    let x_end_rel = cut.map(|o| o.start).unwrap_or(title.len() - x_start);
    let x_raw = &title[x_start..x_start + x_end_rel];
    let x_trimmed = x_raw.trim().trim_end_matches(',').trim();

    let prefix = title[..m.start()].trim();
    let residual_head = collapse_whitespace(&format!("{prefix} {qualifier} {x_trimmed}"));

    let (report_type, acronym, chain_end_rel, separators) = match cut {
        None => ("Market".to_string(), None, x_end_rel, vec![]),
        Some(_) => {
            let suffix = &title[x_start + x_end_rel..];
            let suffix_occ = locate_keywords(suffix, dict);
            if suffix_occ.is_empty() {
                ("Market".to_string(), None, x_end_rel, vec![])
            } else {
                let chain = build_chain(suffix, &suffix_occ, 0, dict);
                let rt = join_canonical(&suffix_occ, &chain.included);
                (format!("Market {rt}"), chain.acronym, x_end_rel + chain.end, chain.separators)
            }
        }
    };

    let leftover = title[x_start + chain_end_rel..].trim();
    let mut new_title = if leftover.is_empty() {
        residual_head
    } else {
        collapse_whitespace(&format!("{residual_head} {leftover}"))
    };
    new_title = clean_residual(&new_title);
    if let Some(acr) = &acronym {
        new_title = collapse_whitespace(&format!("{new_title} ({acr})"));
    }

    (
        ReportTypeExtraction {
            report_type,
            keywords_found: vec![],
            keyword_positions: vec![],
            separators,
            market_boundary_detected: true,
            extracted_acronym: acronym,
            confidence: 1.0,
            matched_pattern: Some(format!("market_aware:{qualifier}")),
            notes: vec![format!("qualifier object: {x_trimmed}")],
        },
        new_title,
    )
}

/// Run the report-type extraction stage, dispatching on the market-type
/// flag carried forward from stage B.
pub fn extract(title: &str, market_type: MarketType, library: &PatternLibrary) -> (ReportTypeExtraction, String) {
    let dict = Dictionary::load(library);
    match market_type.qualifier() {
        Some(q) => extract_market_aware(title, q, &dict),
        None => extract_standard(title, &dict),
    }
}

/// Convenience constructor for seeding a `report_type_dictionary` record in
/// tests and fixtures.
pub fn dictionary_record(term: &str, subtype: DictionarySubtype) -> PatternRecord {
    PatternRecord {
        pattern_type: crate::model::PatternType::ReportTypeDictionary,
        term: term.to_string(),
        aliases: vec![],
        archived_aliases: vec![],
        pattern: None,
        priority: 0,
        active: true,
        subtype: Some(subtype),
        format_type: None,
        success_count: 0,
        failure_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern_library::InMemoryPatternSource;

    fn library() -> PatternLibrary {
        use DictionarySubtype::*;
        let records = vec![
            dictionary_record("Market", PrimaryKeyword),
            dictionary_record("Size", SecondaryKeyword),
            dictionary_record("Share", SecondaryKeyword),
            dictionary_record("Report", SecondaryKeyword),
            dictionary_record("Analysis", SecondaryKeyword),
            dictionary_record("Growth", SecondaryKeyword),
            dictionary_record("Industry", SecondaryKeyword),
            dictionary_record(",", Separator),
            dictionary_record("&", Separator),
            dictionary_record("and", Separator),
            dictionary_record("-", Separator),
        ];
        PatternLibrary::load(&InMemoryPatternSource::new(records)).unwrap()
    }

    #[test]
    fn standard_workflow_joins_contiguous_keywords() {
        let lib = library();
        let dict = Dictionary::load(&lib);
        let (rt, title) = extract_standard("U.S. And Europe Digital Pathology Market Size, Share Report", &dict);
        assert_eq!(rt.report_type, "Market Size Share Report");
        assert_eq!(rt.separators, vec![","]);
        assert_eq!(title, "U.S. And Europe Digital Pathology");
    }

    #[test]
    fn acronym_embedded_variant_rescues_chain() {
        let lib = library();
        let dict = Dictionary::load(&lib);
        let (rt, title) = extract_standard("Directed Energy Weapons Market Size, DEW Industry Report", &dict);
        assert_eq!(rt.report_type, "Market Size Industry Report");
        assert_eq!(rt.extracted_acronym.as_deref(), Some("DEW"));
        assert_eq!(rt.separators, vec![","]);
        assert_eq!(title, "Directed Energy Weapons (DEW)");
    }

    #[test]
    fn market_aware_preserves_ampersand_in_qualifier_object() {
        let lib = library();
        let dict = Dictionary::load(&lib);
        let (rt, title) = extract_market_aware(
            "Sulfur, Arsine, and Mercury Remover Market in Oil & Gas Industry",
            "in",
            &dict,
        );
        assert_eq!(rt.report_type, "Market Industry");
        assert_eq!(title, "Sulfur, Arsine, and Mercury Remover in Oil & Gas");
    }

    #[test]
    fn market_aware_rebuilds_report_type_with_market_prefix() {
        let lib = library();
        let dict = Dictionary::load(&lib);
        let (rt, title) = extract_market_aware(
            "Carbon Black Market For Textile Fibers Growth Report",
            "for",
            &dict,
        );
        assert_eq!(rt.report_type, "Market Growth Report");
        assert!(rt.separators.is_empty());
        assert_eq!(title, "Carbon Black for Textile Fibers");
    }

    #[test]
    fn no_keyword_present_is_empty_not_an_error() {
        let lib = library();
        let dict = Dictionary::load(&lib);
        let (rt, title) = extract_standard("A Title With No Dictionary Words At All", &dict);
        assert_eq!(rt.report_type, "");
        assert_eq!(rt.confidence, 0.0);
        assert_eq!(title, "A Title With No Dictionary Words At All");
    }
}
