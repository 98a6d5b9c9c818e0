//! Stage E: Geographic-Entity Detector (spec.md §4.E).
//!
//! Matches library `geographic_entity` patterns against the title, rejects
//! any match that would attach to a hyphenated word, resolves overlaps by
//! preferring the longer match, and folds runs of matches joined by a
//! regional separator (`and`, `&`, `+`, `plus`) into a single removed span.

use once_cell::sync::Lazy;
use regex::Regex as StdRegex;

use crate::model::{GeoExtraction, PatternType};
use crate::normalize::{collapse_whitespace, drop_doubled_punctuation, remove_span};
use crate::pattern_library::PatternLibrary;

static REGIONAL_SEPARATOR: Lazy<StdRegex> =
    Lazy::new(|| StdRegex::new(r"(?i)^\s*(?:and|&|\+|plus)\s*$").unwrap());

struct GeoMatch {
    start: usize,
    end: usize,
    canonical: String,
    priority: i32,
}

/// Reject a match whose immediate left or right neighbor character in the
/// *original* title is `-` (spec.md §4.E.2): "De-identified" must not
/// surface "Delaware", "Co-operative" must not surface "Colorado".
fn hyphen_adjacent(title: &str, start: usize, end: usize) -> bool {
    let before = title[..start].chars().next_back();
    let after = title[end..].chars().next();
    before == Some('-') || after == Some('-')
}

fn collect_candidates(title: &str, library: &PatternLibrary) -> Vec<GeoMatch> {
    let mut candidates = Vec::new();
    for compiled in library.patterns(PatternType::GeographicEntity) {
        let mut offset = 0;
        loop {
            let slice = &title[offset..];
            if slice.is_empty() {
                break;
            }
            match compiled.regex.find(slice) {
                Ok(Some(m)) => {
                    let start = offset + m.start();
                    let end = offset + m.end();
                    if !hyphen_adjacent(title, start, end) {
                        candidates.push(GeoMatch {
                            start,
                            end,
                            canonical: compiled.record.term.clone(),
                            priority: compiled.record.priority,
                        });
                    }
                    offset = if end > offset { end } else { offset + 1 };
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(term = %compiled.record.term, error = %err, "geo regex failed during scan");
                    break;
                }
            }
        }
    }
    candidates
}

fn ranges_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Keep the longer match on overlap; ties broken by lower `priority`
/// (spec.md §4.E.3). Greedy longest-first acceptance implements this
/// directly: process candidates longest-first (ties by priority ascending),
/// accept unless it overlaps something already accepted.
fn resolve_overlaps(mut candidates: Vec<GeoMatch>) -> Vec<GeoMatch> {
    candidates.sort_by(|a, b| {
        let len_a = a.end - a.start;
        let len_b = b.end - b.start;
        len_b.cmp(&len_a).then(a.priority.cmp(&b.priority))
    });

    let mut accepted: Vec<GeoMatch> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|a| ranges_overlap((candidate.start, candidate.end), (a.start, a.end)));
        if !overlaps {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|m| m.start);
    accepted
}

struct Group {
    start: usize,
    end: usize,
    members: Vec<usize>,
}

/// Fold runs of accepted matches joined only by a regional separator into
/// one group, removed as a single contiguous span (spec.md §4.E "Regional
/// groups").
fn build_groups(title: &str, accepted: &[GeoMatch]) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < accepted.len() {
        let mut j = i;
        while j + 1 < accepted.len() {
            let gap = &title[accepted[j].end..accepted[j + 1].start];
            if REGIONAL_SEPARATOR.is_match(gap) {
                j += 1;
            } else {
                break;
            }
        }
        groups.push(Group {
            start: accepted[i].start,
            end: accepted[j].end,
            members: (i..=j).collect(),
        });
        i = j + 1;
    }
    groups
}

/// Run the geographic-entity detection stage.
pub fn extract(title: &str, library: &PatternLibrary) -> (GeoExtraction, String) {
    let candidates = collect_candidates(title, library);
    let accepted = resolve_overlaps(candidates);
    let groups = build_groups(title, &accepted);

    let regions: Vec<String> = groups
        .iter()
        .flat_map(|g| g.members.iter().map(|&i| accepted[i].canonical.clone()))
        .collect();

    let mut new_title = title.to_string();
    for g in groups.iter().rev() {
        new_title = remove_span(&new_title, (g.start, g.end));
    }
    new_title = collapse_whitespace(&drop_doubled_punctuation(&new_title));

    let confidence = if regions.is_empty() { 0.0 } else { 1.0 };
    let (matched_pattern, notes) = if accepted.is_empty() {
        (None, vec!["no geographic pattern matched".to_string()])
    } else {
        let terms = accepted.iter().map(|m| m.canonical.clone()).collect::<Vec<_>>().join(", ");
        (Some(terms), vec![])
    };

    (
        GeoExtraction {
            regions,
            confidence,
            matched_pattern,
            notes,
        },
        new_title,
    )
}
