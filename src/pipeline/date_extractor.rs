//! Stage C: Date Extractor (spec.md §4.C).
//!
//! Tries `date_pattern` library entries in priority order; the first
//! successful match sets the extracted range. Handles the parenthetical
//! rescue case: if the match lives inside a `(...)` group, non-date content
//! either side of it is pulled out and re-appended to the title instead of
//! being discarded with the group.

use once_cell::sync::Lazy;
use regex::Regex as StdRegex;

use crate::model::{DateExtraction, PatternType};
use crate::normalize::{balance_and_strip_empty_groups, collapse_whitespace, remove_span, strip_edge_separators};
use crate::pattern_library::PatternLibrary;

/// Pulls the verbatim digit/separator core out of a raw match, so the
/// emitted `range` never carries surrounding words, brackets, or the
/// `FY`/`Q#` prefix — only the dash character is ever preserved as typed
/// (spec.md §6 "bit-exact format").
static NUMERIC_CORE: Lazy<StdRegex> = Lazy::new(|| {
    StdRegex::new(r"(?i)\d{4}(?:\s*(?:-|\u{2013}|\u{2014}|to|through)\s*\d{4})?").unwrap()
});

fn numeric_core(raw: &str) -> String {
    NUMERIC_CORE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Find the innermost `(...)` group strictly enclosing `span`, if any.
/// Returns the group's own span, `(open_idx, close_idx_exclusive)`.
fn enclosing_parens(title: &str, span: (usize, usize)) -> Option<(usize, usize)> {
    let bytes = title.as_bytes();
    let mut open_idx = None;
    let mut i = span.0;
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b')' => return None,
            b'(' => {
                open_idx = Some(i);
                break;
            }
            _ => {}
        }
    }
    let open_idx = open_idx?;

    let mut close_idx = None;
    let mut j = span.1;
    while j < bytes.len() {
        match bytes[j] {
            b'(' => return None,
            b')' => {
                close_idx = Some(j);
                break;
            }
            _ => {}
        }
        j += 1;
    }
    let close_idx = close_idx?;

    Some((open_idx, close_idx + 1))
}

/// Run the date-extraction stage.
pub fn extract(title: &str, library: &PatternLibrary) -> (DateExtraction, String) {
    for compiled in library.patterns(PatternType::DatePattern) {
        let found = match compiled.regex.find(title) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(term = %compiled.record.term, error = %err, "date regex failed during scan");
                continue;
            }
        };
        let Some(m) = found else { continue };

        let raw_match = m.as_str().to_string();
        let range = numeric_core(&raw_match);
        let span = (m.start(), m.end());

        let (new_title, preserved_words) = match enclosing_parens(title, span) {
            Some(paren_span) => {
                let group_inner = &title[paren_span.0 + 1..paren_span.1 - 1];
                let match_start_in_group = span.0 - (paren_span.0 + 1);
                let match_end_in_group = span.1 - (paren_span.0 + 1);
                let a = group_inner[..match_start_in_group].trim();
                let b = group_inner[match_end_in_group..].trim();
                let preserved = [a, b]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");

                let removed = remove_span(title, paren_span);
                let cleaned = balance_and_strip_empty_groups(&removed);
                let cleaned = strip_edge_separators(&cleaned);
                let rebuilt = if preserved.is_empty() {
                    cleaned
                } else {
                    collapse_whitespace(&format!("{cleaned} {preserved}"))
                };
                (rebuilt, if preserved.is_empty() { None } else { Some(preserved) })
            }
            None => {
                let removed = remove_span(title, span);
                let cleaned = balance_and_strip_empty_groups(&removed);
                let cleaned = strip_edge_separators(&cleaned);
                (cleaned, None)
            }
        };

        debug_assert!(
            !new_title.contains(&raw_match) || raw_match.chars().all(|c| c.is_ascii_digit()),
            "cleaned title must not retain the extracted date substring"
        );

        return (
            DateExtraction {
                range: Some(range),
                raw_match: Some(raw_match),
                format_type: Some(compiled.record.term.clone()),
                preserved_words,
                confidence: 1.0,
                matched_pattern: Some(compiled.record.term.clone()),
                notes: vec![],
            },
            new_title,
        );
    }

    (
        DateExtraction {
            notes: vec!["no date pattern matched".to_string()],
            ..Default::default()
        },
        title.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternRecord;
    use crate::pattern_library::InMemoryPatternSource;

    fn date_record(term: &str, pattern: &str, priority: i32) -> PatternRecord {
        PatternRecord {
            pattern_type: PatternType::DatePattern,
            term: term.into(),
            aliases: vec![],
            archived_aliases: vec![],
            pattern: Some(pattern.into()),
            priority,
            active: true,
            subtype: None,
            format_type: None,
            success_count: 0,
            failure_count: 0,
        }
    }

    fn library() -> PatternLibrary {
        let records = vec![
            date_record("bracketed_range", r"\[(\d{4})\s*(-|\u{2013}|\u{2014})\s*(\d{4})\]", 5),
            date_record("bracketed_year", r"\[(\d{4})\]", 6),
            date_record("year_range", r"(\d{4})\s*(-|\u{2013}|\u{2014})\s*(\d{4})", 10),
            date_record("year_range_word", r"(\d{4})\s+(to|through)\s+(\d{4})", 10),
            date_record("fiscal_year", r"(?:FY|Fiscal\s+Year)\s+(\d{4})", 20),
            date_record("quarter_year", r"Q[1-4]\s+(\d{4})", 21),
            date_record("terminal_comma_year", r",\s*(\d{4})\s*$", 90),
            date_record("standalone_year", r"(\d{4})", 100),
        ];
        PatternLibrary::load(&InMemoryPatternSource::new(records)).unwrap()
    }

    #[test]
    fn extracts_year_range_and_trailing_comma() {
        let lib = library();
        let (d, title) = extract(
            "APAC Personal Protective Equipment Market Analysis, 2024-2030",
            &lib,
        );
        assert_eq!(d.range.as_deref(), Some("2024-2030"));
        assert!(!title.contains("2024-2030"));
    }

    #[test]
    fn terminal_comma_year_wins_over_bare_year_when_no_range() {
        let lib = library();
        let (d, _title) = extract("Carbon Black Market For Textile Fibers Growth Report, 2020", &lib);
        assert_eq!(d.range.as_deref(), Some("2020"));
    }

    #[test]
    fn rescues_non_date_parenthetical_content() {
        let lib = library();
        let (d, title) = extract("Battery Fuel Gauge Market (Forecast 2020-2030)", &lib);
        assert_eq!(d.range.as_deref(), Some("2020-2030"));
        assert_eq!(d.preserved_words.as_deref(), Some("Forecast"));
        assert!(title.ends_with("Forecast"));
        assert!(!title.contains('('));
    }

    #[test]
    fn no_date_present_returns_empty_extraction() {
        let lib = library();
        let (d, title) = extract("Sulfur, Arsine, and Mercury Remover Market in Oil & Gas Industry", &lib);
        assert!(d.range.is_none());
        assert_eq!(title, "Sulfur, Arsine, and Mercury Remover Market in Oil & Gas Industry");
    }
}
