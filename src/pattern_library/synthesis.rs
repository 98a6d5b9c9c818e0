//! Regex synthesis from a pattern record's `term`/`aliases` when no
//! explicit `pattern` is supplied (spec.md §4.A).

use once_cell::sync::Lazy;
use regex::Regex as StdRegex;

use crate::model::PatternRecord;

/// Splits a surface form on the three "flexible spacing" connectors,
/// keeping the separator identity, so each segment can be escaped
/// independently and the connector replaced with a whitespace-tolerant
/// regex fragment. Longest connector tried first so `" and "` doesn't get
/// shadowed by a bare `,` inside the same alias.
static CONNECTOR: Lazy<StdRegex> = Lazy::new(|| StdRegex::new(r" and | & |,").unwrap());

fn escape_with_flexible_connectors(form: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for m in CONNECTOR.find_iter(form) {
        out.push_str(&StdRegex::escape(&form[last..m.start()]));
        match m.as_str() {
            " and " => out.push_str(r"\s+(?:and|&)\s+"),
            " & " => out.push_str(r"\s*&\s*"),
            "," => out.push_str(r"\s*,\s*"),
            other => unreachable!("unexpected connector {other:?}"),
        }
        last = m.end();
    }
    out.push_str(&StdRegex::escape(&form[last..]));
    out
}

/// Wrap a synthesized core in a boundary guard. Forms containing a `.`
/// (e.g. `U.S.`) use a lookaround guard instead of `\b`, because `\b` does
/// not fire next to punctuation the way a literal-alphanumeric boundary
/// does (spec.md §4.A).
fn wrap_boundary(core: &str, form: &str) -> String {
    if form.contains('.') {
        format!(r"(?<![A-Za-z0-9]){core}(?![A-Za-z0-9])")
    } else {
        format!(r"\b{core}\b")
    }
}

/// Synthesize the regex *source* (not yet compiled) for a pattern record
/// lacking an explicit `pattern`. Longest surface form first so a longer
/// alias isn't shadowed by a shorter prefix in the alternation.
pub fn synthesize(record: &PatternRecord) -> String {
    let mut forms: Vec<&str> = record.live_surface_forms();
    forms.sort_by(|a, b| b.len().cmp(&a.len()));

    let alternatives: Vec<String> = forms
        .iter()
        .map(|f| wrap_boundary(&escape_with_flexible_connectors(f), f))
        .collect();

    format!("(?:{})", alternatives.join("|"))
}

/// The pattern source to compile for a record: its explicit `pattern` if
/// present, otherwise a synthesized one.
pub fn pattern_source_for(record: &PatternRecord) -> String {
    record.pattern.clone().unwrap_or_else(|| synthesize(record))
}
