//! Text cleanup shared by every stage: the "edge artifact" taxonomy named
//! in spec.md §1 (orphan prepositions, empty parens, unbalanced brackets,
//! stray separators) is cleaned up here exactly once per call site rather
//! than re-implemented per stage.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static EMPTY_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)").unwrap());
static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*\]").unwrap());
static DOUBLED_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,;:])\s*\1+").unwrap());
static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const ORPHAN_PREPOSITIONS: &[&str] = &["in", "for", "by", "of", "the"];
const SEPARATOR_CHARS: &[char] = &[',', '-', '\u{2013}', '\u{2014}', ':', ';'];

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").trim().to_string()
}

/// Drop empty `()`/`[]`, and if the parenthesis counts are unbalanced, strip
/// every parenthesis character outright (spec.md §4.C's normalization pass,
/// reused verbatim by stage F per §4.F.4).
pub fn balance_and_strip_empty_groups(s: &str) -> String {
    let mut out = EMPTY_PARENS.replace_all(s, " ").to_string();
    out = EMPTY_BRACKETS.replace_all(&out, " ").to_string();

    let opens = out.matches('(').count();
    let closes = out.matches(')').count();
    if opens != closes {
        out = out.chars().filter(|c| *c != '(' && *c != ')').collect();
    }
    let bopens = out.matches('[').count();
    let bcloses = out.matches(']').count();
    if bopens != bcloses {
        out = out.chars().filter(|c| *c != '[' && *c != ']').collect();
    }

    collapse_whitespace(&out)
}

/// Strip leading/trailing separator characters (`,`, `-`, en/em dash, `:`, `;`)
/// and a trailing `.`, then collapse whitespace.
pub fn strip_edge_separators(s: &str) -> String {
    let trimmed = s.trim().trim_matches(|c: char| SEPARATOR_CHARS.contains(&c) || c == '.');
    collapse_whitespace(trimmed)
}

/// Remove a single orphan preposition from the very start or end of the
/// residual, repeating until none remain at either edge (spec.md §4.F.2:
/// "doubled" orphan prepositions, e.g. `"in Technology"` -> `"Technology"`,
/// and `"Retail in"` -> `"Retail"`).
pub fn strip_orphan_prepositions(s: &str) -> String {
    let mut current = s.trim().to_string();
    loop {
        let before = current.clone();
        current = strip_edge_separators(&current);

        let words: Vec<&str> = current.split_whitespace().collect();
        if words.is_empty() {
            break;
        }

        let first_is_orphan = ORPHAN_PREPOSITIONS
            .iter()
            .any(|p| words[0].eq_ignore_ascii_case(p));
        let last_is_orphan = words.len() > 1
            && ORPHAN_PREPOSITIONS
                .iter()
                .any(|p| words[words.len() - 1].eq_ignore_ascii_case(p));

        if first_is_orphan && words.len() > 1 {
            current = words[1..].join(" ");
        } else if first_is_orphan && words.len() == 1 {
            current = String::new();
        } else if last_is_orphan {
            current = words[..words.len() - 1].join(" ");
        }

        if current == before {
            break;
        }
    }
    collapse_whitespace(&current)
}

/// Collapse doubled punctuation left behind by a removed span (e.g. `", ,"`).
pub fn drop_doubled_punctuation(s: &str) -> String {
    collapse_whitespace(&DOUBLED_PUNCT.replace_all(s, "$1"))
}

/// Full edge-artifact cleanup pass used after a stage removes a span:
/// collapse whitespace, balance groups, drop doubled punctuation, trim
/// separator edges. Idempotent by construction (each step is idempotent and
/// none re-introduces another's artifact).
pub fn clean_residual(s: &str) -> String {
    let s = balance_and_strip_empty_groups(s);
    let s = drop_doubled_punctuation(&s);
    strip_edge_separators(&s)
}

/// `normalized_topic`: lowercase, collapse runs of non-alphanumeric
/// characters to single spaces, trim. Deterministic and idempotent
/// (spec.md §8: `normalize(normalize(x)) == normalize(x)`).
pub fn normalize_topic(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    let collapsed = NON_ALNUM_RUN.replace_all(&lowered, " ");
    collapsed.trim().to_string()
}

/// Delete a `[start, end)` byte span from `s`, returning the remainder.
/// Position-based, never string-replace-first (spec.md §9): safe to call
/// repeatedly with spans recomputed against the post-deletion string.
pub fn remove_span(s: &str, span: (usize, usize)) -> String {
    let (start, end) = span;
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..start]);
    out.push_str(&s[end..]);
    out
}
