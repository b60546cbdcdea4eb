//! Field-rule cascades.
//!
//! A field is extracted by an ordered list of [`FieldRule`]s. Each rule pairs
//! a pattern with a parser that validates the captures; the first rule that
//! both matches and validates wins. A rule that matches but fails validation
//! (out of bounds, unparseable) falls through to the next rule, and when no
//! rule succeeds the field is absent.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub(crate) struct FieldRule<T> {
    pattern: Regex,
    parse: fn(&Captures) -> Option<T>,
}

impl<T> FieldRule<T> {
    /// Panics on an invalid pattern; rules are static and covered by tests.
    pub(crate) fn new(pattern: &str, parse: fn(&Captures) -> Option<T>) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            parse,
        }
    }

    fn apply(&self, text: &str) -> Option<T> {
        self.pattern.captures(text).and_then(|caps| (self.parse)(&caps))
    }
}

/// First validated value from the cascade.
pub(crate) fn cascade<T>(text: &str, rules: &[FieldRule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule.apply(text))
}

/// Capture group `idx` as trimmed text.
pub(crate) fn group<'t>(caps: &Captures<'t>, idx: usize) -> Option<&'t str> {
    caps.get(idx).map(|m| m.as_str().trim())
}

pub(crate) fn group_f32(caps: &Captures, idx: usize) -> Option<f32> {
    group(caps, idx)?.parse().ok()
}

pub(crate) fn group_u32(caps: &Captures, idx: usize) -> Option<u32> {
    group(caps, idx)?.parse().ok()
}

/// Longest free-text value accepted from a labelled line.
const MAX_VALUE_LEN: usize = 200;

/// Normalize a free-text capture: collapse whitespace, strip trailing
/// punctuation, reject blanks and implausibly long runs.
pub(crate) fn clean_value(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '-') || c.is_whitespace())
        .to_string();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_VALUE_LEN {
        return None;
    }
    if !trimmed.chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(trimmed)
}

static NEGATIVE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:nil|none|no|nad|n/a|not\s+applicable|none\s+noted|nil\s+noted|no\s+complications?|no\s+drains?)\b").unwrap()
});

/// Whether a labelled value explicitly states "none".
pub(crate) fn is_negative(value: &str) -> bool {
    NEGATIVE_VALUE.is_match(value.trim())
}

/// A line that starts a new labelled section, e.g. `Drains:`.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[A-Za-z][A-Za-z /()\-]{0,40}:").unwrap());

/// Text following the first line that matches `label` (group 1 holds the
/// remainder of that line), continuing over subsequent lines until a blank
/// line or another labelled heading.
pub(crate) fn section_after(text: &str, label: &Regex) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let (start, first) = lines.iter().enumerate().find_map(|(idx, line)| {
        label
            .captures(line)
            .map(|caps| (idx, caps.get(1).map_or("", |m| m.as_str()).trim().to_string()))
    })?;

    let mut parts = Vec::new();
    if !first.is_empty() {
        parts.push(first);
    }
    for line in &lines[start + 1..] {
        if line.trim().is_empty() || HEADING.is_match(line) {
            break;
        }
        parts.push(line.trim().to_string());
    }

    let joined = parts.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty() && trimmed.chars().count() <= MAX_VALUE_LEN * 5)
        .then(|| trimmed.to_string())
}

/// Split a list value on `;`, `,` and ` and `.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    static SEPARATORS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\s*(?:[;,&/]|\band\b)\s*").unwrap());
    SEPARATORS
        .split(value)
        .filter_map(clean_value)
        .collect()
}
