use serde::Serialize;

use super::dates::DATE;
use super::identifier::IDENTIFIER;
use crate::models::RedactionKind;

pub const IDENTIFIER_PLACEHOLDER: &str = "[REDACTED-ID]";
pub const DATE_PLACEHOLDER: &str = "[REDACTED-DATE]";

/// One value removed from the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedItem {
    #[serde(rename = "type")]
    pub kind: RedactionKind,
    pub original: String,
    /// Byte offset of the first occurrence of `original` in the input text.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    pub redacted_text: String,
    pub redacted_items: Vec<RedactedItem>,
}

/// Replace every identifier and date with its placeholder.
///
/// Overlapping matches resolve leftmost-first, longest at equal start.
/// Callers that need the identifier or procedure date must extract them from
/// the original text before calling this.
pub fn redact(text: &str) -> RedactionResult {
    let mut spans: Vec<(usize, usize, RedactionKind)> = IDENTIFIER
        .find_iter(text)
        .map(|m| (m.start(), m.end(), RedactionKind::Identifier))
        .chain(
            DATE.find_iter(text)
                .map(|m| (m.start(), m.end(), RedactionKind::Date)),
        )
        .collect();
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut redacted_text = String::with_capacity(text.len());
    let mut redacted_items = Vec::with_capacity(spans.len());
    let mut cursor = 0;

    for (start, end, kind) in spans {
        if start < cursor {
            continue;
        }
        let original = &text[start..end];
        redacted_text.push_str(&text[cursor..start]);
        redacted_text.push_str(match kind {
            RedactionKind::Identifier => IDENTIFIER_PLACEHOLDER,
            RedactionKind::Date => DATE_PLACEHOLDER,
        });
        redacted_items.push(RedactedItem {
            kind,
            original: original.to_string(),
            position: text.find(original).unwrap_or(start),
        });
        cursor = end;
    }
    redacted_text.push_str(&text[cursor..]);

    RedactionResult {
        redacted_text,
        redacted_items,
    }
}
