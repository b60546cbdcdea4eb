use std::sync::LazyLock;

use regex::Regex;

/// Patient identifier: three letters followed by four digits (NHI format).
pub(crate) static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]{3}[0-9]{4}\b").unwrap());

/// First identifier in the text, uppercased.
pub fn extract_identifier(text: &str) -> Option<String> {
    IDENTIFIER.find(text).map(|m| m.as_str().to_ascii_uppercase())
}
