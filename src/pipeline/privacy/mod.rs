//! Identifier and date matchers, used in two modes: extraction pulls a value
//! out of the original text, redaction replaces every match with a
//! placeholder. Extraction must always run before redaction; a redacted text
//! carries no recoverable identifier.

pub mod dates;
pub mod identifier;
pub mod redact;

#[cfg(test)]
mod audit;

pub use dates::{extract_procedure_date, normalize_date};
pub use identifier::extract_identifier;
pub use redact::{redact, RedactedItem, RedactionResult, DATE_PLACEHOLDER, IDENTIFIER_PLACEHOLDER};
