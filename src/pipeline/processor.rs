//! Document processing entry point.
//!
//! Single pipeline over raw text:
//! identifier + date extraction → classify → type-specific extraction →
//! merge → attribution.
//!
//! Identifier and procedure date are always read from the original text
//! before anything else, and redaction (when requested) runs after every
//! extraction has finished.

use serde::Serialize;

use crate::models::{CanonicalRecord, Confidence, DocumentType};
use crate::pipeline::classify::classify;
use crate::pipeline::extractors::extractor_for;
use crate::pipeline::merge::{attribution_for, FieldValue, RecordBuilder};
use crate::pipeline::privacy::{extract_identifier, extract_procedure_date, redact, RedactionResult};

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub document_type: DocumentType,
    pub document_type_name: &'static str,
    pub confidence: Confidence,
    pub detected_triggers: Vec<String>,
    pub extracted_data: CanonicalRecord,
    /// Canonical field names filled automatically, in write order.
    pub auto_filled_fields: Vec<String>,
}

/// Run the full pipeline over raw document text. Never fails; a field no
/// rule can fill is absent.
pub fn process(raw_text: &str) -> ProcessingOutcome {
    let mut builder = RecordBuilder::new();

    // Classifier-independent values come first and take precedence.
    if let Some(identifier) = extract_identifier(raw_text) {
        builder.apply(FieldValue::PatientIdentifier(identifier));
    }
    if let Some(date) = extract_procedure_date(raw_text) {
        builder.apply(FieldValue::ProcedureDate(date));
    }

    let classification = classify(raw_text);
    let partial = extractor_for(classification.document_type).extract(raw_text);
    builder.apply_all(partial.into_fields());
    builder.apply_all(attribution_for(classification.document_type));

    let (extracted_data, auto_filled_fields) = builder.finish();

    tracing::debug!(
        document_type = %classification.document_type,
        confidence = %classification.confidence,
        triggers = classification.detected_triggers.len(),
        fields = auto_filled_fields.len(),
        "Document processed"
    );

    ProcessingOutcome {
        document_type: classification.document_type,
        document_type_name: classification.document_type.display_name(),
        confidence: classification.confidence,
        detected_triggers: classification.detected_triggers,
        extracted_data,
        auto_filled_fields,
    }
}

/// [`process`] plus a redaction of the same text, computed only after every
/// extraction has run on the original.
pub fn process_with_audit(raw_text: &str) -> (ProcessingOutcome, RedactionResult) {
    let outcome = process(raw_text);
    let redaction = redact(raw_text);
    (outcome, redaction)
}
