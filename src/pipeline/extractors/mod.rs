//! Type-specific field extraction.
//!
//! One [`DocumentExtractor`] per [`DocumentType`]. Each returns a
//! [`PartialRecord`] variant holding only the fields that type of document
//! can carry; the merge layer maps it into the canonical record.

pub mod anaesthesia;
pub mod discharge;
pub mod generic;
pub mod operation;

pub(crate) mod fields;
pub(crate) mod rules;

pub use anaesthesia::{AnaesthesiaExtractor, AnaesthesiaRecordFields};
pub use discharge::{DischargeSummaryExtractor, DischargeSummaryFields};
pub use generic::{GenericExtractor, GenericFields, KNOWN_FACILITIES};
pub use operation::{OperationNoteExtractor, OperationNoteFields};

use crate::models::DocumentType;

/// Pattern-based extraction for one document type.
/// Never fails: a field that no rule matches and validates is absent.
pub trait DocumentExtractor: Send + Sync {
    /// Which document type this extractor handles.
    fn document_type(&self) -> DocumentType;

    /// Run every field cascade over the original text.
    fn extract(&self, text: &str) -> PartialRecord;
}

/// Fields extracted from one document, tagged by document type.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialRecord {
    DischargeSummary(DischargeSummaryFields),
    AnaesthesiaRecord(AnaesthesiaRecordFields),
    OperationNote(OperationNoteFields),
    Generic(GenericFields),
}

impl PartialRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            PartialRecord::DischargeSummary(_) => DocumentType::DischargeSummary,
            PartialRecord::AnaesthesiaRecord(_) => DocumentType::AnaesthesiaRecord,
            PartialRecord::OperationNote(_) => DocumentType::OperationNote,
            PartialRecord::Generic(_) => DocumentType::Generic,
        }
    }
}

static DISCHARGE: DischargeSummaryExtractor = DischargeSummaryExtractor;
static ANAESTHESIA: AnaesthesiaExtractor = AnaesthesiaExtractor;
static OPERATION: OperationNoteExtractor = OperationNoteExtractor;
static GENERIC: GenericExtractor = GenericExtractor;

/// The extractor registered for a document type.
pub fn extractor_for(document_type: DocumentType) -> &'static dyn DocumentExtractor {
    match document_type {
        DocumentType::DischargeSummary => &DISCHARGE,
        DocumentType::AnaesthesiaRecord => &ANAESTHESIA,
        DocumentType::OperationNote => &OPERATION,
        DocumentType::Generic => &GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [DocumentType; 4] = [
        DocumentType::DischargeSummary,
        DocumentType::AnaesthesiaRecord,
        DocumentType::OperationNote,
        DocumentType::Generic,
    ];

    #[test]
    fn registry_covers_every_type() {
        for ty in ALL_TYPES {
            let extractor = extractor_for(ty);
            assert_eq!(extractor.document_type(), ty);
            assert_eq!(extractor.extract("").document_type(), ty);
        }
    }

    #[test]
    fn extractors_are_total_on_hostile_input() {
        let inputs = [
            String::new(),
            "\u{0}\u{1}\u{7f}".to_string(),
            "手術記録 患者は回復した".to_string(),
            "ASA ".repeat(5_000),
            "Weight: 999999999999999999999kg".to_string(),
            "Date of surgery: 99/99/9999".to_string(),
            "Procedure: ((((((((".to_string(),
            ":\n:\n:\n".repeat(1_000),
        ];
        for ty in ALL_TYPES {
            for input in &inputs {
                let _ = extractor_for(ty).extract(input);
            }
        }
    }
}
