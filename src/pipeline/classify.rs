//! Heuristic document-type classification from trigger phrases.
//!
//! Rules live in [`RULES`], evaluated top to bottom, first match wins. Order
//! is significant: a discharge summary often also mentions an operation or
//! a surgeon, so it must be tested before the operation-note rule.

use serde::Serialize;

use crate::models::{Confidence, DocumentType};

/// Trigger recorded when no rule fired.
pub const NO_TRIGGER: &str = "no classification triggers matched";

/// Boolean condition over the lowercased text.
#[derive(Debug)]
pub enum Condition {
    /// At least one of the phrases is present.
    AnyOf(&'static [&'static str]),
    /// Every sub-condition holds.
    AllOf(&'static [Condition]),
    /// At least one sub-condition holds.
    EitherOf(&'static [Condition]),
}

impl Condition {
    /// `Some(triggers)` with the literal phrases that made the condition hold,
    /// in rule order; `None` if it does not hold.
    fn evaluate(&self, lowered: &str) -> Option<Vec<&'static str>> {
        match self {
            Condition::AnyOf(phrases) => {
                let found: Vec<&'static str> = phrases
                    .iter()
                    .copied()
                    .filter(|p| contains_phrase(lowered, p))
                    .collect();
                (!found.is_empty()).then_some(found)
            }
            Condition::AllOf(parts) => {
                let mut found = Vec::new();
                for part in *parts {
                    found.extend(part.evaluate(lowered)?);
                }
                Some(found)
            }
            Condition::EitherOf(parts) => {
                let found: Vec<&'static str> = parts
                    .iter()
                    .filter_map(|part| part.evaluate(lowered))
                    .flatten()
                    .collect();
                (!found.is_empty()).then_some(found)
            }
        }
    }
}

/// Whether `phrase` occurs as whole words: an alphanumeric edge of the
/// phrase may not continue into a longer token ("op note" in "desktop note").
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let starts_word = phrase.chars().next().is_some_and(char::is_alphanumeric);
    let ends_word = phrase.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let clear_before =
            !starts_word || !haystack[..start].chars().next_back().is_some_and(char::is_alphanumeric);
        let clear_after =
            !ends_word || !haystack[end..].chars().next().is_some_and(char::is_alphanumeric);
        clear_before && clear_after
    })
}

#[derive(Debug)]
pub struct ClassificationRule {
    pub condition: Condition,
    pub document_type: DocumentType,
    pub confidence: Confidence,
}

const DISCHARGE_MARKERS: &[&str] = &["discharge summary"];
const AUTHORITY_MARKERS: &[&str] = &[
    "dhb",
    "district health board",
    "te whatu ora",
    "health new zealand",
    "health nz",
];
const ANAESTHESIA_REPORT_MARKERS: &[&str] = &[
    "anaesthetic record",
    "anaesthesia record",
    "anaesthetic chart",
    "anaesthetic report",
    "anaesthesia report",
];
const ANAESTHESIA_AUTHORITY_MARKERS: &[&str] =
    &["department of anaesthesia", "anaesthesia department"];
const AGENT_TOKENS: &[&str] = &[
    "propofol",
    "sevoflurane",
    "desflurane",
    "isoflurane",
    "fentanyl",
    "remifentanil",
    "rocuronium",
    "suxamethonium",
];
const ASA_MARKERS: &[&str] = &["asa ", "asa:", "asa grade", "asa score", "asa class"];
const OPERATION_REPORT_MARKERS: &[&str] = &[
    "operation note",
    "operative note",
    "operation report",
    "operative report",
    "procedure report",
    "op note",
];
const SURGEON_MARKERS: &[&str] = &["surgeon", "surgeons"];
const PROCEDURE_MARKERS: &[&str] = &["procedure", "procedures"];

/// Ordered classification table.
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        condition: Condition::AllOf(&[
            Condition::AnyOf(DISCHARGE_MARKERS),
            Condition::AnyOf(AUTHORITY_MARKERS),
        ]),
        document_type: DocumentType::DischargeSummary,
        confidence: Confidence::High,
    },
    ClassificationRule {
        condition: Condition::EitherOf(&[
            Condition::AnyOf(ANAESTHESIA_REPORT_MARKERS),
            Condition::AnyOf(ANAESTHESIA_AUTHORITY_MARKERS),
            Condition::AllOf(&[Condition::AnyOf(AGENT_TOKENS), Condition::AnyOf(ASA_MARKERS)]),
        ]),
        document_type: DocumentType::AnaesthesiaRecord,
        confidence: Confidence::High,
    },
    ClassificationRule {
        condition: Condition::EitherOf(&[
            Condition::AnyOf(OPERATION_REPORT_MARKERS),
            Condition::AllOf(&[Condition::AnyOf(SURGEON_MARKERS), Condition::AnyOf(PROCEDURE_MARKERS)]),
        ]),
        document_type: DocumentType::OperationNote,
        confidence: Confidence::Medium,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub document_type: DocumentType,
    pub confidence: Confidence,
    pub detected_triggers: Vec<String>,
}

/// Classify raw document text.
pub fn classify(text: &str) -> ClassificationResult {
    classify_with(RULES, text)
}

/// Classify against an explicit rule table.
pub fn classify_with(rules: &[ClassificationRule], text: &str) -> ClassificationResult {
    let lowered = text.to_lowercase();

    for rule in rules {
        if let Some(triggers) = rule.condition.evaluate(&lowered) {
            return ClassificationResult {
                document_type: rule.document_type,
                confidence: rule.confidence,
                detected_triggers: triggers.into_iter().map(String::from).collect(),
            };
        }
    }

    ClassificationResult {
        document_type: DocumentType::Generic,
        confidence: Confidence::Low,
        detected_triggers: vec![NO_TRIGGER.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discharge_summary_with_authority() {
        let result = classify("DISCHARGE SUMMARY\nCounties Manukau DHB\nDiagnosis: Cellulitis");
        assert_eq!(result.document_type, DocumentType::DischargeSummary);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.detected_triggers, vec!["discharge summary", "dhb"]);
    }

    #[test]
    fn discharge_summary_without_authority_is_not_discharge() {
        let result = classify("Discharge summary\nDiagnosis: Cellulitis");
        assert_eq!(result.document_type, DocumentType::Generic);
    }

    #[test]
    fn discharge_beats_operation_note() {
        let text = "Discharge Summary - Te Whatu Ora\nOperation note attached.\nSurgeon: Smith\nProcedure: Appendicectomy";
        let result = classify(text);
        assert_eq!(result.document_type, DocumentType::DischargeSummary);
        assert!(!result.detected_triggers.contains(&"operation note".to_string()));
    }

    #[test]
    fn anaesthesia_report_marker() {
        let result = classify("ANAESTHETIC RECORD\nPatient weight 80kg");
        assert_eq!(result.document_type, DocumentType::AnaesthesiaRecord);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.detected_triggers, vec!["anaesthetic record"]);
    }

    #[test]
    fn anaesthesia_authority_marker() {
        let result = classify("Department of Anaesthesia\nPre-op assessment");
        assert_eq!(result.document_type, DocumentType::AnaesthesiaRecord);
        assert_eq!(result.detected_triggers, vec!["department of anaesthesia"]);
    }

    #[test]
    fn agent_and_asa_together_classify_as_anaesthesia() {
        let result = classify("ASA 2, Weight: 70kg, Height: 170cm\nInduction: propofol");
        assert_eq!(result.document_type, DocumentType::AnaesthesiaRecord);
        assert_eq!(result.detected_triggers, vec!["propofol", "asa "]);
    }

    #[test]
    fn asa_without_agent_is_generic() {
        let result = classify("ASA 2, Weight: 70kg, Height: 170cm");
        assert_eq!(result.document_type, DocumentType::Generic);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.detected_triggers, vec![NO_TRIGGER]);
    }

    #[test]
    fn agent_without_asa_is_not_anaesthesia() {
        let result = classify("Fentanyl 50mcg given in recovery");
        assert_eq!(result.document_type, DocumentType::Generic);
    }

    #[test]
    fn anaesthesia_rule_precedes_operation_rule() {
        let text = "Operation Note\nAnaesthetic record attached\nSurgeon: Smith";
        let result = classify(text);
        assert_eq!(result.document_type, DocumentType::AnaesthesiaRecord);
    }

    #[test]
    fn operation_note_marker() {
        let result = classify("OPERATIVE REPORT\nFindings: inflamed appendix");
        assert_eq!(result.document_type, DocumentType::OperationNote);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.detected_triggers, vec!["operative report"]);
    }

    #[test]
    fn surgeon_and_procedure_classify_as_operation_note() {
        let result = classify("Surgeon: Mr Patel\nProcedure: Right inguinal hernia repair");
        assert_eq!(result.document_type, DocumentType::OperationNote);
        assert_eq!(result.detected_triggers, vec!["surgeon", "procedure"]);
    }

    #[test]
    fn surgeon_alone_is_generic() {
        let result = classify("Surgeon: Mr Patel");
        assert_eq!(result.document_type, DocumentType::Generic);
    }

    #[test]
    fn empty_text_is_generic() {
        let result = classify("");
        assert_eq!(result.document_type, DocumentType::Generic);
        assert_eq!(result.detected_triggers, vec![NO_TRIGGER]);
    }

    #[test]
    fn non_english_text_is_generic() {
        let result = classify("手術記録 患者は回復した Ω≈ç√");
        assert_eq!(result.document_type, DocumentType::Generic);
    }

    #[test]
    fn markers_inside_longer_words_do_not_fire() {
        assert_eq!(classify("Desktop note: printer jammed").document_type, DocumentType::Generic);
        assert_eq!(
            classify("Discharge summary\nMadhbala ward").document_type,
            DocumentType::Generic
        );
        assert_eq!(
            classify("Casa 2 review, propofol in stock").document_type,
            DocumentType::Generic
        );
        assert_eq!(classify("Op note: wound washout").document_type, DocumentType::OperationNote);
    }

    #[test]
    fn plural_markers_still_classify() {
        let result = classify("Surgeons: Mr Patel, Dr Lee\nProcedures: Washout; Closure");
        assert_eq!(result.document_type, DocumentType::OperationNote);
        assert_eq!(result.detected_triggers, vec!["surgeons", "procedures"]);
    }

    #[test]
    fn phrase_matching_respects_word_edges() {
        assert!(contains_phrase("counties manukau dhb", "dhb"));
        assert!(!contains_phrase("adhbx", "dhb"));
        assert!(contains_phrase("asa 2", "asa "));
        assert!(!contains_phrase("casa 2", "asa "));
        assert!(contains_phrase("asa:3", "asa:"));
    }

    #[test]
    fn custom_rule_table_is_honoured() {
        static ONLY_OPS: &[ClassificationRule] = &[ClassificationRule {
            condition: Condition::AnyOf(&["op note"]),
            document_type: DocumentType::OperationNote,
            confidence: Confidence::Medium,
        }];
        let result = classify_with(ONLY_OPS, "Discharge Summary DHB op note");
        assert_eq!(result.document_type, DocumentType::OperationNote);
    }
}
