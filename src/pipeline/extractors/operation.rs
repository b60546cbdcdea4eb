use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::fields;
use super::rules::{cascade, clean_value, group, group_f32, group_u32, is_negative, section_after, FieldRule};
use super::{DocumentExtractor, PartialRecord};
use crate::models::{
    AnaestheticType, BloodLossMl, ClinicalDetails, DocumentType, ProcedureEntry, TeamMember,
    TourniquetMinutes,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationNoteFields {
    pub procedures: Option<Vec<ProcedureEntry>>,
    pub operating_team: Option<Vec<TeamMember>>,
    pub clinical_details: ClinicalDetails,
    pub final_diagnosis: Option<String>,
    pub anaesthetic_type: Option<AnaestheticType>,
    pub complications: Option<Vec<String>>,
}

pub struct OperationNoteExtractor;

impl DocumentExtractor for OperationNoteExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::OperationNote
    }

    fn extract(&self, text: &str) -> PartialRecord {
        PartialRecord::OperationNote(OperationNoteFields {
            procedures: fields::procedures(text),
            operating_team: fields::operating_team(text),
            clinical_details: clinical_details(text),
            final_diagnosis: fields::diagnosis(text),
            anaesthetic_type: fields::anaesthetic_type(text),
            complications: fields::complications(text),
        })
    }
}

fn clinical_details(text: &str) -> ClinicalDetails {
    ClinicalDetails {
        operation_start: cascade(text, &START_TIME_RULES),
        operation_end: cascade(text, &END_TIME_RULES),
        blood_loss_ml: cascade(text, &BLOOD_LOSS_RULES),
        tourniquet_minutes: cascade(text, &TOURNIQUET_RULES),
        closure_method: cascade(text, &CLOSURE_RULES),
        drains: cascade(text, &DRAIN_RULES),
        post_op_instructions: section_after(text, &POST_OP_LABEL),
    }
}

// ── Times ──────────────────────────────────────────────────

/// `HH:MM` from hour, minute and optional am/pm groups; `None` when the
/// values are not a clock time.
fn clock_time(caps: &Captures) -> Option<String> {
    let mut hour = group_u32(caps, 1)?;
    let minute = group_u32(caps, 2)?;
    match group(caps, 3).map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("pm") if (1..12).contains(&hour) => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        Some(_) if hour == 0 || hour > 12 => return None,
        _ => {}
    }
    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

const CLOCK: &str = r"(\d{1,2})[:.h]?(\d{2})(?:\s*(am|pm))?\b";

static START_TIME_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            &format!(
                r"(?i)\b(?:(?:operation|surgery|procedure)\s+)?(?:start(?:ed)?|commenced|knife\s+to\s+skin|incision)(?:\s+time)?\s*(?:at|[:=\-])?\s*{CLOCK}"
            ),
            clock_time,
        ),
        FieldRule::new(&format!(r"(?i)\btime\s+in\s*[:=\-]?\s*{CLOCK}"), clock_time),
    ]
});

static END_TIME_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            &format!(
                r"(?i)\b(?:(?:operation|surgery|procedure)\s+)?(?:end(?:ed)?|finish(?:ed)?|completed?|closure\s+time)(?:\s+time)?\s*(?:at|[:=\-])?\s*{CLOCK}"
            ),
            clock_time,
        ),
        FieldRule::new(&format!(r"(?i)\btime\s+out\s*[:=\-]?\s*{CLOCK}"), clock_time),
    ]
});

// ── Blood loss ─────────────────────────────────────────────

const APPROX: &str = r"(?:approx(?:imately)?\.?\s*|~\s*|<\s*|about\s+)?";

/// Millilitres, or a bare number. Any other word after the number (units
/// transfused, pints, grams of haemoglobin) leaves the field empty.
fn blood_loss_ml(caps: &Captures) -> Option<BloodLossMl> {
    let millilitres = match group(caps, 2) {
        None => true,
        Some(unit) => matches!(
            unit.to_ascii_lowercase().as_str(),
            "ml" | "mls" | "cc" | "millilitres" | "milliliters" | "approx" | "approximately"
                | "estimated" | "only"
        ),
    };
    if !millilitres {
        return None;
    }
    BloodLossMl::new(group_u32(caps, 1)?)
}

static BLOOD_LOSS_RULES: LazyLock<Vec<FieldRule<BloodLossMl>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            &format!(
                r"(?i)\b(?:(?:estimated\s+)?blood\s+loss|EBL)\s*[:=\-]?\s*{APPROX}(\d(?:\.\d+)?)\s*(?:l|litres?|liters?)\b"
            ),
            |c| BloodLossMl::new((group_f32(c, 1)? * 1000.0).round() as u32),
        ),
        FieldRule::new(
            &format!(
                r"(?i)\b(?:estimated\s+)?blood\s+loss\s*[:=\-]?\s*{APPROX}(\d{{1,6}})[ \t]*([a-z]+)?"
            ),
            blood_loss_ml,
        ),
        FieldRule::new(
            &format!(r"(?i)\bEBL\s*[:=\-]?\s*{APPROX}(\d{{1,6}})[ \t]*([a-z]+)?"),
            blood_loss_ml,
        ),
        FieldRule::new(
            r"(?i)\b(?:(?:estimated\s+)?blood\s+loss|EBL)\s*[:=\-]?\s*(?:nil|none|negligible)\b",
            |_| BloodLossMl::new(0),
        ),
    ]
});

// ── Tourniquet ─────────────────────────────────────────────

static TOURNIQUET_RULES: LazyLock<Vec<FieldRule<TourniquetMinutes>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)\btourniquet(?:\s+time)?\s*[:=\-]?\s*(\d{1,2})\s*(?:h|hrs?|hours?)\s*(?:(\d{1,2})\s*(?:m|mins?|minutes?))?\b",
            |c| {
                let minutes = group_u32(c, 1)? * 60 + group_u32(c, 2).unwrap_or(0);
                TourniquetMinutes::new(minutes)
            },
        ),
        FieldRule::new(
            r"(?i)\btourniquet\s+time\s*[:=\-]?\s*(\d{1,3})\s*(?:min(?:ute)?s?)?\b",
            |c| TourniquetMinutes::new(group_u32(c, 1)?),
        ),
        FieldRule::new(
            r"(?i)\btourniquet\b[^\n]{0,40}?\b(\d{1,3})\s*min(?:ute)?s?\b",
            |c| TourniquetMinutes::new(group_u32(c, 1)?),
        ),
    ]
});

// ── Closure and drains ─────────────────────────────────────

fn labelled_text(caps: &Captures) -> Option<String> {
    clean_value(group(caps, 1)?)
}

static CLOSURE_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?im)^[ \t]*(?:skin[ \t]+|wound[ \t]+)?closure(?:[ \t]+method)?[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            labelled_text,
        ),
        FieldRule::new(
            r"(?i)\b(?:skin\s+|wound\s+)?closed\s+(?:with|using)\s+([^\n.;]+)",
            labelled_text,
        ),
        FieldRule::new(
            r"(?i)\b(subcuticular(?:\s+[a-z0-9\-]+)?|skin\s+staples|staples|skin\s+clips|steri-?strips|interrupted\s+sutures|continuous\s+sutures|tissue\s+glue|dermabond)\b",
            labelled_text,
        ),
    ]
});

/// Value recorded when a note states no drain was left.
const NO_DRAIN: &str = "None";

static DRAIN_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(r"(?im)^[ \t]*drains?[ \t]*[:\-][ \t]*(\S[^\n]*)$", |c| {
            let value = group(c, 1)?;
            if is_negative(value) {
                return Some(NO_DRAIN.to_string());
            }
            clean_value(value)
        }),
        FieldRule::new(r"(?i)\bno\s+drains?\b", |_| Some(NO_DRAIN.to_string())),
        FieldRule::new(
            r"(?i)\b((?:size\s+)?\d{0,2}\s*(?:fr|f)?\s*(?:redivac|blake|jackson[\s\-]pratt|penrose|robinson|corrugated|portovac|chest)\s+drains?|redivac|portovac)\b",
            labelled_text,
        ),
    ]
});

// ── Post-op instructions ───────────────────────────────────

static POST_OP_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:post-?op(?:erative)?[ \t]+(?:instructions|plan|care|orders)|plan|instructions)[ \t]*:(.*)$",
    )
    .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamRole;

    fn extract(text: &str) -> OperationNoteFields {
        match OperationNoteExtractor.extract(text) {
            PartialRecord::OperationNote(fields) => fields,
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    const NOTE: &str = "OPERATION NOTE\n\
        Surgeon: Mr A Patel\n\
        Assistant: Dr B Lee and Dr C Wong\n\
        Anaesthetist: Dr D Smith\n\
        Anaesthetic: GA\n\
        Indication: Symptomatic gallstones\n\
        Procedure: Laparoscopic cholecystectomy (4 port); Intraoperative cholangiogram\n\
        Start time: 08:45\n\
        End time: 10.10\n\
        Findings: thick walled gallbladder\n\
        EBL: 50ml\n\
        Closure: 3-0 monocryl subcuticular\n\
        Drains: nil\n\
        Complications: None\n\
        Post-op instructions: Discharge home tomorrow if well\n\
        Sutures dissolvable\n\
        \n\
        Signed";

    #[test]
    fn full_operation_note() {
        let fields = extract(NOTE);

        let procedures = fields.procedures.unwrap();
        assert_eq!(procedures.len(), 2);
        assert_eq!(procedures[0].notes.as_deref(), Some("4 port"));

        let team = fields.operating_team.unwrap();
        assert_eq!(team.len(), 4);
        assert_eq!(team[0].role, TeamRole::Surgeon);
        assert_eq!(team[2].name, "Dr C Wong");

        assert_eq!(fields.final_diagnosis.as_deref(), Some("Symptomatic gallstones"));
        assert_eq!(fields.anaesthetic_type, Some(AnaestheticType::General));
        assert_eq!(fields.complications, Some(vec![]));

        let details = fields.clinical_details;
        assert_eq!(details.operation_start.as_deref(), Some("08:45"));
        assert_eq!(details.operation_end.as_deref(), Some("10:10"));
        assert_eq!(details.blood_loss_ml.map(|b| b.value()), Some(50));
        assert_eq!(details.closure_method.as_deref(), Some("3-0 monocryl subcuticular"));
        assert_eq!(details.drains.as_deref(), Some("None"));
        assert_eq!(
            details.post_op_instructions.as_deref(),
            Some("Discharge home tomorrow if well\nSutures dissolvable")
        );
    }

    #[test]
    fn clock_times_are_validated() {
        assert_eq!(cascade("Start time: 25:10", &START_TIME_RULES), None);
        assert_eq!(cascade("Start time: 10:75", &START_TIME_RULES), None);
        assert_eq!(cascade("Started at 2:30pm", &START_TIME_RULES).as_deref(), Some("14:30"));
        assert_eq!(cascade("Knife to skin 0915", &START_TIME_RULES).as_deref(), Some("09:15"));
        assert_eq!(cascade("Finished 12:05 am", &END_TIME_RULES).as_deref(), Some("00:05"));
    }

    #[test]
    fn blood_loss_forms() {
        let loss = |t: &str| cascade(t, &BLOOD_LOSS_RULES).map(|b| b.value());
        assert_eq!(loss("Estimated blood loss: approx 300 ml"), Some(300));
        assert_eq!(loss("EBL ~200mls"), Some(200));
        assert_eq!(loss("Blood loss 1.5 litres"), Some(1500));
        assert_eq!(loss("EBL: nil"), Some(0));
        assert_eq!(loss("Blood loss: 50000ml"), None);
        assert_eq!(loss("no mention"), None);
    }

    #[test]
    fn blood_loss_in_other_units_is_left_empty() {
        let loss = |t: &str| cascade(t, &BLOOD_LOSS_RULES).map(|b| b.value());
        assert_eq!(loss("Blood loss: 2 units transfused"), None);
        assert_eq!(loss("EBL 1 pint"), None);
        assert_eq!(loss("Blood loss: 400"), Some(400));
        assert_eq!(loss("EBL 150 ml, drain left in situ"), Some(150));

        let outcome = crate::pipeline::process("Operation note\nBlood loss: 2 units transfused");
        let details = outcome.extracted_data.clinical_details;
        assert!(details.map_or(true, |d| d.blood_loss_ml.is_none()));
    }

    #[test]
    fn tourniquet_forms() {
        let minutes = |t: &str| cascade(t, &TOURNIQUET_RULES).map(|m| m.value());
        assert_eq!(minutes("Tourniquet time: 45 min"), Some(45));
        assert_eq!(minutes("Tourniquet time 1h 20min"), Some(80));
        assert_eq!(minutes("Thigh tourniquet inflated 250mmHg for 62 minutes"), Some(62));
        assert_eq!(minutes("Tourniquet time: 400 min"), None);
    }

    #[test]
    fn closure_by_phrase_or_keyword() {
        let closure = |t: &str| cascade(t, &CLOSURE_RULES);
        assert_eq!(closure("Skin closed with staples."), Some("staples".into()));
        assert_eq!(closure("Wound infiltrated. Steri-strips applied"), Some("Steri-strips".into()));
        assert_eq!(closure("no closure detail"), None);
    }

    #[test]
    fn drain_forms() {
        let drains = |t: &str| cascade(t, &DRAIN_RULES);
        assert_eq!(drains("Drain: 15Fr Blake to pelvis"), Some("15Fr Blake to pelvis".into()));
        assert_eq!(drains("No drain left."), Some("None".into()));
        assert_eq!(drains("Redivac drain to wound bed"), Some("Redivac drain".into()));
        assert_eq!(drains("nothing"), None);
    }

    #[test]
    fn empty_note_has_empty_details() {
        assert!(extract("OPERATION NOTE").clinical_details.is_empty());
    }
}
