use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::fields;
use super::rules::{cascade, group, FieldRule};
use super::{DocumentExtractor, PartialRecord};
use crate::models::{AdmissionUrgency, DocumentType, Gender, ProcedureEntry, StayType};
use crate::pipeline::privacy::dates::{first_labelled_date, labelled_date_pattern};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DischargeSummaryFields {
    pub patient_identifier: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub admission_urgency: Option<AdmissionUrgency>,
    pub stay_type: Option<StayType>,
    pub final_diagnosis: Option<String>,
    pub procedures: Option<Vec<ProcedureEntry>>,
    pub gender: Option<Gender>,
    pub complications: Option<Vec<String>>,
}

pub struct DischargeSummaryExtractor;

impl DocumentExtractor for DischargeSummaryExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::DischargeSummary
    }

    fn extract(&self, text: &str) -> PartialRecord {
        let admission_date = first_labelled_date(text, &ADMISSION_DATE_RULES);
        let discharge_date = first_labelled_date(text, &DISCHARGE_DATE_RULES);
        let stay_type = cascade(text, &STAY_TYPE_RULES)
            .or_else(|| stay_from_dates(admission_date, discharge_date));

        PartialRecord::DischargeSummary(DischargeSummaryFields {
            patient_identifier: cascade(text, &NHI_RULES),
            admission_date,
            discharge_date,
            admission_urgency: cascade(text, &URGENCY_RULES),
            stay_type,
            final_diagnosis: fields::diagnosis(text),
            procedures: fields::procedures(text),
            gender: fields::gender(text),
            complications: fields::complications(text),
        })
    }
}

static NHI_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![FieldRule::new(
        r"(?i)\bNHI\s*(?:number|no\.?|#)?\s*[:\-]?\s*([A-Za-z]{3}\d{4})\b",
        |c| Some(group(c, 1)?.to_ascii_uppercase()),
    )]
});

static ADMISSION_DATE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"date\s+of\s+admission|admission\s+date",
        r"admitted(?:\s+on)?|admission",
    ]
    .iter()
    .map(|label| labelled_date_pattern(label))
    .collect()
});

static DISCHARGE_DATE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"date\s+of\s+discharge|discharge\s+date",
        r"discharged(?:\s+on)?",
    ]
    .iter()
    .map(|label| labelled_date_pattern(label))
    .collect()
});

fn parse_urgency(caps: &Captures) -> Option<AdmissionUrgency> {
    match group(caps, 1)?.to_ascii_lowercase().as_str() {
        "acute" | "emergency" | "urgent" => Some(AdmissionUrgency::Acute),
        "elective" | "arranged" => Some(AdmissionUrgency::Elective),
        _ => None,
    }
}

static URGENCY_RULES: LazyLock<Vec<FieldRule<AdmissionUrgency>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?im)^[ \t]*(?:admission[ \t]+)?(?:type|urgency|admission)[ \t]*[:\-][ \t]*(acute|emergency|urgent|elective|arranged)\b",
            parse_urgency,
        ),
        FieldRule::new(
            r"(?i)\b(acute|emergency|urgent|elective|arranged)\s+(?:admission|presentation|surgery|case)\b",
            parse_urgency,
        ),
    ]
});

static STAY_TYPE_RULES: LazyLock<Vec<FieldRule<StayType>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(r"(?i)\bday[\s\-]+(?:case|surgery|stay)\b", |_| {
            Some(StayType::DayCase)
        }),
        FieldRule::new(r"(?i)\b(?:in-?patient|overnight\s+stay)\b", |_| {
            Some(StayType::Inpatient)
        }),
    ]
});

/// Same-day admission and discharge is a day case; a later discharge is an
/// inpatient stay. A discharge before admission says nothing.
fn stay_from_dates(admitted: Option<NaiveDate>, discharged: Option<NaiveDate>) -> Option<StayType> {
    let (admitted, discharged) = (admitted?, discharged?);
    match discharged.cmp(&admitted) {
        std::cmp::Ordering::Equal => Some(StayType::DayCase),
        std::cmp::Ordering::Greater => Some(StayType::Inpatient),
        std::cmp::Ordering::Less => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> DischargeSummaryFields {
        match DischargeSummaryExtractor.extract(text) {
            PartialRecord::DischargeSummary(fields) => fields,
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn minimal_discharge_summary() {
        let fields = extract("Discharge Summary\nDHB\nAdmission: 01/12/2025\nDiagnosis: Cellulitis");
        assert_eq!(fields.admission_date, Some(ymd(2025, 12, 1)));
        assert_eq!(fields.final_diagnosis.as_deref(), Some("Cellulitis"));
        assert_eq!(fields.discharge_date, None);
        assert_eq!(fields.stay_type, None);
    }

    #[test]
    fn full_discharge_summary() {
        let text = "DISCHARGE SUMMARY - Te Whatu Ora Waikato\n\
                    NHI: abc1234\n\
                    Sex: Female\n\
                    Date of admission: 3 March 2026\n\
                    Date of discharge: 6 March 2026\n\
                    Admission type: Acute\n\
                    Principal diagnosis: Acute cholecystitis\n\
                    Procedure: Laparoscopic cholecystectomy\n\
                    Complications: Nil";
        let fields = extract(text);
        assert_eq!(fields.patient_identifier.as_deref(), Some("ABC1234"));
        assert_eq!(fields.gender, Some(Gender::Female));
        assert_eq!(fields.admission_date, Some(ymd(2026, 3, 3)));
        assert_eq!(fields.discharge_date, Some(ymd(2026, 3, 6)));
        assert_eq!(fields.admission_urgency, Some(AdmissionUrgency::Acute));
        assert_eq!(fields.stay_type, Some(StayType::Inpatient));
        assert_eq!(fields.final_diagnosis.as_deref(), Some("Acute cholecystitis"));
        assert_eq!(fields.procedures.unwrap()[0].name, "Laparoscopic cholecystectomy");
        assert_eq!(fields.complications, Some(vec![]));
    }

    #[test]
    fn emergency_maps_to_acute() {
        assert_eq!(
            extract("Emergency admission via ED").admission_urgency,
            Some(AdmissionUrgency::Acute)
        );
        assert_eq!(
            extract("Urgency: elective").admission_urgency,
            Some(AdmissionUrgency::Elective)
        );
        assert_eq!(extract("Seen in clinic").admission_urgency, None);
    }

    #[test]
    fn explicit_day_case_wording_wins_over_dates() {
        let text = "Admitted: 01/02/2026\nDischarged: 03/02/2026\nDay case procedure";
        assert_eq!(extract(text).stay_type, Some(StayType::DayCase));
    }

    #[test]
    fn stay_type_from_same_day_dates() {
        let text = "Admission date: 10/02/2026\nDischarge date: 10/02/2026";
        assert_eq!(extract(text).stay_type, Some(StayType::DayCase));
    }

    #[test]
    fn stay_type_ignores_inverted_dates() {
        assert_eq!(stay_from_dates(Some(ymd(2026, 2, 10)), Some(ymd(2026, 2, 1))), None);
        assert_eq!(stay_from_dates(Some(ymd(2026, 2, 10)), None), None);
    }

    #[test]
    fn bare_identifier_is_not_nhi_labelled() {
        assert_eq!(extract("Patient ABC1234 admitted").patient_identifier, None);
        assert_eq!(
            extract("NHI number: XYZ9876").patient_identifier.as_deref(),
            Some("XYZ9876")
        );
    }
}
