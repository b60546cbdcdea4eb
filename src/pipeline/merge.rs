//! Merge partial records into the canonical record.
//!
//! Every value passes through [`RecordBuilder::apply`], which fills a field
//! only when it is still empty and records the field name once in the
//! provenance list. Earlier writers always win.

use chrono::NaiveDate;

use crate::models::{
    AdmissionUrgency, AnaestheticType, AsaScore, BloodLossMl, CanonicalRecord, ClinicalDetails,
    DocumentType, FundingStatus, Gender, HeightCm, ProcedureEntry, StayType, TeamMember,
    TourniquetMinutes, WeightKg,
};
use crate::pipeline::extractors::PartialRecord;

/// Canonical field names as they appear in the provenance list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    PatientIdentifier,
    ProcedureDate,
    Gender,
    AdmissionDate,
    DischargeDate,
    AdmissionUrgency,
    StayType,
    AsaScore,
    HeightCm,
    WeightKg,
    FinalDiagnosis,
    Procedures,
    OperatingTeam,
    ClinicalDetails,
    FundingStatus,
    Facility,
    AnaestheticType,
    Complications,
}

impl CanonicalField {
    /// The JSON key of the field in the serialized record.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::PatientIdentifier => "patientIdentifier",
            CanonicalField::ProcedureDate => "procedureDate",
            CanonicalField::Gender => "gender",
            CanonicalField::AdmissionDate => "admissionDate",
            CanonicalField::DischargeDate => "dischargeDate",
            CanonicalField::AdmissionUrgency => "admissionUrgency",
            CanonicalField::StayType => "stayType",
            CanonicalField::AsaScore => "asaScore",
            CanonicalField::HeightCm => "heightCm",
            CanonicalField::WeightKg => "weightKg",
            CanonicalField::FinalDiagnosis => "finalDiagnosis",
            CanonicalField::Procedures => "procedures",
            CanonicalField::OperatingTeam => "operatingTeam",
            CanonicalField::ClinicalDetails => "clinicalDetails",
            CanonicalField::FundingStatus => "fundingStatus",
            CanonicalField::Facility => "facility",
            CanonicalField::AnaestheticType => "anaestheticType",
            CanonicalField::Complications => "complications",
        }
    }
}

/// One extracted value addressed to a canonical field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    PatientIdentifier(String),
    ProcedureDate(NaiveDate),
    Gender(Gender),
    AdmissionDate(NaiveDate),
    DischargeDate(NaiveDate),
    AdmissionUrgency(AdmissionUrgency),
    StayType(StayType),
    AsaScore(AsaScore),
    HeightCm(HeightCm),
    WeightKg(WeightKg),
    FinalDiagnosis(String),
    Procedures(Vec<ProcedureEntry>),
    OperatingTeam(Vec<TeamMember>),
    OperationStart(String),
    OperationEnd(String),
    BloodLossMl(BloodLossMl),
    TourniquetMinutes(TourniquetMinutes),
    ClosureMethod(String),
    Drains(String),
    PostOpInstructions(String),
    FundingStatus(FundingStatus),
    Facility(String),
    AnaestheticType(AnaestheticType),
    Complications(Vec<String>),
}

impl FieldValue {
    /// Canonical field this value fills. Clinical-details sub-fields all
    /// report [`CanonicalField::ClinicalDetails`].
    pub fn field(&self) -> CanonicalField {
        match self {
            FieldValue::PatientIdentifier(_) => CanonicalField::PatientIdentifier,
            FieldValue::ProcedureDate(_) => CanonicalField::ProcedureDate,
            FieldValue::Gender(_) => CanonicalField::Gender,
            FieldValue::AdmissionDate(_) => CanonicalField::AdmissionDate,
            FieldValue::DischargeDate(_) => CanonicalField::DischargeDate,
            FieldValue::AdmissionUrgency(_) => CanonicalField::AdmissionUrgency,
            FieldValue::StayType(_) => CanonicalField::StayType,
            FieldValue::AsaScore(_) => CanonicalField::AsaScore,
            FieldValue::HeightCm(_) => CanonicalField::HeightCm,
            FieldValue::WeightKg(_) => CanonicalField::WeightKg,
            FieldValue::FinalDiagnosis(_) => CanonicalField::FinalDiagnosis,
            FieldValue::Procedures(_) => CanonicalField::Procedures,
            FieldValue::OperatingTeam(_) => CanonicalField::OperatingTeam,
            FieldValue::OperationStart(_)
            | FieldValue::OperationEnd(_)
            | FieldValue::BloodLossMl(_)
            | FieldValue::TourniquetMinutes(_)
            | FieldValue::ClosureMethod(_)
            | FieldValue::Drains(_)
            | FieldValue::PostOpInstructions(_) => CanonicalField::ClinicalDetails,
            FieldValue::FundingStatus(_) => CanonicalField::FundingStatus,
            FieldValue::Facility(_) => CanonicalField::Facility,
            FieldValue::AnaestheticType(_) => CanonicalField::AnaestheticType,
            FieldValue::Complications(_) => CanonicalField::Complications,
        }
    }
}

/// Push `Some` values through `$wrap` in declaration order.
macro_rules! push_fields {
    ($out:ident; $($value:expr => $wrap:path),* $(,)?) => {{
        $(
            if let Some(v) = $value {
                $out.push($wrap(v));
            }
        )*
    }};
}

impl PartialRecord {
    /// Explicit per-variant mapping into canonical field values.
    pub fn into_fields(self) -> Vec<FieldValue> {
        let mut out = Vec::new();
        match self {
            PartialRecord::DischargeSummary(f) => push_fields!(out;
                f.patient_identifier => FieldValue::PatientIdentifier,
                f.admission_date => FieldValue::AdmissionDate,
                f.discharge_date => FieldValue::DischargeDate,
                f.admission_urgency => FieldValue::AdmissionUrgency,
                f.stay_type => FieldValue::StayType,
                f.final_diagnosis => FieldValue::FinalDiagnosis,
                f.procedures => FieldValue::Procedures,
                f.gender => FieldValue::Gender,
                f.complications => FieldValue::Complications,
            ),
            PartialRecord::AnaesthesiaRecord(f) => push_fields!(out;
                f.asa_score => FieldValue::AsaScore,
                f.weight_kg => FieldValue::WeightKg,
                f.height_cm => FieldValue::HeightCm,
                f.anaesthetic_type => FieldValue::AnaestheticType,
                f.operating_team => FieldValue::OperatingTeam,
                f.procedures => FieldValue::Procedures,
                f.gender => FieldValue::Gender,
            ),
            PartialRecord::OperationNote(f) => {
                let d = f.clinical_details;
                push_fields!(out;
                    f.procedures => FieldValue::Procedures,
                    f.operating_team => FieldValue::OperatingTeam,
                    d.operation_start => FieldValue::OperationStart,
                    d.operation_end => FieldValue::OperationEnd,
                    d.blood_loss_ml => FieldValue::BloodLossMl,
                    d.tourniquet_minutes => FieldValue::TourniquetMinutes,
                    d.closure_method => FieldValue::ClosureMethod,
                    d.drains => FieldValue::Drains,
                    d.post_op_instructions => FieldValue::PostOpInstructions,
                    f.final_diagnosis => FieldValue::FinalDiagnosis,
                    f.anaesthetic_type => FieldValue::AnaestheticType,
                    f.complications => FieldValue::Complications,
                )
            }
            PartialRecord::Generic(f) => push_fields!(out;
                f.asa_score => FieldValue::AsaScore,
                f.weight_kg => FieldValue::WeightKg,
                f.height_cm => FieldValue::HeightCm,
                f.final_diagnosis => FieldValue::FinalDiagnosis,
                f.procedures => FieldValue::Procedures,
                f.gender => FieldValue::Gender,
                f.complications => FieldValue::Complications,
                f.facility => FieldValue::Facility,
            ),
        }
        out
    }
}

/// Values implied by the document type alone.
#[derive(Debug)]
pub struct Attribution {
    pub document_type: DocumentType,
    pub facility: &'static str,
    pub funding_status: FundingStatus,
}

/// Fixed attribution table. Discharge summaries are only recognised when
/// they carry a public health authority marker.
pub static ATTRIBUTIONS: &[Attribution] = &[Attribution {
    document_type: DocumentType::DischargeSummary,
    facility: "Te Whatu Ora Public Hospital",
    funding_status: FundingStatus::Public,
}];

/// Attributed values for a document type, empty when none apply.
pub fn attribution_for(document_type: DocumentType) -> Vec<FieldValue> {
    ATTRIBUTIONS
        .iter()
        .filter(|a| a.document_type == document_type)
        .flat_map(|a| {
            [
                FieldValue::Facility(a.facility.to_string()),
                FieldValue::FundingStatus(a.funding_status),
            ]
        })
        .collect()
}

fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// Accumulates the canonical record and its provenance list.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: CanonicalRecord,
    auto_filled: Vec<CanonicalField>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the addressed field if it is still empty. Returns whether the
    /// value was written.
    pub fn apply(&mut self, value: FieldValue) -> bool {
        let field = value.field();
        let r = &mut self.record;
        let written = match value {
            FieldValue::PatientIdentifier(v) => fill(&mut r.patient_identifier, v),
            FieldValue::ProcedureDate(v) => fill(&mut r.procedure_date, v),
            FieldValue::Gender(v) => fill(&mut r.gender, v),
            FieldValue::AdmissionDate(v) => fill(&mut r.admission_date, v),
            FieldValue::DischargeDate(v) => fill(&mut r.discharge_date, v),
            FieldValue::AdmissionUrgency(v) => fill(&mut r.admission_urgency, v),
            FieldValue::StayType(v) => fill(&mut r.stay_type, v),
            FieldValue::AsaScore(v) => fill(&mut r.asa_score, v),
            FieldValue::HeightCm(v) => fill(&mut r.height_cm, v),
            FieldValue::WeightKg(v) => fill(&mut r.weight_kg, v),
            FieldValue::FinalDiagnosis(v) => fill(&mut r.final_diagnosis, v),
            FieldValue::Procedures(v) => fill(&mut r.procedures, v),
            FieldValue::OperatingTeam(v) => fill(&mut r.operating_team, v),
            FieldValue::OperationStart(v) => fill(&mut details(r).operation_start, v),
            FieldValue::OperationEnd(v) => fill(&mut details(r).operation_end, v),
            FieldValue::BloodLossMl(v) => fill(&mut details(r).blood_loss_ml, v),
            FieldValue::TourniquetMinutes(v) => fill(&mut details(r).tourniquet_minutes, v),
            FieldValue::ClosureMethod(v) => fill(&mut details(r).closure_method, v),
            FieldValue::Drains(v) => fill(&mut details(r).drains, v),
            FieldValue::PostOpInstructions(v) => fill(&mut details(r).post_op_instructions, v),
            FieldValue::FundingStatus(v) => fill(&mut r.funding_status, v),
            FieldValue::Facility(v) => fill(&mut r.facility, v),
            FieldValue::AnaestheticType(v) => fill(&mut r.anaesthetic_type, v),
            FieldValue::Complications(v) => fill(&mut r.complications, v),
        };
        if written && !self.auto_filled.contains(&field) {
            self.auto_filled.push(field);
        }
        written
    }

    pub fn apply_all(&mut self, values: impl IntoIterator<Item = FieldValue>) {
        for value in values {
            self.apply(value);
        }
    }

    pub fn auto_filled(&self) -> &[CanonicalField] {
        &self.auto_filled
    }

    /// The record and the provenance list as JSON key names.
    pub fn finish(self) -> (CanonicalRecord, Vec<String>) {
        let fields = self
            .auto_filled
            .iter()
            .map(|f| f.as_str().to_string())
            .collect();
        (self.record, fields)
    }
}

fn details(record: &mut CanonicalRecord) -> &mut ClinicalDetails {
    record.clinical_details.get_or_insert_with(ClinicalDetails::default)
}
