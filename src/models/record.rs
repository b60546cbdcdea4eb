//! Canonical extracted record: the one schema every extractor fills a subset of.
//!
//! Absence always means "not found". Numeric fields use bounded newtypes whose
//! only constructors check the plausibility range, so a populated value is
//! in range by construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{
    AdmissionUrgency, AnaestheticType, FundingStatus, Gender, StayType, TeamRole,
};

/// Value outside the plausibility range of a bounded field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} value {value} outside {min}..={max}")]
pub struct OutOfBounds {
    pub field: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
}

macro_rules! bounded {
    ($(#[$meta:meta])* $name:ident($inner:ty, $inner_str:literal) in $min:literal ..= $max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = $inner_str)]
        pub struct $name($inner);

        impl $name {
            pub const MIN: $inner = $min;
            pub const MAX: $inner = $max;

            /// `None` when the value is outside the plausibility range.
            pub fn new(value: $inner) -> Option<Self> {
                (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl TryFrom<$inner> for $name {
            type Error = OutOfBounds;

            fn try_from(value: $inner) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| OutOfBounds {
                    field: stringify!($name),
                    value: value.to_string(),
                    min: Self::MIN.to_string(),
                    max: Self::MAX.to_string(),
                })
            }
        }
    };
}

bounded!(
    /// ASA physical status, 1–6.
    AsaScore(u8, "u8") in 1 ..= 6
);
bounded!(
    /// Body weight in kilograms.
    WeightKg(f32, "f32") in 20.0 ..= 300.0
);
bounded!(
    /// Height in centimetres.
    HeightCm(f32, "f32") in 100.0 ..= 250.0
);
bounded!(
    /// Estimated blood loss in millilitres.
    BloodLossMl(u32, "u32") in 0 ..= 10_000
);
bounded!(
    /// Tourniquet time in minutes.
    TourniquetMinutes(u32, "u32") in 0 ..= 300
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: TeamRole,
}

/// Intra-operative details. Times are 24h `HH:MM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_loss_ml: Option<BloodLossMl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tourniquet_minutes: Option<TourniquetMinutes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_op_instructions: Option<String>,
}

impl ClinicalDetails {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The merged, partially populated case record returned for human review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_urgency: Option<AdmissionUrgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stay_type: Option<StayType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asa_score: Option<AsaScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<HeightCm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<WeightKg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedures: Option<Vec<ProcedureEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_team: Option<Vec<TeamMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_details: Option<ClinicalDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_status: Option<FundingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anaesthetic_type: Option<AnaestheticType>,
    /// `Some(vec![])` when the document explicitly states there were none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complications: Option<Vec<String>>,
}
