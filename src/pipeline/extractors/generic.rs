use super::fields;
use super::{DocumentExtractor, PartialRecord};
use crate::models::{AsaScore, DocumentType, Gender, HeightCm, ProcedureEntry, WeightKg};

/// Facilities recognised by name, in canonical casing. Matched as
/// case-insensitive substrings; anything not listed is left empty.
pub const KNOWN_FACILITIES: &[&str] = &[
    "Auckland City Hospital",
    "Middlemore Hospital",
    "North Shore Hospital",
    "Waitakere Hospital",
    "Waikato Hospital",
    "Tauranga Hospital",
    "Rotorua Hospital",
    "Whangarei Hospital",
    "Hawke's Bay Hospital",
    "Palmerston North Hospital",
    "Whanganui Hospital",
    "Taranaki Base Hospital",
    "Wellington Regional Hospital",
    "Hutt Hospital",
    "Nelson Hospital",
    "Christchurch Hospital",
    "Timaru Hospital",
    "Dunedin Hospital",
    "Southland Hospital",
    "Mercy Hospital",
    "Ascot Hospital",
    "Southern Cross Hospital",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericFields {
    pub asa_score: Option<AsaScore>,
    pub weight_kg: Option<WeightKg>,
    pub height_cm: Option<HeightCm>,
    pub final_diagnosis: Option<String>,
    pub procedures: Option<Vec<ProcedureEntry>>,
    pub gender: Option<Gender>,
    pub complications: Option<Vec<String>>,
    pub facility: Option<String>,
}

pub struct GenericExtractor;

impl DocumentExtractor for GenericExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::Generic
    }

    fn extract(&self, text: &str) -> PartialRecord {
        PartialRecord::Generic(GenericFields {
            asa_score: fields::asa_score(text),
            weight_kg: fields::weight(text),
            height_cm: fields::height(text),
            final_diagnosis: fields::diagnosis(text),
            procedures: fields::procedures(text),
            gender: fields::gender(text),
            complications: fields::complications(text),
            facility: known_facility(text),
        })
    }
}

/// First listed facility whose name appears in the text.
pub fn known_facility(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    KNOWN_FACILITIES
        .iter()
        .find(|name| lowered.contains(&name.to_lowercase()))
        .map(|name| name.to_string())
}
