use super::fields;
use super::{DocumentExtractor, PartialRecord};
use crate::models::{
    AnaestheticType, AsaScore, DocumentType, Gender, HeightCm, ProcedureEntry, TeamMember,
    TeamRole, WeightKg,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnaesthesiaRecordFields {
    pub asa_score: Option<AsaScore>,
    pub weight_kg: Option<WeightKg>,
    pub height_cm: Option<HeightCm>,
    pub anaesthetic_type: Option<AnaestheticType>,
    /// Anaesthetists only; other roles on an anaesthetic chart are not
    /// authoritative.
    pub operating_team: Option<Vec<TeamMember>>,
    pub procedures: Option<Vec<ProcedureEntry>>,
    pub gender: Option<Gender>,
}

pub struct AnaesthesiaExtractor;

impl DocumentExtractor for AnaesthesiaExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::AnaesthesiaRecord
    }

    fn extract(&self, text: &str) -> PartialRecord {
        let anaesthetists = fields::operating_team(text).and_then(|team| {
            let kept: Vec<TeamMember> = team
                .into_iter()
                .filter(|m| m.role == TeamRole::Anaesthetist)
                .collect();
            (!kept.is_empty()).then_some(kept)
        });

        PartialRecord::AnaesthesiaRecord(AnaesthesiaRecordFields {
            asa_score: fields::asa_score(text),
            weight_kg: fields::weight(text),
            height_cm: fields::height(text),
            anaesthetic_type: fields::anaesthetic_type(text),
            operating_team: anaesthetists,
            procedures: fields::procedures(text),
            gender: fields::gender(text),
        })
    }
}
