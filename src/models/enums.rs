use serde::{Deserialize, Serialize};

/// Failure to parse one of the wire enums from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DocumentType {
    DischargeSummary => "discharge_summary",
    AnaesthesiaRecord => "anaesthesia_record",
    OperationNote => "operation_note",
    Generic => "generic",
});

impl DocumentType {
    /// Human-readable label shown next to the form.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DischargeSummary => "Discharge Summary",
            Self::AnaesthesiaRecord => "Anaesthesia Record",
            Self::OperationNote => "Operation Note",
            Self::Generic => "Generic Document",
        }
    }
}

str_enum!(Confidence {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(Gender {
    Male => "male",
    Female => "female",
});

str_enum!(AdmissionUrgency {
    Acute => "acute",
    Elective => "elective",
});

str_enum!(StayType {
    Inpatient => "inpatient",
    DayCase => "day_case",
});

str_enum!(AnaestheticType {
    General => "general",
    Spinal => "spinal",
    Epidural => "epidural",
    Regional => "regional",
    Sedation => "sedation",
    Local => "local",
});

str_enum!(FundingStatus {
    Public => "public",
    Private => "private",
});

str_enum!(TeamRole {
    Surgeon => "surgeon",
    Assistant => "assistant",
    Anaesthetist => "anaesthetist",
    ScrubNurse => "scrub_nurse",
});

str_enum!(RedactionKind {
    Identifier => "identifier",
    Date => "date",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_type_round_trips_through_str() {
        for ty in [
            DocumentType::DischargeSummary,
            DocumentType::AnaesthesiaRecord,
            DocumentType::OperationNote,
            DocumentType::Generic,
        ] {
            assert_eq!(DocumentType::from_str(ty.as_str()).unwrap(), ty);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = Confidence::from_str("certain").unwrap_err();
        assert_eq!(err.field, "Confidence");
        assert_eq!(err.value, "certain");
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_string(&StayType::DayCase).unwrap();
        assert_eq!(json, "\"day_case\"");
        let json = serde_json::to_string(&DocumentType::AnaesthesiaRecord).unwrap();
        assert_eq!(json, "\"anaesthesia_record\"");
    }

    #[test]
    fn display_names_are_human_readable() {
        assert_eq!(DocumentType::DischargeSummary.display_name(), "Discharge Summary");
        assert_eq!(DocumentType::Generic.display_name(), "Generic Document");
    }
}
