//! Field cascades shared by more than one extractor.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::rules::{cascade, clean_value, group, group_f32, is_negative, split_list, FieldRule};
use crate::models::{
    AnaestheticType, AsaScore, Gender, HeightCm, ProcedureEntry, TeamMember, TeamRole, WeightKg,
};

// ── Body measurements ──────────────────────────────────────

/// Units that put a labelled weight outside kilograms.
fn is_non_metric_weight_unit(unit: &str) -> bool {
    matches!(
        unit.to_ascii_lowercase().as_str(),
        "lb" | "lbs" | "pound" | "pounds" | "st" | "stone" | "stones" | "oz" | "g" | "gm" | "gram"
            | "grams"
    )
}

/// A labelled weight is only taken when no other unit follows the number.
fn labelled_weight(caps: &Captures) -> Option<WeightKg> {
    if group(caps, 2).is_some_and(is_non_metric_weight_unit) {
        return None;
    }
    WeightKg::new(group_f32(caps, 1)?)
}

static WEIGHT_RULES: LazyLock<Vec<FieldRule<WeightKg>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)\b(?:weight|wt)\s*[:=\-]?\s*(\d{1,6}(?:\.\d+)?)[ \t]*([a-z]+)?",
            labelled_weight,
        ),
        FieldRule::new(r"(?i)\b(\d{1,3}(?:\.\d+)?)\s*kgs?\b", |c| {
            WeightKg::new(group_f32(c, 1)?)
        }),
    ]
});

pub(crate) fn weight(text: &str) -> Option<WeightKg> {
    cascade(text, &WEIGHT_RULES)
}

static HEIGHT_RULES: LazyLock<Vec<FieldRule<HeightCm>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)\b(?:height|ht)\s*[:=\-]?\s*(\d{2,3}(?:\.\d+)?)\s*(?:cm|centimet(?:er|re)s?)?\b",
            |c| HeightCm::new(group_f32(c, 1)?),
        ),
        FieldRule::new(
            r"(?i)\b(?:height|ht)\s*[:=\-]?\s*(\d\.\d{1,2})\s*(?:m|metres?|meters?)\b",
            |c| HeightCm::new(group_f32(c, 1)? * 100.0),
        ),
        FieldRule::new(r"(?i)\b(\d{3}(?:\.\d+)?)\s*cm\b", |c| {
            HeightCm::new(group_f32(c, 1)?)
        }),
    ]
});

pub(crate) fn height(text: &str) -> Option<HeightCm> {
    cascade(text, &HEIGHT_RULES)
}

// ── ASA ────────────────────────────────────────────────────

fn parse_asa(caps: &Captures) -> Option<AsaScore> {
    let raw = group(caps, 1)?.to_ascii_uppercase();
    let value = match raw.as_str() {
        "I" => 1,
        "II" => 2,
        "III" => 3,
        "IV" => 4,
        "V" => 5,
        "VI" => 6,
        digits => digits.parse().ok()?,
    };
    AsaScore::new(value)
}

static ASA_RULES: LazyLock<Vec<FieldRule<AsaScore>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)\bASA\s*(?:grade|score|class(?:ification)?|status|physical\s+status)?\s*[:=\-]?\s*(VI|IV|V|I{1,3}|\d)E?\b",
            parse_asa,
        ),
        FieldRule::new(
            r"(?i)\bASA\b(?:[ \t]*(?:physical|status|grade|score|class|was|is|of|[:=\-]))+[ \t]*(VI|IV|V|I{1,3}|\d)E?\b",
            parse_asa,
        ),
    ]
});

pub(crate) fn asa_score(text: &str) -> Option<AsaScore> {
    cascade(text, &ASA_RULES)
}

// ── Demographics ───────────────────────────────────────────

fn parse_gender(caps: &Captures) -> Option<Gender> {
    match group(caps, 1)?.to_ascii_lowercase().as_str() {
        "male" | "m" | "man" | "gentleman" | "boy" => Some(Gender::Male),
        "female" | "f" | "woman" | "lady" | "girl" => Some(Gender::Female),
        _ => None,
    }
}

static GENDER_RULES: LazyLock<Vec<FieldRule<Gender>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(r"(?i)\b(?:sex|gender)\s*[:=\-]\s*(male|female|m|f)\b", parse_gender),
        FieldRule::new(
            r"(?i)\b\d{1,3}\s*(?:yo|y/o|yrs?|years?[- ]old)\s+(male|female|man|woman|gentleman|lady|boy|girl)\b",
            parse_gender,
        ),
    ]
});

pub(crate) fn gender(text: &str) -> Option<Gender> {
    cascade(text, &GENDER_RULES)
}

// ── Diagnosis ──────────────────────────────────────────────

fn labelled_value(caps: &Captures) -> Option<String> {
    clean_value(group(caps, 1)?)
}

static DIAGNOSIS_RULES: LazyLock<Vec<FieldRule<String>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?im)^[ \t]*(?:final|principal|primary|discharge|post-?op(?:erative)?|pre-?op(?:erative)?)?[ \t]*diagnos[ie]s[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            labelled_value,
        ),
        FieldRule::new(
            r"(?im)^[ \t]*indications?(?:[ \t]+for[ \t]+surgery)?[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            labelled_value,
        ),
        FieldRule::new(
            r"(?im)^[ \t]*(?:presenting[ \t]+complaint|reason[ \t]+for[ \t]+admission)[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            labelled_value,
        ),
    ]
});

pub(crate) fn diagnosis(text: &str) -> Option<String> {
    cascade(text, &DIAGNOSIS_RULES)
}

// ── Procedures ─────────────────────────────────────────────

static PROCEDURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:procedures?|operations?)(?:[ \t]+performed)?[ \t]*[:\-][ \t]*(\S[^\n]*)$",
    )
    .unwrap()
});

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\(([^)]*)\)\s*(.*)$").unwrap());

/// Split one procedure into name and parenthetical notes.
fn procedure_entry(raw: &str) -> Option<ProcedureEntry> {
    if let Some(caps) = PARENTHETICAL.captures(raw) {
        let head = caps.get(1).map_or("", |m| m.as_str());
        let tail = caps.get(3).map_or("", |m| m.as_str());
        let name = clean_value(&format!("{head} {tail}"))?;
        return Some(ProcedureEntry {
            name,
            notes: caps.get(2).and_then(|m| clean_value(m.as_str())),
        });
    }
    Some(ProcedureEntry {
        name: clean_value(raw)?,
        notes: None,
    })
}

/// Every procedure listed on `Procedure:` / `Operation:` lines, split on `;`
/// and `+`, in document order, without duplicates.
pub(crate) fn procedures(text: &str) -> Option<Vec<ProcedureEntry>> {
    let mut entries: Vec<ProcedureEntry> = Vec::new();
    for caps in PROCEDURE_LINE.captures_iter(text) {
        let Some(line) = caps.get(1) else { continue };
        for part in line.as_str().split([';', '+']) {
            if let Some(entry) = procedure_entry(part) {
                if !entries.iter().any(|e| e.name.eq_ignore_ascii_case(&entry.name)) {
                    entries.push(entry);
                }
            }
        }
    }
    (!entries.is_empty()).then_some(entries)
}

// ── Operating team ─────────────────────────────────────────

static TEAM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(consultant[ \t]+surgeon|operating[ \t]+surgeon|assistant[ \t]+surgeon|surgeon|assistant|anaesthetist|anesthetist|scrub[ \t]+nurse)s?[ \t]*[:\-][ \t]*(\S[^\n]*)$",
    )
    .unwrap()
});

/// Longest plausible person name.
const MAX_NAME_LEN: usize = 60;

fn team_role(label: &str) -> Option<TeamRole> {
    let lower = label.to_ascii_lowercase();
    if lower.starts_with("assistant") {
        Some(TeamRole::Assistant)
    } else if lower.contains("surgeon") {
        Some(TeamRole::Surgeon)
    } else if lower.starts_with("anaesthetist") || lower.starts_with("anesthetist") {
        Some(TeamRole::Anaesthetist)
    } else if lower.starts_with("scrub") {
        Some(TeamRole::ScrubNurse)
    } else {
        None
    }
}

/// Team members from role-labelled lines.
pub(crate) fn operating_team(text: &str) -> Option<Vec<TeamMember>> {
    let mut team: Vec<TeamMember> = Vec::new();
    for caps in TEAM_LINE.captures_iter(text) {
        let Some(role) = group(&caps, 1).and_then(team_role) else { continue };
        let Some(names) = group(&caps, 2) else { continue };
        if is_negative(names) {
            continue;
        }
        for name in split_list(names) {
            if name.chars().count() > MAX_NAME_LEN || !name.chars().any(char::is_alphabetic) {
                continue;
            }
            let duplicate = team
                .iter()
                .any(|m| m.role == role && m.name.eq_ignore_ascii_case(&name));
            if !duplicate {
                team.push(TeamMember { name, role });
            }
        }
    }
    (!team.is_empty()).then_some(team)
}

// ── Complications ──────────────────────────────────────────

static COMPLICATION_RULES: LazyLock<Vec<FieldRule<Vec<String>>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?im)^[ \t]*(?:intra-?operative[ \t]+|post-?operative[ \t]+)?(?:complications?|adverse[ \t]+events?)[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            |c| {
                let value = group(c, 1)?;
                if is_negative(value) {
                    return Some(Vec::new());
                }
                let items = split_list(value);
                (!items.is_empty()).then_some(items)
            },
        ),
        FieldRule::new(
            r"(?i)\bno\s+(?:intra-?operative\s+|immediate\s+|post-?operative\s+)?complications\b",
            |_| Some(Vec::new()),
        ),
    ]
});

/// `Some(vec![])` when the document explicitly reports none.
pub(crate) fn complications(text: &str) -> Option<Vec<String>> {
    cascade(text, &COMPLICATION_RULES)
}

// ── Anaesthetic type ───────────────────────────────────────

/// Map a phrase to an anaesthetic type, most specific technique first.
fn anaesthetic_from_phrase(phrase: &str) -> Option<AnaestheticType> {
    const KEYWORDS: &[(&str, AnaestheticType)] = &[
        ("general", AnaestheticType::General),
        ("ga", AnaestheticType::General),
        ("spinal", AnaestheticType::Spinal),
        ("epidural", AnaestheticType::Epidural),
        ("regional", AnaestheticType::Regional),
        ("block", AnaestheticType::Regional),
        ("sedation", AnaestheticType::Sedation),
        ("local", AnaestheticType::Local),
        ("la", AnaestheticType::Local),
    ];
    let lower = phrase.to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| words.contains(keyword))
        .map(|(_, ty)| *ty)
}

fn anaesthetic_from_group(caps: &Captures) -> Option<AnaestheticType> {
    anaesthetic_from_phrase(group(caps, 1)?)
}

static ANAESTHETIC_RULES: LazyLock<Vec<FieldRule<AnaestheticType>>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?im)^[ \t]*(?:type[ \t]+of[ \t]+)?(?:anaesthe(?:tic|sia)|anesthe(?:tic|sia))(?:[ \t]+type)?[ \t]*[:\-][ \t]*(\S[^\n]*)$",
            anaesthetic_from_group,
        ),
        FieldRule::new(r"(?i)\b(general)\s+an(?:a)?esthe", anaesthetic_from_group),
        FieldRule::new(r"\b(GA)\b", anaesthetic_from_group),
        FieldRule::new(r"(?i)\b(spinal)\b", anaesthetic_from_group),
        FieldRule::new(r"(?i)\b(epidural)\b", anaesthetic_from_group),
        FieldRule::new(r"(?i)\b(regional|nerve\s+block|plexus\s+block)\b", anaesthetic_from_group),
        FieldRule::new(r"(?i)\b(sedation)\b", anaesthetic_from_group),
        FieldRule::new(r"(?i)\b(local)\s+an(?:a)?esthe", anaesthetic_from_group),
    ]
});

pub(crate) fn anaesthetic_type(text: &str) -> Option<AnaestheticType> {
    cascade(text, &ANAESTHETIC_RULES)
}
