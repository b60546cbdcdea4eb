use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

const MONTH_NAMES: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Any supported date form, without capture groups, for embedding in
/// larger patterns: ISO `yyyy-mm-dd`, numeric `d/m/y` (`/`, `-` or `.`), and
/// `d Month y` with optional ordinal suffix.
pub(crate) static DATE_BODY: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"(?:\d{{4}}-\d{{1,2}}-\d{{1,2}}|\d{{1,2}}[/.\-]\d{{1,2}}[/.\-](?:\d{{4}}|\d{{2}})|\d{{1,2}}(?:st|nd|rd|th)?[\s\-]+(?:{MONTH_NAMES})\.?,?[\s\-]+(?:\d{{4}}|\d{{2}}))"
    )
});

/// Unlabelled date anywhere in the text.
pub(crate) static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{}\b", *DATE_BODY)).unwrap());

static ISO_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

static NUMERIC_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$").unwrap()
});

static NAMED_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?[\s\-]+([a-z]+)\.?,?[\s\-]+(\d{4}|\d{2})$")
        .unwrap()
});

/// Keyword-anchored date rules for the procedure date, tried in order.
static PROCEDURE_DATE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"date\s+of\s+(?:surgery|operation|procedure)",
        r"(?:operation|procedure|surgery|surgical)\s+date",
        r"start\s+case",
        r"date\s+of\s+admission|admission\s+date|admission|admitted(?:\s+on)?",
    ]
    .iter()
    .map(|label| labelled_date_pattern(label))
    .collect()
});

/// Build a pattern capturing the date that follows `label`.
pub(crate) fn labelled_date_pattern(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?i)\b(?:{label})\s*(?:on|:|-|=)?\s*({})\b",
        *DATE_BODY
    ))
    .unwrap()
}

/// First date captured by the rules, in rule order, that normalizes.
/// A rule whose match does not normalize falls through to the next rule.
pub(crate) fn first_labelled_date(text: &str, rules: &[Regex]) -> Option<NaiveDate> {
    rules.iter().find_map(|rule| {
        rule.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| normalize_date(m.as_str()))
    })
}

/// Procedure date: keyword-anchored dates first, then the first date
/// anywhere in the text.
pub fn extract_procedure_date(text: &str) -> Option<NaiveDate> {
    if let Some(date) = first_labelled_date(text, &PROCEDURE_DATE_RULES) {
        return Some(date);
    }
    DATE.find(text).and_then(|m| normalize_date(m.as_str()))
}

/// Parse one matched date string into a calendar date.
///
/// Accepts ISO, numeric day/month/year and day-monthname-year. Two-digit
/// years pivot at 50 (`49` → 2049, `50` → 1950). Returns `None` for anything
/// unparseable or not on the calendar.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    if let Some(caps) = ISO_FORM.captures(trimmed) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    if let Some(caps) = NUMERIC_FORM.captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = NAMED_FORM.captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = expand_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if year < 50 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

/// Month number from a full or abbreviated English month name.
fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december",
    ];
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|full| full.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalizes_numeric_day_first() {
        assert_eq!(normalize_date("01/12/2025"), Some(ymd(2025, 12, 1)));
        assert_eq!(normalize_date("1-2-2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(normalize_date("15.03.2026"), Some(ymd(2026, 3, 15)));
    }

    #[test]
    fn two_digit_year_pivot() {
        assert_eq!(normalize_date("14/03/26"), Some(ymd(2026, 3, 14)));
        assert_eq!(normalize_date("14/03/49"), Some(ymd(2049, 3, 14)));
        assert_eq!(normalize_date("14/03/50"), Some(ymd(1950, 3, 14)));
        assert_eq!(normalize_date("14/03/99"), Some(ymd(1999, 3, 14)));
    }

    #[test]
    fn normalizes_month_names() {
        assert_eq!(normalize_date("15 March 2026"), Some(ymd(2026, 3, 15)));
        assert_eq!(normalize_date("1st Jan 2025"), Some(ymd(2025, 1, 1)));
        assert_eq!(normalize_date("3-Sept-24"), Some(ymd(2024, 9, 3)));
        assert_eq!(normalize_date("22nd dec. 2025"), Some(ymd(2025, 12, 22)));
    }

    #[test]
    fn normalizes_iso() {
        assert_eq!(normalize_date("2026-03-15"), Some(ymd(2026, 3, 15)));
    }

    #[test]
    fn invalid_calendar_dates_are_absent() {
        assert_eq!(normalize_date("31/02/2026"), None);
        assert_eq!(normalize_date("12/13/2026"), None);
        assert_eq!(normalize_date("00/01/2026"), None);
        assert_eq!(normalize_date("15 Smarch 2026"), None);
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date("99999999999/1/2020"), None);
    }

    #[test]
    fn labelled_date_beats_earlier_unlabelled_date() {
        let text = "DOB 02/02/1960\nDate of surgery: 14/03/2026";
        assert_eq!(extract_procedure_date(text), Some(ymd(2026, 3, 14)));
    }

    #[test]
    fn label_order_is_respected() {
        let text = "Admission: 10/03/2026\nStart case 12/03/2026 08:30";
        assert_eq!(extract_procedure_date(text), Some(ymd(2026, 3, 12)));
    }

    #[test]
    fn admission_label_is_used() {
        let text = "Discharge Summary\nDHB\nAdmission: 01/12/2025\nDiagnosis: Cellulitis";
        assert_eq!(extract_procedure_date(text), Some(ymd(2025, 12, 1)));
    }

    #[test]
    fn falls_back_to_first_unlabelled_date() {
        assert_eq!(
            extract_procedure_date("XYZ1234 patient seen 15 March 2026"),
            Some(ymd(2026, 3, 15))
        );
    }

    #[test]
    fn invalid_labelled_date_falls_through() {
        let text = "Date of surgery: 31/02/2026\nAdmitted on 27/02/2026";
        assert_eq!(extract_procedure_date(text), Some(ymd(2026, 2, 27)));
    }

    #[test]
    fn unparseable_first_date_yields_absence() {
        assert_eq!(extract_procedure_date("seen 31/02/2026"), None);
    }

    #[test]
    fn no_date_is_absent() {
        assert_eq!(extract_procedure_date("no dates here"), None);
        assert_eq!(extract_procedure_date(""), None);
    }
}
