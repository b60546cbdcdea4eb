/// Clean raw OCR output before it is joined with other pages.
/// Strips control characters (newline and tab survive), trims trailing
/// whitespace per line and drops leading/trailing blank lines. Interior blank
/// lines are kept because extractors use them as section boundaries.
pub fn clean_ocr_text(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let lines: Vec<&str> = filtered.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
