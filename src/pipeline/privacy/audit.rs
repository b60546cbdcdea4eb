// Log audit: scans every source file for `tracing` calls that interpolate
// identifier-bearing fields or raw document text. Only redacted text and
// counts may reach the logs.

use std::fs;
use std::path::Path;

/// Field and interpolation patterns that MUST NOT appear in tracing macro
/// arguments.
const SENSITIVE_PATTERNS: &[&str] = &[
    "patient_identifier",
    "procedure_date",
    "admission_date",
    "discharge_date",
    "final_diagnosis",
    "operating_team",
    "complications =",
    ".original",
    "raw_text",
    "extracted_data",
    "%text",
    "?text",
    "text = %",
    "text = ?",
    "payload.text",
    "member.name",
    "procedure.name",
];

/// Files allowed to mention the patterns outside logging.
const ALLOWLIST: &[&str] = &["audit.rs"];

const TRACING_MACROS: &[&str] = &[
    "tracing::info!",
    "tracing::warn!",
    "tracing::error!",
    "tracing::debug!",
    "tracing::trace!",
];

#[test]
fn no_sensitive_fields_in_tracing_calls() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    assert!(src_dir.exists(), "Source directory not found: {}", src_dir.display());

    let mut violations = Vec::new();
    scan_directory(&src_dir, &mut violations);

    if !violations.is_empty() {
        let report = violations
            .iter()
            .map(|(file, line_num, call, pattern)| {
                format!("  {}:{}: found '{}' in: {}", file, line_num, pattern, call)
            })
            .collect::<Vec<_>>()
            .join("\n");
        panic!(
            "LOG AUDIT FAILED: {} violation(s) found in tracing calls:\n{}\n\n\
             Fix: log counts or redacted text only.",
            violations.len(),
            report
        );
    }
}

#[test]
fn scanner_detects_known_violation() {
    let calls = tracing_calls(
        r#"tracing::info!(id = %record.patient_identifier, "merged");"#,
    );
    assert_eq!(calls.len(), 1);
    assert!(SENSITIVE_PATTERNS.iter().any(|p| calls[0].1.contains(p)));
}

#[test]
fn scanner_follows_multiline_calls() {
    let source = "fn f() {\n    tracing::debug!(\n        chars = n,\n        text = %raw,\n        \"page\"\n    );\n}\n";
    let calls = tracing_calls(source);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, 2);
    assert!(calls[0].1.contains("text = %raw"));
}

#[test]
fn scanner_passes_clean_tracing() {
    let calls = tracing_calls(r#"tracing::info!(fields = auto_filled.len(), "merged");"#);
    assert_eq!(calls.len(), 1);
    assert!(!SENSITIVE_PATTERNS.iter().any(|p| calls[0].1.contains(p)));
}

fn scan_directory(dir: &Path, violations: &mut Vec<(String, usize, String, String)>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_directory(&path, violations);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            scan_file(&path, violations);
        }
    }
}

fn scan_file(path: &Path, violations: &mut Vec<(String, usize, String, String)>) {
    let filename = path.file_name().unwrap_or_default().to_string_lossy();
    if ALLOWLIST.iter().any(|a| filename.contains(a)) {
        return;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let relative_path = path
        .strip_prefix(Path::new(env!("CARGO_MANIFEST_DIR")).join("src"))
        .unwrap_or(path)
        .display()
        .to_string();

    for (line_num, call) in tracing_calls(&content) {
        for pattern in SENSITIVE_PATTERNS {
            if call.contains(pattern) {
                violations.push((relative_path.clone(), line_num, call.clone(), pattern.to_string()));
            }
        }
    }
}

/// Collect every tracing macro call with its 1-indexed start line. Calls may
/// span several lines; parentheses are balanced to find the end.
fn tracing_calls(content: &str) -> Vec<(usize, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let mut calls = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let start = TRACING_MACROS.iter().filter_map(|m| line.find(m)).min();
        let Some(start) = start else {
            i += 1;
            continue;
        };

        let first = line[start..].trim();
        let mut call = String::from(first);
        let mut depth = paren_delta(first);

        let mut j = i + 1;
        while depth > 0 && j < lines.len() {
            let next = lines[j].trim();
            call.push(' ');
            call.push_str(next);
            depth += paren_delta(next);
            j += 1;
        }

        calls.push((i + 1, call));
        i = j;
    }
    calls
}

fn paren_delta(s: &str) -> i32 {
    s.chars().fold(0, |depth, ch| match ch {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}
