//! Recovery of a JSON array from noisy model output.
//!
//! Instruct-tuned models routinely wrap JSON in markdown fences, prefix it
//! with a role label ("Assistant: ..."), or append commentary after the
//! closing bracket. `recover_array_text` peels all of that off and returns
//! the first bracket-delimited array-shaped substring, leaving parsing and
//! validation to the caller. Pure function — unit-tested against real noisy
//! outputs with no network involved.

/// Role labels models sometimes prepend despite instructions.
/// Matched case-insensitively at the start of the (trimmed) output.
const ROLE_LABELS: &[&str] = &["assistant:", "ai:", "bot:", "answer:", "output:", "json:"];

/// Extracts the first array-shaped substring from raw model output.
///
/// Steps: trim → strip a leading role label → strip markdown code fences →
/// scan for the first top-level `[...]` span (quote- and escape-aware, so
/// brackets inside string values don't terminate the scan).
///
/// Returns `None` when no complete array span exists. Idempotent: feeding the
/// recovered text back in returns the same span.
pub fn recover_array_text(raw: &str) -> Option<&str> {
    let text = strip_role_label(raw.trim());
    let text = strip_code_fences(text);
    extract_array_span(text)
}

fn strip_role_label(text: &str) -> &str {
    let lower = text.to_lowercase();
    for label in ROLE_LABELS {
        if lower.starts_with(label) {
            return text[label.len()..].trim_start();
        }
    }
    text
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Finds the first balanced `[...]` span, ignoring brackets inside JSON
/// string literals.
fn extract_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    // Unbalanced — truncated output, caller counts it as a failed attempt.
    None
}
