//! Shared utility functions.

/// Single-line preview of `s` for logs and listings.
///
/// Newlines are collapsed to spaces and the result is cut to at most
/// `max_chars` characters, with `…` appended when anything was dropped.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push('…');
    out
}
