// src/services/fences.rs
//
// Models are told not to wrap generated code in markdown fences, but they
// sometimes do anyway.

const FENCE: &str = "```";

/// Removes at most one opening fence line (e.g. "```python\n") and one
/// closing fence at the end of `text`. Text without fences comes back as is.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text;

    if let Some(rest) = body.strip_prefix(FENCE) {
        if let Some((info, after)) = rest.split_once('\n') {
            if is_info_string(info) {
                body = after;
            }
        }
    }

    if let Some(before) = body.trim_end().strip_suffix(FENCE) {
        body = before;
    }

    body
}

// The language tag after an opening fence: a single word, possibly empty.
fn is_info_string(info: &str) -> bool {
    let info = info.strip_suffix('\r').unwrap_or(info);
    !info.contains('`') && !info.chars().any(char::is_whitespace)
}
