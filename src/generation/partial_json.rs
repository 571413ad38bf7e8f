//! Best-effort completion of truncated JSON.
//!
//! Streaming responses hand us a JSON document cut off at an arbitrary byte.
//! `parse_partial` closes whatever is dangling (string, array, object) so the
//! prefix parses, which is what lets the relay emit a usable partial object
//! after every delta instead of waiting for the full document.

use serde_json::Value;

/// Parse a possibly truncated JSON fragment.
///
/// Returns `None` when the fragment can't be made parseable (for example cut
/// mid-key or mid-literal); callers just wait for the next delta.
pub fn parse_partial(fragment: &str) -> Option<Value> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return None;
    }
    serde_json::from_str(fragment)
        .ok()
        .or_else(|| serde_json::from_str(&close_fragment(fragment)).ok())
}

/// Append the closers a truncated fragment is missing.
fn close_fragment(fragment: &str) -> String {
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in fragment.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut repaired = fragment.to_string();

    if in_string {
        if escaped {
            // A lone trailing backslash would escape our closing quote.
            repaired.pop();
        }
        repaired.push('"');
    } else {
        while repaired.ends_with(|c: char| c.is_whitespace()) {
            repaired.pop();
        }
        if repaired.ends_with(',') {
            repaired.pop();
        } else if repaired.ends_with(':') {
            repaired.push_str(" null");
        }
    }

    for closer in closers.into_iter().rev() {
        repaired.push(closer);
    }
    repaired
}
