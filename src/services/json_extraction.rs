//! Locate a structured payload inside a free-form backend reply.
//!
//! Backends wrap JSON in markdown fences or surround it with prose even when
//! told not to. Extraction tries fenced blocks first, then scans for the
//! first balanced `{...}` or `[...]` that parses and could carry elements.
//! Bracketed prose such as `see [1]` is skipped.

use serde_json::Value;

/// Extract the first well-formed JSON object, or array holding at least one
/// object, from `reply`.
pub fn extract_structured_block(reply: &str) -> Option<Value> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if is_candidate_shaped(&value) {
            return Some(value);
        }
    }

    for block in fenced_blocks(trimmed) {
        if let Some(value) = first_balanced(block) {
            return Some(value);
        }
    }

    first_balanced(trimmed)
}

/// Bodies of markdown code fences, in order.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        // Skip the info string (e.g. "json") up to the end of the line.
        let body_start = after_open.find('\n').map_or(0, |n| n + 1);
        let body = &after_open[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => {
                blocks.push(body);
                break;
            }
        }
    }
    blocks
}

/// An object, or an array with at least one object in it.
fn is_candidate_shaped(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(Value::is_object),
        _ => false,
    }
}

/// Scan for the first balanced object/array that parses as JSON and is
/// candidate-shaped.
fn first_balanced(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find(['{', '[']) {
        let begin = start + offset;
        if let Some(end) = balanced_end(bytes, begin) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[begin..=end]) {
                if is_candidate_shaped(&value) {
                    return Some(value);
                }
            }
        }
        start = begin + 1;
    }
    None
}

/// Index of the bracket closing the one at `begin`, string-aware.
fn balanced_end(bytes: &[u8], begin: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(begin) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
