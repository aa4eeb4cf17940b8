use serde_json::Value;

/// Locate the first balanced JSON object or array in `raw`.
///
/// Tolerates a surrounding fenced code block and leading/trailing prose. String literals are
/// honored, so braces inside them do not affect balancing. A candidate that fails to balance is
/// skipped and scanning resumes at the next `{` or `[`. Returns `None` when no balanced region
/// exists.
pub fn extract_json_region(raw: &str) -> Option<&str> {
    json_regions(raw).next()
}

/// Extract and parse the JSON payload from raw model output.
///
/// Balanced regions that are not valid JSON (bracketed prose such as `[v2]`) are passed over in
/// favor of a later region that parses.
pub fn parse_raw_json(raw: &str) -> Result<Value, String> {
    let mut last_err = None;
    for region in json_regions(raw) {
        match serde_json::from_str(region) {
            Ok(v) => return Ok(v),
            Err(e) => last_err = Some(format!("invalid JSON: {e}")),
        }
    }
    Err(last_err.unwrap_or_else(|| "no balanced JSON object found".to_string()))
}

// Balanced regions in order of their opening bracket.
fn json_regions(raw: &str) -> impl Iterator<Item = &str> {
    let text = strip_fence(raw);
    let mut from = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = text.get(from..)?.find(['{', '[']) {
            let start = from + offset;
            from = start + 1;
            if let Some(end) = balanced_end(text.as_bytes(), start) {
                return Some(&text[start..=end]);
            }
        }
        None
    })
}

// Index of the bracket closing the one at `start`.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack = Vec::<u8>::new();
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
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

fn strip_fence(raw: &str) -> &str {
    let Some(open) = raw.find("```") else {
        return raw;
    };
    let after = &raw[open + 3..];
    // Skip an info string such as `json` up to the end of the line.
    let body_start = after.find('\n').map_or(0, |n| n + 1);
    let body = &after[body_start..];
    match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/extract.rs"]
mod tests;
