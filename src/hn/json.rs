//! JSON helpers for Hacker News payloads.

use anyhow::Result;

/// Whether a response body carries no data at all.
///
/// The Firebase-backed API answers `null` for unknown items, and some proxies
/// rewrite that to an empty body or `{}`.
pub fn is_empty_payload(body: &str) -> bool {
    matches!(body.trim(), "" | "{}" | "null")
}

/// Parse JSON, and on failure report the serde path, the type mismatch and a
/// snippet of the offending line.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let jd = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(jd).map_err(|err| {
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());
        let path = err.path().to_string();

        let msg = inner.to_string();
        let loc = format!(" at line {line} column {column}");
        let reason = describe_mismatch(msg.strip_suffix(&loc).unwrap_or(&msg));
        let snippet = snippet_around(body, line, column, 20);

        let at_path = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("at path '{path}': ")
        };
        anyhow::anyhow!("{at_path}{reason} (line {line} col {column})\n{snippet}")
    })
}

/// Rewrite "invalid type: X, expected Y" as "expected Y, got X".
fn describe_mismatch(error_msg: &str) -> String {
    if let Some(rest) = error_msg.strip_prefix("invalid type: ")
        && let Some((actual, expected)) = rest.split_once(", expected ")
    {
        return format!("expected {}, got {}", expected.trim(), actual);
    }
    error_msg.to_string()
}

fn snippet_around(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let target_line = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if target_line.is_empty() {
        return "(empty line)".to_string();
    }

    // serde columns are 1-based
    let error_idx = column.saturating_sub(1).min(target_line.len());
    let half_len = context_len / 2;
    let mut start = error_idx.saturating_sub(half_len);
    let mut end = (error_idx + half_len).min(target_line.len());
    while !target_line.is_char_boundary(start) {
        start -= 1;
    }
    while !target_line.is_char_boundary(end) {
        end += 1;
    }

    let indicator = " ".repeat(error_idx - start) + "^";
    format!("...{}...\n   {indicator}", &target_line[start..end])
}
