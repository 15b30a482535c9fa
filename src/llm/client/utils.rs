use serde_json::Value;

/// Pulls the JSON object out of a raw completion.
///
/// Models wrap JSON in markdown fences or surround it with prose often enough
/// that a bare `from_str` is not reliable. Tries the whole payload first, then
/// the outermost `{ ... }` span. Returns `None` when no JSON object is found
/// (a JSON scalar or array does not satisfy the expected schemas either).
pub fn extract_json_object(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed)
        && value.is_object()
    {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}
