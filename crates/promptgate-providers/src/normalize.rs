//! Response normalizer: turns any upstream reply body into plain text.
//!
//! Providers answer with incompatible shapes. [`normalize`] applies a fixed
//! extraction order and always yields a string:
//!
//! 1. a JSON string → trimmed as-is
//! 2. `result[0].response` / `result[0].message`
//! 3. top-level `response`, `text`, `message`, `content` (first present)
//! 4. `choices[0].text` / `choices[0].message.content`
//! 5. otherwise the pretty-printed JSON
//!
//! Fields that are `null` or blank strings are skipped. `null` (and anything
//! that would print as `null`) becomes [`NO_RESPONSE`].

use serde_json::Value;

/// Substituted whenever a reply carries no usable content.
pub const NO_RESPONSE: &str = "No response received";

/// Substituted if a reply cannot be rendered as text at all.
pub const UNREADABLE_RESPONSE: &str = "Unreadable response received";

/// Top-level fields checked by step 3, in priority order.
const DIRECT_FIELDS: &[&str] = &["response", "text", "message", "content"];

/// Fields checked on the first `result` element by step 2.
const RESULT_FIELDS: &[&str] = &["response", "message"];

/// Extract one plain-text answer from a raw reply body. Total: never panics.
pub fn normalize(raw_body: &Value) -> String {
    if let Value::String(s) = raw_body {
        return s.trim().to_string();
    }

    extract_from_result(raw_body)
        .or_else(|| first_present(raw_body, DIRECT_FIELDS))
        .or_else(|| extract_from_choices(raw_body))
        .map(render)
        .unwrap_or_else(|| render(raw_body))
}

/// `{"result": [{"response": ..}]}`: the first element must expose a field.
fn extract_from_result(body: &Value) -> Option<&Value> {
    let first = body.get("result")?.as_array()?.first()?;
    first_present(first, RESULT_FIELDS)
}

/// Chat-completion style: `choices[0].text` or `choices[0].message.content`.
fn extract_from_choices(body: &Value) -> Option<&Value> {
    let first = body.get("choices")?.as_array()?.first()?;
    present(first.get("text")).or_else(|| present(first.get("message")?.get("content")))
}

fn first_present<'a>(body: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().find_map(|field| present(body.get(*field)))
}

/// A field counts as present when it exists, is not `null` and is not a
/// blank string.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// Strings pass through; everything else is pretty-printed.
fn render(value: &Value) -> String {
    match value {
        Value::Null => NO_RESPONSE.to_string(),
        Value::String(s) => s.clone(),
        other => match serde_json::to_string_pretty(other) {
            Ok(text) if text == "null" => NO_RESPONSE.to_string(),
            Ok(text) => text,
            Err(_) => UNREADABLE_RESPONSE.to_string(),
        },
    }
}
