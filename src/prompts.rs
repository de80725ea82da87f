//! Prompt construction for the analysis routes
//!
//! Pure functions: no I/O, no ambient clock. The token route takes `now` as an argument.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::http::iso_timestamp;
use crate::upstream::ChatMessage;

pub const ANALYZE_SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes webpage content.";

// The "EXACTLY this format" wording is kept as deployed; no format follows it.
const TOKEN_SYSTEM_PROMPT: &str = "You're a crypto analyst. Analyze this token using EXACTLY this format. Be concise. Highlight risks.";

/// Messages for `/api/analyze`
pub fn build_analyze_messages(page_content: &str, prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANALYZE_SYSTEM_PROMPT),
        ChatMessage::user(format!("Page Content: {page_content}\n\nPrompt: {prompt}")),
    ]
}

/// Messages for `/api/analyze-token`
pub fn build_token_analysis_messages(token_data: &str, now: DateTime<Utc>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "{TOKEN_SYSTEM_PROMPT} Current UTC: {}",
            iso_timestamp(now)
        )),
        ChatMessage::user(format!(
            "Analyze this token using these metrics:\n{token_data}"
        )),
    ]
}

/// A request field counts as present unless it is absent, `null`, `false`, `0`, or `""`.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Text to interpolate for a field: strings verbatim, anything else as compact JSON
pub fn render_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Look up `key` in a JSON body and render it, if present
pub fn field_text(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .filter(|value| is_present(Some(value)))
        .map(render_field)
}
