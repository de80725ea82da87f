//! Route handlers
//!
//! Each handler validates its JSON body, builds the messages, and makes the one upstream call.
//! Validation failures are returned as ready responses; upstream failures bubble up as
//! `UpstreamError` for the router to turn into a 500.

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::AppState;
use crate::http;
use crate::prompts::{self, field_text};
use crate::upstream::{ChatMessage, HttpTransport, UpstreamError};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const MISSING_TOKEN_DATA: &str = "Missing token data";
pub const INVALID_CHAT_REQUEST: &str = "Invalid chat request";
pub const MISSING_MESSAGES: &str = "Missing messages";

/// POST /api/analyze
pub async fn analyze<T: HttpTransport>(
    body: &Value,
    state: &AppState<T>,
) -> Result<Response<Full<Bytes>>, UpstreamError> {
    let (Some(page_content), Some(prompt)) =
        (field_text(body, "pageContent"), field_text(body, "prompt"))
    else {
        return Ok(http::build_error_response(
            StatusCode::BAD_REQUEST,
            MISSING_FIELDS,
        ));
    };

    let messages = prompts::build_analyze_messages(&page_content, &prompt);
    let result = state
        .upstream
        .complete(state.api_key.as_deref(), messages)
        .await?;
    Ok(http::build_result_response(&result))
}

/// POST /api/analyze-token
pub async fn analyze_token<T: HttpTransport>(
    body: &Value,
    state: &AppState<T>,
) -> Result<Response<Full<Bytes>>, UpstreamError> {
    let Some(token_data) = field_text(body, "tokenData") else {
        return Ok(http::build_error_response(
            StatusCode::BAD_REQUEST,
            MISSING_TOKEN_DATA,
        ));
    };

    let messages = prompts::build_token_analysis_messages(&token_data, Utc::now());
    let result = state
        .upstream
        .complete(state.api_key.as_deref(), messages)
        .await?;
    Ok(http::build_result_response(&result))
}

const DEFAULT_CHAT_TEMPERATURE: f32 = 0.3;
const DEFAULT_CHAT_MAX_TOKENS: u32 = 500;

/// Absent and `null` parameters both fall back to the defaults
#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

/// POST /api/chat (opt-in): forward a caller-built conversation, return upstream JSON as is
pub async fn chat<T: HttpTransport>(
    body: Value,
    state: &AppState<T>,
) -> Result<Response<Full<Bytes>>, UpstreamError> {
    let Ok(request) = serde_json::from_value::<ChatRequest>(body) else {
        return Ok(http::build_error_response(
            StatusCode::BAD_REQUEST,
            INVALID_CHAT_REQUEST,
        ));
    };
    if request.messages.is_empty() {
        return Ok(http::build_error_response(
            StatusCode::BAD_REQUEST,
            MISSING_MESSAGES,
        ));
    }

    let value = state
        .upstream
        .chat_raw(
            state.api_key.as_deref(),
            request.messages,
            request.temperature.unwrap_or(DEFAULT_CHAT_TEMPERATURE),
            request.max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS),
        )
        .await?;
    Ok(http::json_response(StatusCode::OK, &value))
}
