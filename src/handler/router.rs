//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, body parsing,
//! route matching, and turning upstream failures into 500 responses.

use crate::config::{AppState, RoutesConfig};
use crate::handler::routes;
use crate::http;
use crate::logger;
use crate::upstream::{HttpTransport, UpstreamError};
use chrono::Utc;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;

pub const INVALID_JSON: &str = "Invalid JSON in request body";

/// Routes served by the POST dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Analyze,
    AnalyzeToken,
    Chat,
    NotFound,
}

impl Route {
    pub fn resolve(path: &str, routes: &RoutesConfig) -> Self {
        match path {
            "/api/analyze" => Self::Analyze,
            "/api/analyze-token" => Self::AnalyzeToken,
            "/api/chat" if routes.enable_chat => Self::Chat,
            _ => Self::NotFound,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B, T>(
    req: Request<B>,
    state: Arc<AppState<T>>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
    T: HttpTransport,
{
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method()) {
        return Ok(resp);
    }

    // 2. Check declared body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return Ok(resp);
    }

    let route = Route::resolve(req.uri().path(), &state.config.routes);

    // 3. Read the body (capped, whatever the framing) and parse it as JSON
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large: over {max_body_size} bytes"
            ));
            return Ok(http::build_413_response());
        }
        Err(e) => {
            logger::log_error(&format!("Error reading request body: {e}"));
            return Ok(http::build_error_response(
                StatusCode::BAD_REQUEST,
                INVALID_JSON,
            ));
        }
    };
    let body: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            logger::log_error(&format!("Error parsing request body: {e}"));
            return Ok(http::build_error_response(
                StatusCode::BAD_REQUEST,
                INVALID_JSON,
            ));
        }
    };
    logger::log_request_body(&body);

    // 4. Dispatch
    let outcome = match route {
        Route::Analyze => routes::analyze(&body, &state).await,
        Route::AnalyzeToken => routes::analyze_token(&body, &state).await,
        Route::Chat => routes::chat(body, &state).await,
        Route::NotFound => Ok(http::build_404_response()),
    };

    Ok(outcome.unwrap_or_else(|e| internal_error(&e)))
}

/// OPTIONS short-circuits with the preflight response; anything but POST is rejected
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::POST => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let size = content_length.to_str().ok()?.parse::<u64>().ok()?;
    if size > max_body_size {
        logger::log_error(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}

fn internal_error(err: &UpstreamError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("Request failed: {err}"));
    http::build_500_response(&err.to_string(), Some(&format!("{err:?}")), Utc::now())
}
