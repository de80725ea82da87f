//! HTTP response building module
//!
//! Every builder stamps the CORS origin header so browser callers can read error bodies too.

use chrono::{DateTime, SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// ISO-8601 UTC with millisecond precision, e.g. `2025-01-02T03:04:05.000Z`
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .header("Access-Control-Allow-Methods", ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "Not found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

fn build_text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(text)))
        })
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return raw_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Internal server error"}"#.to_string(),
            );
        }
    };
    raw_json_response(status, json)
}

fn raw_json_response(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

/// `{"error": message}` with the given status
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorBody {
            error: message,
            details: None,
            timestamp: None,
        },
    )
}

/// 500 with `{"error", "details", "timestamp"}`
pub fn build_500_response(
    message: &str,
    details: Option<&str>,
    now: DateTime<Utc>,
) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorBody {
            error: message,
            details,
            timestamp: Some(iso_timestamp(now)),
        },
    )
}

/// Build 200 `{"result": text}` response
pub fn build_result_response(result: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "result": result }))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_iso_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 7, 6).unwrap();
        assert_eq!(iso_timestamp(now), "2024-03-09T08:07:06.000Z");
    }

    #[tokio::test]
    async fn test_options_response() {
        let resp = build_options_response();
        assert_eq!(resp.status(), 204);
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
        assert_eq!(
            header(&resp, "access-control-allow-methods"),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            header(&resp, "access-control-allow-headers"),
            Some("Content-Type")
        );
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_responses_carry_cors() {
        for (resp, status) in [(build_404_response(), 404_u16), (build_405_response(), 405_u16)] {
            assert_eq!(resp.status(), status);
            assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
            assert!(header(&resp, "content-type")
                .unwrap()
                .starts_with("text/plain"));
        }
        assert_eq!(body_string(build_405_response()).await, "Method not allowed");
        assert_eq!(body_string(build_404_response()).await, "Not found");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let resp = build_error_response(StatusCode::BAD_REQUEST, "Missing token data");
        assert_eq!(resp.status(), 400);
        assert_eq!(header(&resp, "content-type"), Some("application/json"));
        assert_eq!(body_string(resp).await, r#"{"error":"Missing token data"}"#);
    }

    #[tokio::test]
    async fn test_500_body_shape() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let resp = build_500_response("boom", Some("trace"), now);
        assert_eq!(resp.status(), 500);
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["error"], "boom");
        assert_eq!(body["details"], "trace");
        assert_eq!(body["timestamp"], "2024-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_result_body_is_compact() {
        let resp = build_result_response("A summary.");
        assert_eq!(body_string(resp).await, r#"{"result":"A summary."}"#);
    }
}
