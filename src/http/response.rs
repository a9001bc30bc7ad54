//! HTTP response building module
//!
//! Builders for media and JSON responses. Builders never panic: a build
//! failure is logged and replaced with a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use super::range::ByteRange;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
pub const CONTENT_TYPE_MPEG: &str = "audio/mpeg";

const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// Attach the CORS headers every JSON-branch response carries
fn with_cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type")
}

/// Build JSON response with CORS headers
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response();
        }
    };

    with_cors(Response::builder())
        .status(status)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .header("Content-Length", json.len())
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    json_response(StatusCode::NOT_FOUND, &json!({ "message": "Not Found" }))
}

/// Build 500 response with the generic payload
pub fn build_500_response() -> Response<Full<Bytes>> {
    let body = r#"{"message":"Server Error"}"#;
    with_cors(Response::builder())
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Add the `Allow` header to a 405 response
pub fn with_allow_header(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    response.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Build OPTIONS response (CORS preflight): empty body, no `Content-Type`
pub fn build_options_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder())
        .status(StatusCode::OK)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"))
        .header("Accept-Ranges", "bytes")
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// Build 200 response for a whole media file
pub fn build_media_response(
    data: Bytes,
    content_type: &str,
    total_size: u64,
    accept_ranges: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", total_size);
    if accept_ranges {
        builder = builder.header("Accept-Ranges", "bytes");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    range: ByteRange,
    total_size: u64,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header(
            "Content-Range",
            format!("bytes {}-{}/{total_size}", range.start, range.end),
        )
        .header("Accept-Ranges", "bytes")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_json_response_has_cors() {
        let resp = json_response(StatusCode::OK, &json!([1, 2]));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-type"), Some("application/json"));
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&resp, "access-control-allow-methods"), Some("GET, OPTIONS"));
        assert_eq!(header(&resp, "access-control-allow-headers"), Some("Content-Type"));
    }

    #[test]
    fn test_options_has_cors_and_no_content_type() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&resp, "access-control-allow-methods"), Some("GET, OPTIONS"));
        assert!(header(&resp, "content-type").is_none());
    }

    #[test]
    fn test_partial_headers() {
        let range = ByteRange { start: 10, end: 19 };
        let resp = build_partial_response(Bytes::from(vec![0u8; 10]), CONTENT_TYPE_MPEG, range, 50, false);
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&resp, "content-range"), Some("bytes 10-19/50"));
        assert_eq!(header(&resp, "content-length"), Some("10"));
        assert_eq!(header(&resp, "accept-ranges"), Some("bytes"));
        assert_eq!(header(&resp, "content-type"), Some("audio/mpeg"));
    }

    #[test]
    fn test_416_headers() {
        let resp = build_416_response(42);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&resp, "content-range"), Some("bytes */42"));
    }

    #[test]
    fn test_405_allow_header() {
        let resp = with_allow_header(json_response(StatusCode::METHOD_NOT_ALLOWED, &json!({})));
        assert_eq!(header(&resp, "allow"), Some("GET, OPTIONS"));
    }
}
