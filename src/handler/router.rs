//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route selection, dispatch and access logging.

use crate::api;
use crate::config::AppState;
use crate::handler::media;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const IMAGE_PREFIX: &str = "/img/";
const AUDIO_PREFIX: &str = "/mp3/";

/// Request context encapsulating information needed by the media handlers
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Handler selected for a request
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Image,
    Audio,
    /// CORS preflight under the API prefix
    Preflight,
    /// Catalog API; carries the path after the prefix
    Api { sub_path: &'a str },
    NotFound,
}

/// Select the handler for `(method, path)`
pub fn route<'a>(method: &Method, path: &'a str, api_prefix: &str) -> Route<'a> {
    if path.starts_with(IMAGE_PREFIX) {
        return Route::Image;
    }
    if path.starts_with(AUDIO_PREFIX) {
        return Route::Audio;
    }

    match path.strip_prefix(api_prefix) {
        Some(sub_path) if sub_path.is_empty() || sub_path.starts_with('/') => {
            if *method == Method::OPTIONS {
                Route::Preflight
            } else {
                Route::Api { sub_path }
            }
        }
        _ => Route::NotFound,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();
    let path = uri.path();

    let media_root = &state.config.store.media_root;
    let media_ctx = || RequestContext {
        path,
        is_head: *method == Method::HEAD,
        range_header: header_value(&req, "range"),
    };

    let response = match route(method, path, &state.config.api.prefix) {
        Route::Image => media::serve_image(&media_ctx(), media_root).await,
        Route::Audio => media::serve_audio(&media_ctx(), media_root).await,
        Route::Preflight => http::build_options_response(),
        Route::Api { sub_path } => api::handle_api(method, sub_path, uri.query(), &state).await,
        Route::NotFound => http::build_404_response(),
    };

    if state.access_log_enabled() {
        log_access(&req, &response, peer_addr, started, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_value(req, "referer");
    entry.user_agent = header_value(req, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, format);
}
