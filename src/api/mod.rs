// API module entry
// Catalog JSON API: query parsing, dispatch and error translation

mod query;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use serde_json::Value;

use crate::config::AppState;
use crate::error::ApiError;
use crate::http;
use crate::logger;

pub use query::{decode, parse_query};

/// Handle a request under the API prefix
///
/// `sub_path` is the request path with the prefix removed (`""`, `"/"` or `"/<id>"`).
pub async fn handle_api(
    method: &Method,
    sub_path: &str,
    raw_query: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match dispatch(method, sub_path, raw_query, state).await {
        Ok(body) => http::json_response(StatusCode::OK, &body),
        Err(err) => error_response(&err),
    }
}

async fn dispatch(
    method: &Method,
    sub_path: &str,
    raw_query: Option<&str>,
    state: &AppState,
) -> Result<Value, ApiError> {
    if *method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    if sub_path.is_empty() || sub_path == "/" {
        let params = parse_query(raw_query.unwrap_or_default());
        let tracks = state.catalog.list(&params).await?;
        logger::log_debug(&format!("Listed {} tracks", tracks.len()));
        return Ok(serde_json::to_value(tracks)?);
    }

    let id = decode(sub_path.trim_start_matches('/'));
    let track = state.catalog.get(&id).await?;
    Ok(serde_json::to_value(track)?)
}

/// Translate an error into its HTTP response. Only domain errors reach the
/// client with their own payload; everything else is logged and reported as 500.
pub fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    if !err.is_domain() {
        logger::log_error(&err.to_string());
    }

    let response = http::json_response(err.status(), &err.payload());
    match err {
        ApiError::MethodNotAllowed => http::with_allow_header(response),
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{sample_store, write_store};
    use crate::config::Config;
    use http_body_util::BodyExt;

    fn state_with_store(db_file: &std::path::Path) -> AppState {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.store.db_file = db_file.to_string_lossy().into_owned();
        AppState::new(&cfg)
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_root_paths() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&write_store(dir.path(), &sample_store()));

        for sub_path in ["", "/"] {
            let resp = handle_api(&Method::GET, sub_path, None, &state).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_json(resp).await.as_array().unwrap().len(), 4);
        }
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&write_store(dir.path(), &sample_store()));

        let resp = handle_api(&Method::GET, "", Some("search=massive%20ATTACK"), &state).await;
        let body = body_json(resp).await;
        let tracks = body.as_array().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0]["id"], "3");
    }

    #[tokio::test]
    async fn test_get_item() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&write_store(dir.path(), &sample_store()));

        let resp = handle_api(&Method::GET, "/2", None, &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "id": "2", "artist": "Portishead", "track": "Roads", "mp3": "mp3/2.mp3" })
        );
    }

    #[tokio::test]
    async fn test_missing_item() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&write_store(dir.path(), &sample_store()));

        let resp = handle_api(&Method::GET, "/404", None, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, serde_json::json!({ "message": "Item Not Found" }));
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&write_store(dir.path(), &sample_store()));

        let resp = handle_api(&Method::POST, "", None, &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_json(resp).await["message"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir.path().join("missing.json"));

        let resp = handle_api(&Method::GET, "", None, &state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await, serde_json::json!({ "message": "Server Error" }));
    }
}
