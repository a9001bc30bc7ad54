//! Static media serving module
//!
//! Cover images are served whole. Audio goes through the range streamer:
//! the file is opened once per request, only the requested span is read,
//! and the handle is dropped when the handler returns.

use crate::handler::router::RequestContext;
use crate::http::{self, response, ByteRange, RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Serve a cover image as `image/jpeg`
pub async fn serve_image(ctx: &RequestContext<'_>, media_root: &str) -> Response<Full<Bytes>> {
    let Some(path) = resolve_media_path(media_root, ctx.path).await else {
        return http::build_404_response();
    };

    match fs::read(&path).await {
        Ok(data) => {
            let size = data.len() as u64;
            http::build_media_response(
                Bytes::from(data),
                response::CONTENT_TYPE_JPEG,
                size,
                false,
                ctx.is_head,
            )
        }
        Err(e) => io_failure(&path, &e),
    }
}

/// Serve an audio file as `audio/mpeg`, honouring a single byte range
pub async fn serve_audio(ctx: &RequestContext<'_>, media_root: &str) -> Response<Full<Bytes>> {
    let Some(path) = resolve_media_path(media_root, ctx.path).await else {
        return http::build_404_response();
    };

    let mut file = match File::open(&path).await {
        Ok(f) => f,
        Err(e) => return io_failure(&path, &e),
    };
    let total_size = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => return io_failure(&path, &e),
    };

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Full => {
            let data = if ctx.is_head {
                Ok(Vec::new())
            } else {
                read_all(&mut file, total_size).await
            };
            match data {
                Ok(data) => http::build_media_response(
                    Bytes::from(data),
                    response::CONTENT_TYPE_MPEG,
                    total_size,
                    true,
                    ctx.is_head,
                ),
                Err(e) => io_failure(&path, &e),
            }
        }
        RangeParseResult::Partial(range) => {
            let data = if ctx.is_head {
                Ok(Vec::new())
            } else {
                read_range(&mut file, range).await
            };
            match data {
                Ok(data) => http::build_partial_response(
                    Bytes::from(data),
                    response::CONTENT_TYPE_MPEG,
                    range,
                    total_size,
                    ctx.is_head,
                ),
                Err(e) => io_failure(&path, &e),
            }
        }
        RangeParseResult::NotSatisfiable(reason) => {
            logger::log_debug(&format!(
                "Rejected Range {:?} on {} ({total_size} bytes): {reason:?}",
                ctx.range_header.as_deref().unwrap_or_default(),
                path.display(),
            ));
            http::build_416_response(total_size)
        }
    }
}

async fn read_all(file: &mut File, total_size: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(usize::try_from(total_size).unwrap_or_default());
    file.read_to_end(&mut buf).await?;
    Ok(buf)
}

async fn read_range(file: &mut File, range: ByteRange) -> io::Result<Vec<u8>> {
    let len = usize::try_from(range.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "range too large"))?;
    file.seek(SeekFrom::Start(range.start)).await?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Map a media I/O failure to a response: missing files are 404, anything else 500
fn io_failure(path: &Path, err: &io::Error) -> Response<Full<Bytes>> {
    if err.kind() == io::ErrorKind::NotFound {
        return http::build_404_response();
    }
    logger::log_error(&format!("Failed to read media '{}': {err}", path.display()));
    http::build_500_response()
}

/// Resolve a request path (`/img/a.jpg`) to a file inside `media_root`
///
/// Rejects parent-directory components and anything that canonicalizes
/// outside the media root (symlinks included).
pub async fn resolve_media_path(media_root: &str, request_path: &str) -> Option<PathBuf> {
    let decoded = crate::api::decode(request_path);
    let relative = Path::new(decoded.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return None;
    }

    let root = match fs::canonicalize(media_root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Media root not found or inaccessible '{media_root}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log
    let file = fs::canonicalize(root.join(relative)).await.ok()?;
    if !file.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file.display()
        ));
        return None;
    }

    if !fs::metadata(&file).await.ok()?.is_file() {
        return None;
    }

    Some(file)
}
