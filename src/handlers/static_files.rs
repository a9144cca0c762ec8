//! Static file delivery.
//!
//! Serves regular files under the configured static root with byte-range
//! requests, If-Modified-Since cache validation and optional chunked
//! transfer. Range handling takes priority over cache validation.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::handlers::Handler;
use crate::http::error::{HttpError, HttpResult};
use crate::http::mime;
use crate::http::request::{Request, Version};
use crate::http::response::{Response, StatusCode};
use crate::server::context::ServerContext;

pub struct StaticFileHandler;

impl Handler for StaticFileHandler {
    fn get(
        &self,
        ctx: &ServerContext,
        request: &mut Request,
        response: &mut Response,
    ) -> HttpResult<()> {
        self.serve(ctx, request, response, true)
    }

    fn head(
        &self,
        ctx: &ServerContext,
        request: &mut Request,
        response: &mut Response,
    ) -> HttpResult<()> {
        self.serve(ctx, request, response, false)
    }
}

impl StaticFileHandler {
    fn serve(
        &self,
        ctx: &ServerContext,
        request: &Request,
        response: &mut Response,
        include_body: bool,
    ) -> HttpResult<()> {
        let cfg = &ctx.config.static_files;
        let Some(file_path) = resolve_path(ctx, &request.path) else {
            response.write_error(
                StatusCode::NotFound,
                format!("{} FILE NOT FOUND", request.path),
            );
            return Ok(());
        };
        let meta = std::fs::metadata(&file_path)
            .map_err(|_| HttpError::internal("failed to stat static file"))?;
        let size = meta.len();
        let mime_type = response_mime(&file_path);

        if !include_body {
            response.only_header();
        }

        // Range wins over cache validation.
        if cfg.range {
            if let Some(range_header) = request.header("range").map(str::to_string) {
                response.set_file(&file_path, size, mime_type);
                response.enable_range(&range_header, cfg.max_chunk_size);
                return Ok(());
            }
        }

        if cfg.cache {
            let no_store = request
                .header("cache-control")
                .is_some_and(|v| v.contains("no-store"));
            if !no_store {
                let modified = modified_date(&meta);
                response.set_header("Cache-Control", "max-age=3600");
                response.set_header("Last-Modified", modified.clone());
                if request.header("if-modified-since") == Some(modified.as_str()) {
                    response.set_status(StatusCode::NotModified);
                    return Ok(());
                }
            }
        }

        if cfg.range && request.version >= Version::HTTP_11 {
            response.set_header("Accept-Ranges", "bytes");
        }
        response.set_file(&file_path, size, mime_type);
        if cfg.chunked {
            response.enable_chunked();
        }
        Ok(())
    }
}

/// Percent-decodes the request path, strips the static route prefix and
/// canonicalizes under the static root. Escapes from the root and
/// anything that is not an existing regular file resolve to `None`.
fn resolve_path(ctx: &ServerContext, raw_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(raw_path).decode_utf8().ok()?;
    let rel = decoded
        .strip_prefix(&ctx.config.static_files.route_prefix)?
        .trim_start_matches('/');
    let root = ctx.config.static_files.root.canonicalize().ok()?;
    let candidate = root.join(rel).canonicalize().ok()?;
    if !candidate.starts_with(&root) || !candidate.is_file() {
        return None;
    }
    Some(candidate)
}

fn response_mime(path: &std::path::Path) -> &'static str {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(mime::for_file_name)
        .unwrap_or("application/octet-stream")
}

/// RFC-822 formatted last-modified time; epoch when the filesystem
/// cannot say.
fn modified_date(meta: &std::fs::Metadata) -> String {
    let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    httpdate::fmt_http_date(mtime)
}
