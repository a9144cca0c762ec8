//! Response serialization.
//!
//! Emission order: status line, handler-set headers, defaulted
//! `Content-Type` / `Date` / `Content-Length`, `Connection`, one
//! `Set-Cookie` per cookie, blank line, then the body in whichever
//! delivery mode the response carries. Legacy HTTP/0.9 peers receive the
//! body only, with no status line or headers.

use std::io;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite};

use crate::http::request::Version;
use crate::http::response::{DeliveryMode, Response, StatusCode};
use crate::http::session::Session;

/// Cap on a single file-read while streaming a body.
const MAX_READ_STEP: u64 = 1024 * 1024;

/// Fills in defaulted headers and renders the header block. Mutates the
/// response so the emitted headers are observable afterwards.
pub fn serialize_headers(response: &mut Response, version: Version, close: bool) -> Vec<u8> {
    if version.is_legacy() {
        return Vec::new();
    }
    prepare_headers(response, close);

    let mut out = Vec::new();
    out.extend_from_slice(
        format!("{} {} {}\r\n", version, response.status.as_u16(), response.reason()).as_bytes(),
    );
    for (name, value) in &response.headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    for cookie in response.cookies() {
        out.extend_from_slice(format!("Set-Cookie: {cookie}\r\n").as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out
}

fn prepare_headers(response: &mut Response, close: bool) {
    if response.header("Content-Type").is_none() {
        response.set_header("Content-Type", "text/html; charset=utf-8");
    }
    if response.header("Date").is_none() {
        response.set_header("Date", httpdate::fmt_http_date(SystemTime::now()));
    }
    response.set_header("Connection", if close { "close" } else { "keep-alive" });

    match response.file().cloned() {
        Some(file) => {
            if let Some(name) = response.file_name().map(str::to_string) {
                response.set_header("Content-Disposition", format!("attachment; filename={name}"));
            }
            match file.mode {
                DeliveryMode::Chunked => {
                    response.set_header("Transfer-Encoding", "chunked");
                }
                // enable_range already set Content-Length and Content-Range.
                DeliveryMode::Range { .. } => {}
                DeliveryMode::Whole => {
                    response.set_header("Content-Length", file.size.to_string());
                }
            }
        }
        None => {
            if response.header("Content-Length").is_none() {
                response.set_header("Content-Length", response.body().len().to_string());
            }
        }
    }
}

/// Sends headers then body through the session and flushes.
pub async fn send_response<S>(
    session: &mut Session<S>,
    response: &mut Response,
    version: Version,
    max_chunk_size: u64,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let close = session.close_connection;
    let header_block = serialize_headers(response, version, close);
    session.write_raw(&header_block).await?;

    let skip_body = !response.include_body() || response.status == StatusCode::NotModified;
    if !skip_body {
        match response.file().cloned() {
            Some(file) => match file.mode {
                DeliveryMode::Whole => {
                    send_file_span(session, &file.path, 0, file.size, max_chunk_size).await?;
                }
                DeliveryMode::Range { start, len } => {
                    send_file_span(session, &file.path, start, len, max_chunk_size).await?;
                }
                DeliveryMode::Chunked => {
                    send_file_chunked(session, &file.path, max_chunk_size).await?;
                }
            },
            None => {
                session.write_raw(response.body()).await?;
            }
        }
    }
    session.flush().await
}

/// Streams `len` bytes of a file starting at `start`.
async fn send_file_span<S>(
    session: &mut Session<S>,
    path: &std::path::Path,
    start: u64,
    len: u64,
    max_chunk_size: u64,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(io::SeekFrom::Start(start)).await?;
    let step = max_chunk_size.min(MAX_READ_STEP).max(1) as usize;
    let mut remaining = len;
    let mut buf = vec![0u8; step];
    while remaining > 0 {
        let want = (remaining as usize).min(step);
        let got = file.read(&mut buf[..want]).await?;
        if got == 0 {
            break;
        }
        session.write_raw(&buf[..got]).await?;
        remaining -= got as u64;
    }
    Ok(())
}

/// Streams a whole file as `<hex-size>CRLF<bytes>CRLF` frames followed
/// by the zero-size terminator.
async fn send_file_chunked<S>(
    session: &mut Session<S>,
    path: &std::path::Path,
    max_chunk_size: u64,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut file = tokio::fs::File::open(path).await?;
    let step = max_chunk_size.min(MAX_READ_STEP).max(1) as usize;
    let mut buf = vec![0u8; step];
    loop {
        let got = file.read(&mut buf).await?;
        if got == 0 {
            session.write_raw(b"0\r\n\r\n").await?;
            return Ok(());
        }
        session.write_str(&format!("{got:X}\r\n")).await?;
        session.write_raw(&buf[..got]).await?;
        session.write_raw(b"\r\n").await?;
    }
}

/// Best-effort default error page, written when parsing or dispatch
/// failed. The connection is always closed afterwards.
pub async fn send_default_error<S>(
    session: &mut Session<S>,
    version: Version,
    status: StatusCode,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if version.is_legacy() {
        return Ok(());
    }
    let message = format!("{} {}", status.as_u16(), status.reason_phrase());
    let mut head = String::new();
    head.push_str(&format!("{} {} {}\r\n", version, status.as_u16(), status.reason_phrase()));
    head.push_str("Content-Type: text/html; charset=utf-8\r\n");
    head.push_str(&format!("Date: {}\r\n", httpdate::fmt_http_date(SystemTime::now())));
    head.push_str("Connection: close\r\n");
    head.push_str(&format!("Content-Length: {}\r\n", message.len()));
    head.push_str("\r\n");
    session.write_str(&head).await?;
    session.write_str(&message).await?;
    session.flush().await
}
