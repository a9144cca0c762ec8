//! HTTP response representation.
//!
//! A `Response` is created fresh for every request and consumed once by
//! the writer. Plain responses accumulate body bytes in memory; file
//! responses carry a path plus one of three delivery modes (whole file,
//! chunked transfer, byte range).

use std::path::PathBuf;

use crate::http::request::Version;

/// Status codes this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Continue,
    SwitchingProtocols,
    Ok,
    Created,
    Accepted,
    NoContent,
    PartialContent,
    MovedPermanently,
    Found,
    SeeOther,
    NotModified,
    TemporaryRedirect,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    RequestTimeout,
    LengthRequired,
    PayloadTooLarge,
    UriTooLong,
    RangeNotSatisfiable,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Continue => 100,
            StatusCode::SwitchingProtocols => 101,
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NoContent => 204,
            StatusCode::PartialContent => 206,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::SeeOther => 303,
            StatusCode::NotModified => 304,
            StatusCode::TemporaryRedirect => 307,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::NotAcceptable => 406,
            StatusCode::RequestTimeout => 408,
            StatusCode::LengthRequired => 411,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::UriTooLong => 414,
            StatusCode::RangeNotSatisfiable => 416,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::BadGateway => 502,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Continue => "Continue",
            StatusCode::SwitchingProtocols => "Switching Protocols",
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::SeeOther => "See Other",
            StatusCode::NotModified => "Not Modified",
            StatusCode::TemporaryRedirect => "Temporary Redirect",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::PayloadTooLarge => "Request Entity Too Large",
            StatusCode::UriTooLong => "Request-URI Too Long",
            StatusCode::RangeNotSatisfiable => "Requested Range Not Satisfiable",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// How a file body goes onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Full contents with a Content-Length header.
    Whole,
    /// `<hex-size>CRLF<bytes>CRLF` frames, zero-chunk terminated.
    Chunked,
    /// A resolved sub-interval of the file.
    Range { start: u64, len: u64 },
}

#[derive(Debug, Clone)]
pub struct FileBody {
    pub path: PathBuf,
    pub size: u64,
    pub mode: DeliveryMode,
}

pub struct Response {
    pub status: StatusCode,
    reason: Option<String>,
    /// Emitted in insertion order: handler-set headers first, then
    /// whatever the writer defaults afterwards.
    pub headers: Vec<(String, String)>,
    cookies: Vec<String>,
    body: Vec<u8>,
    file: Option<FileBody>,
    include_body: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::Ok,
            reason: None,
            headers: Vec::new(),
            cookies: Vec::new(),
            body: Vec::new(),
            file: None,
            include_body: true,
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.reason = None;
    }

    pub fn set_status_with_reason(&mut self, status: StatusCode, reason: impl Into<String>) {
        self.status = status;
        self.reason = Some(reason.into());
    }

    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .unwrap_or_else(|| self.status.reason_phrase())
    }

    /// Sets a header, replacing an existing one in place so emission
    /// order stays stable.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Queues one `Set-Cookie` header.
    pub fn set_cookie(&mut self, name: &str, value: &str, path: &str, expires: Option<&str>) {
        let cookie = match expires {
            Some(exp) => format!("{name}={value}; Path={path}; Expires={exp}"),
            None => format!("{name}={value}; Path={path}"),
        };
        self.cookies.push(cookie);
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    /// Appends bytes to the in-memory body.
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.body.extend_from_slice(data.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets an error status and a short body in one step.
    pub fn write_error(&mut self, status: StatusCode, body: impl AsRef<[u8]>) {
        self.set_status(status);
        self.body.clear();
        self.write(body);
    }

    /// 303 for HTTP/1.1 peers, 302 otherwise.
    pub fn redirect(&mut self, url: &str, version: Version) {
        let status = if version >= Version::HTTP_11 {
            StatusCode::SeeOther
        } else {
            StatusCode::Found
        };
        self.set_status(status);
        self.set_header("Location", url);
    }

    /// Attaches a file body in whole-file mode.
    pub fn set_file(&mut self, path: impl Into<PathBuf>, size: u64, mime_type: &str) {
        self.set_header("Content-Type", mime_type);
        self.file = Some(FileBody {
            path: path.into(),
            size,
            mode: DeliveryMode::Whole,
        });
    }

    pub fn file(&self) -> Option<&FileBody> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file
            .as_ref()
            .and_then(|f| f.path.file_name())
            .and_then(|n| n.to_str())
    }

    /// Switches the attached file to chunked delivery.
    pub fn enable_chunked(&mut self) {
        if let Some(file) = self.file.as_mut() {
            file.mode = DeliveryMode::Chunked;
        }
    }

    /// Resolves a `Range` header against the attached file. On success
    /// the response becomes 206 with `Content-Range`; unsatisfiable
    /// ranges become 416 with `Content-Range: bytes */<size>` and drop
    /// the file body.
    pub fn enable_range(&mut self, range_header: &str, max_chunk_size: u64) {
        let Some(file) = self.file.take() else {
            return;
        };
        match resolve_range(range_header, file.size, max_chunk_size) {
            Some(range) => {
                self.set_header("Content-Range", content_range(range.start, range.end, file.size));
                self.set_header("Content-Length", range.len.to_string());
                self.set_status(StatusCode::PartialContent);
                self.file = Some(FileBody {
                    mode: DeliveryMode::Range {
                        start: range.start,
                        len: range.len,
                    },
                    ..file
                });
            }
            None => {
                self.set_header("Content-Range", format!("bytes */{}", file.size));
                self.set_status(StatusCode::RangeNotSatisfiable);
            }
        }
    }

    /// HEAD requests: emit headers as usual but skip the body.
    pub fn only_header(&mut self) {
        self.include_body = false;
    }

    pub fn include_body(&self) -> bool {
        self.include_body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// A range resolved against a concrete file size; `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub len: u64,
}

/// Splits a `bytes=<start>-<end>` header into its raw optional bounds.
/// Returns `None` for a different unit or unparseable bounds.
pub fn parse_range(header: &str) -> Option<(Option<u64>, Option<u64>)> {
    let (unit, value) = header.split_once('=')?;
    if unit.trim() != "bytes" {
        return None;
    }
    let (start_raw, end_raw) = value.trim().split_once('-')?;
    let parse = |s: &str| -> Result<Option<u64>, ()> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse::<u64>().map(Some).map_err(|_| ())
        }
    };
    match (parse(start_raw), parse(end_raw)) {
        (Ok(start), Ok(end)) => Some((start, end)),
        _ => None,
    }
}

/// Resolves a `Range` header against `size` bytes. Open-ended forms are
/// supported: a missing start means suffix-length, a missing end means
/// to-end. Lengths beyond `max_chunk_size` are clamped, splitting large
/// ranges instead of failing them. `None` means not satisfiable.
pub fn resolve_range(header: &str, size: u64, max_chunk_size: u64) -> Option<ResolvedRange> {
    let (start_raw, end_raw) = parse_range(header)?;
    let (start, end) = match (start_raw, end_raw) {
        (None, None) => return None,
        // Suffix form: last N bytes.
        (None, Some(n)) => {
            if n == 0 {
                return None;
            }
            (size.saturating_sub(n), size.checked_sub(1)?)
        }
        (Some(s), None) => (s, size.checked_sub(1)?),
        (Some(s), Some(e)) => (s, e),
    };
    if start >= size || end >= size || end < start {
        return None;
    }
    let mut len = end - start + 1;
    let mut end = end;
    if len > max_chunk_size {
        len = max_chunk_size;
        end = start + len - 1;
    }
    Some(ResolvedRange { start, end, len })
}

/// Formats a satisfied `Content-Range` header value.
pub fn content_range(start: u64, end: u64, size: u64) -> String {
    format!("bytes {start}-{end}/{size}")
}

/// Parses a satisfied `Content-Range` value back into (start, end, size).
pub fn parse_content_range(value: &str) -> Option<(u64, u64, u64)> {
    let rest = value.strip_prefix("bytes ")?;
    let (range, size) = rest.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    Some((
        start.trim().parse().ok()?,
        end.trim().parse().ok()?,
        size.trim().parse().ok()?,
    ))
}
