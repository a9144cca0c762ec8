//! Request parsing.
//!
//! A strict forward state machine over a [`Session`]: request line, then
//! headers, then (for POST) the body under one of three framing
//! strategies, then argument and cookie extraction. No backtracking; any
//! malformed input fails the current session with a 400-class
//! [`HttpError`] and the connection is closed.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::http::buffer::SpoolBuffer;
use crate::http::error::{HttpError, HttpResult};
use crate::http::multipart::{MultipartParser, Part};
use crate::http::request::{Method, Request, Version};
use crate::http::session::Session;

pub struct RequestParser<'a, S> {
    session: &'a mut Session<S>,
    spool_threshold: usize,
    version: Version,
}

impl<'a, S: AsyncRead + AsyncWrite + Unpin> RequestParser<'a, S> {
    pub fn new(session: &'a mut Session<S>, spool_threshold: usize) -> Self {
        Self {
            session,
            spool_threshold,
            version: Version::HTTP_11,
        }
    }

    /// The peer's protocol version once the request line has parsed;
    /// before that (or for rejected versions) HTTP/1.1 is assumed, so
    /// error responses always have a usable version to speak.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Runs the full parse and returns the populated request. The
    /// session's `close_connection` flag is settled as a side effect.
    pub async fn parse(&mut self) -> HttpResult<Request> {
        let mut request = self.parse_request_line().await?;
        if !request.version.is_legacy() {
            self.parse_headers(&mut request).await?;
            parse_cookies(&mut request);
            if request.method == Method::Post {
                self.parse_body(&mut request).await?;
            }
        }
        // Arguments last: POST arguments live in the body.
        parse_arguments(&mut request)?;

        if !self.session.close_connection {
            // POST connections are not reused; an explicit close wins too.
            let explicit_close = request
                .header("connection")
                .is_some_and(|v| v.eq_ignore_ascii_case("close"));
            if request.method == Method::Post || explicit_close {
                self.session.close_connection = true;
            }
        }
        Ok(request)
    }

    /// `METHOD SP PATH [SP HTTP/<maj>.<min>] CRLF`. The two-token form
    /// is the legacy GET-only protocol and always closes the connection.
    async fn parse_request_line(&mut self) -> HttpResult<Request> {
        let Some(line) = self.session.read_line().await? else {
            return Err(HttpError::Closed);
        };
        if !line.ends_with("\r\n") {
            return Err(HttpError::Closed);
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [method, path] => {
                if !method.eq_ignore_ascii_case("GET") {
                    return Err(HttpError::bad_request("legacy request line must be GET"));
                }
                self.version = Version::HTTP_09;
                Ok(Request::new(Method::Get, path.to_string(), Version::HTTP_09))
            }
            [method, path, version] => {
                let version = parse_version(version)?;
                if version >= (Version { major: 2, minor: 0 }) {
                    return Err(HttpError::bad_request("HTTP/2+ not supported"));
                }
                self.version = version;
                if version >= Version::HTTP_11 {
                    self.session.close_connection = false;
                }
                let method = Method::parse(method).ok_or_else(HttpError::method_not_allowed)?;
                Ok(Request::new(method, path.to_string(), version))
            }
            _ => Err(HttpError::bad_request("malformed request line")),
        }
    }

    /// `Key: Value CRLF` lines up to a bare CRLF. Keys are lower-cased
    /// and trimmed, values trimmed.
    async fn parse_headers(&mut self, request: &mut Request) -> HttpResult<()> {
        loop {
            let Some(line) = self.session.read_line().await? else {
                return Err(HttpError::bad_request("truncated headers"));
            };
            if !line.ends_with("\r\n") {
                return Err(HttpError::bad_request("header line missing CRLF"));
            }
            if line == "\r\n" {
                return Ok(());
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(HttpError::bad_request("header line missing colon"));
            };
            request
                .headers
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    /// Framing precedence: Content-Length, then chunked transfer
    /// encoding, then line-wise read to end of stream. The resulting
    /// buffer is flipped to readable.
    async fn parse_body(&mut self, request: &mut Request) -> HttpResult<()> {
        let mut buffer = if let Some(raw) = request.header("content-length") {
            let content_length: usize = raw
                .trim()
                .parse()
                .map_err(|_| HttpError::bad_request("invalid Content-Length"))?;
            self.read_content(content_length).await?
        } else if request
            .header("transfer-encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
        {
            self.read_chunked().await?
        } else {
            self.read_until_end().await?
        };
        buffer.flip()?;
        request.body = Some(buffer);
        Ok(())
    }

    async fn read_content(&mut self, content_length: usize) -> HttpResult<SpoolBuffer> {
        let mut buffer = SpoolBuffer::with_threshold(self.spool_threshold);
        let mut remaining = content_length;
        while remaining > 0 {
            let chunk = self.session.read_chunk(remaining).await?;
            if chunk.is_empty() {
                return Err(HttpError::bad_request("body shorter than Content-Length"));
            }
            buffer.write(&chunk)?;
            remaining -= chunk.len();
        }
        Ok(buffer)
    }

    /// `<hex-size>CRLF<bytes>CRLF` repeated; a zero-size chunk closes
    /// the stream. Trailer headers are not supported.
    async fn read_chunked(&mut self) -> HttpResult<SpoolBuffer> {
        let mut buffer = SpoolBuffer::with_threshold(self.spool_threshold);
        loop {
            let Some(line) = self.session.read_line().await? else {
                return Err(HttpError::bad_request("truncated chunked body"));
            };
            if !line.ends_with("\r\n") {
                return Err(HttpError::bad_request("chunk size line missing CRLF"));
            }
            let size = usize::from_str_radix(line.trim(), 16)
                .map_err(|_| HttpError::bad_request("invalid chunk size"))?;
            if size == 0 {
                return Ok(buffer);
            }
            let data = self
                .session
                .read_exact(size)
                .await
                .map_err(|_| HttpError::bad_request("truncated chunk data"))?;
            buffer.write(&data)?;
            let crlf = self
                .session
                .read_exact(2)
                .await
                .map_err(|_| HttpError::bad_request("truncated chunk terminator"))?;
            if crlf != b"\r\n" {
                return Err(HttpError::bad_request("chunk data missing CRLF"));
            }
        }
    }

    /// No framing information: read line-wise until the peer ends the
    /// stream. Bodies are raw bytes, not necessarily UTF-8.
    async fn read_until_end(&mut self) -> HttpResult<SpoolBuffer> {
        let mut buffer = SpoolBuffer::with_threshold(self.spool_threshold);
        while let Some(line) = self.session.read_line_raw().await? {
            buffer.write(&line)?;
        }
        Ok(buffer)
    }
}

/// Splits the query string off the path and decodes URL-encoded
/// arguments from it and, for POST bodies, from the body itself
/// (urlencoded directly, multipart via the streaming parser).
fn parse_arguments(request: &mut Request) -> HttpResult<()> {
    if let Some(idx) = request.path.find('?') {
        if idx > 0 {
            let query = request.path.split_off(idx)[1..].to_string();
            merge_urlencoded(request, query.as_bytes());
        }
    }
    if request.method != Method::Post {
        return Ok(());
    }
    let Some(content_type) = request.header("content-type").map(str::to_string) else {
        return Ok(());
    };
    let (ctype, params) = parse_content_type(&content_type);
    match ctype.as_str() {
        "multipart/form-data" => {
            let Some(boundary) = params.get("boundary") else {
                return Ok(());
            };
            let Some(mut buffer) = request.body.take() else {
                return Ok(());
            };
            let parts = MultipartParser::new(&mut buffer, boundary).parse()?;
            request.body = Some(buffer);
            for part in parts {
                match part {
                    Part::Field(field) => {
                        request
                            .arguments
                            .entry(field.name.clone())
                            .or_default()
                            .push(field.value);
                    }
                    Part::File(file) => {
                        request.files.entry(file.name.clone()).or_default().push(file);
                    }
                }
            }
        }
        "application/x-www-form-urlencoded" => {
            if let Some(buffer) = request.body.as_mut() {
                let raw = buffer.read_to_end()?;
                merge_urlencoded_raw(&mut request.arguments, &raw);
            }
        }
        _ => {}
    }
    Ok(())
}

fn merge_urlencoded(request: &mut Request, raw: &[u8]) {
    merge_urlencoded_raw(&mut request.arguments, raw);
}

fn merge_urlencoded_raw(
    arguments: &mut std::collections::HashMap<String, Vec<String>>,
    raw: &[u8],
) {
    for (key, value) in url::form_urlencoded::parse(raw) {
        arguments
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
}

/// `Cookie: a=b; c=d`. Items without `=` are skipped.
fn parse_cookies(request: &mut Request) {
    let Some(header) = request.header("cookie").map(str::to_string) else {
        return;
    };
    for item in header.split(';') {
        if let Some((name, value)) = item.split_once('=') {
            request
                .cookies
                .insert(name.trim().to_string(), value.trim().to_string());
        }
    }
}

/// Splits `type/subtype; key=value; ...` into the media type and its
/// parameters (keys lower-cased, values unquoted).
fn parse_content_type(header: &str) -> (String, std::collections::HashMap<String, String>) {
    let mut parts = header.split(';');
    let ctype = parts
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let mut params = std::collections::HashMap::new();
    for item in parts {
        if let Some((key, value)) = item.split_once('=') {
            params.insert(
                key.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_string(),
            );
        }
    }
    (ctype, params)
}

fn parse_version(token: &str) -> HttpResult<Version> {
    let rest = token
        .strip_prefix("HTTP/")
        .ok_or_else(|| HttpError::bad_request("bad protocol marker"))?;
    let (major, minor) = rest
        .split_once('.')
        .ok_or_else(|| HttpError::bad_request("bad protocol version"))?;
    let major: u8 = major
        .parse()
        .map_err(|_| HttpError::bad_request("bad protocol version"))?;
    let minor: u8 = minor
        .trim()
        .parse()
        .map_err(|_| HttpError::bad_request("bad protocol version"))?;
    Ok(Version { major, minor })
}
