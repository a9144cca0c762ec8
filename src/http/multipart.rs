//! Streaming multipart/form-data parser.
//!
//! Operates on a flipped body [`SpoolBuffer`] and a boundary token.
//! Part payloads are located by scanning forward in windows of twice the
//! boundary length, so the remaining body is never loaded into memory at
//! once. File parts read straight from the backing store: a bounded copy
//! for memory-backed bodies, an independent handle on the spool file for
//! bodies that already spilled to disk.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::http::buffer::SpoolBuffer;
use crate::http::error::{HttpError, HttpResult};

/// A decoded text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

enum FileData {
    Memory(Vec<u8>),
    /// Read handle on the request body's spool file, positioned at the
    /// start of this part's payload.
    Spooled(File),
}

/// An uploaded file. Storage stays with this record until `save` copies
/// it to a permanent path; unsaved spooled data disappears with the
/// request's body buffer.
pub struct UploadedFile {
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    data: FileData,
}

impl UploadedFile {
    /// Copies the payload to `path`. Consuming: the data can be saved
    /// or read out once.
    pub fn save(&mut self, path: &Path) -> io::Result<u64> {
        match &mut self.data {
            FileData::Memory(bytes) => {
                std::fs::write(path, &bytes)?;
                Ok(bytes.len() as u64)
            }
            FileData::Spooled(file) => {
                let mut out = File::create(path)?;
                let copied = io::copy(&mut file.take(self.size), &mut out)?;
                Ok(copied)
            }
        }
    }

    /// Reads the full payload into memory.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        match &mut self.data {
            FileData::Memory(bytes) => Ok(bytes.clone()),
            FileData::Spooled(file) => {
                let mut out = Vec::with_capacity(self.size as usize);
                file.take(self.size).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

#[derive(Debug)]
pub enum Part {
    Field(FormField),
    File(UploadedFile),
}

pub struct MultipartParser<'a> {
    buffer: &'a mut SpoolBuffer,
    boundary: Vec<u8>,
    end_boundary: Vec<u8>,
}

impl<'a> MultipartParser<'a> {
    /// `boundary` is the raw token from the Content-Type header;
    /// surrounding quotes are stripped here.
    pub fn new(buffer: &'a mut SpoolBuffer, boundary: &str) -> Self {
        let mut token = boundary.as_bytes();
        if token.len() >= 2 && token.starts_with(b"\"") && token.ends_with(b"\"") {
            token = &token[1..token.len() - 1];
        }
        let mut full = b"--".to_vec();
        full.extend_from_slice(token);
        let mut end = full.clone();
        end.extend_from_slice(b"--");
        Self {
            buffer,
            boundary: full,
            end_boundary: end,
        }
    }

    /// Parses every part up to the terminal boundary.
    pub fn parse(mut self) -> HttpResult<Vec<Part>> {
        let mut parts = Vec::new();
        while let Some(part) = self.parse_part()? {
            parts.push(part);
        }
        Ok(parts)
    }

    fn parse_part(&mut self) -> HttpResult<Option<Part>> {
        let line = self.buffer.read_line()?;
        if !line.starts_with(&self.boundary) {
            return Err(HttpError::bad_request("multipart: expected boundary"));
        }
        if line.starts_with(&self.end_boundary) {
            return Ok(None);
        }
        let headers = self.read_part_headers()?;
        let start = self.buffer.tell()?;
        let end = self
            .scan_to_boundary(start)?
            .ok_or_else(|| HttpError::bad_request("multipart: unterminated part"))?;

        let disposition = headers.get("content-disposition").map(|s| s.as_str());
        if !matches!(disposition, Some(d) if d.starts_with("form-data")) {
            return Err(HttpError::bad_request("multipart: bad content-disposition"));
        }
        let name = headers
            .get("name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| HttpError::bad_request("multipart: part missing name"))?
            .clone();

        match headers.get("filename") {
            None => {
                self.buffer.seek(start)?;
                let raw = self.buffer.read_at_most((end - start) as usize)?;
                self.buffer.seek(end)?;
                let text = String::from_utf8(raw)
                    .map_err(|_| HttpError::bad_request("multipart: non-UTF-8 field value"))?;
                // Only the single separator CRLF is framing; anything
                // before it belongs to the value.
                let value = text.strip_suffix("\r\n").unwrap_or(&text).to_string();
                Ok(Some(Part::Field(FormField { name, value })))
            }
            Some(filename) => {
                let content_type = headers
                    .get("content-type")
                    .cloned()
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                // Payload excludes the CRLF preceding the boundary.
                let size = (end - start).saturating_sub(2);
                let data = if let Some(path) = self.buffer.spool_path() {
                    let mut file = File::open(path)?;
                    file.seek(SeekFrom::Start(start))?;
                    self.buffer.seek(end)?;
                    FileData::Spooled(file)
                } else {
                    self.buffer.seek(start)?;
                    let bytes = self.buffer.read_at_most(size as usize)?;
                    self.buffer.seek(end)?;
                    FileData::Memory(bytes)
                };
                Ok(Some(Part::File(UploadedFile {
                    name,
                    filename: filename.clone(),
                    content_type,
                    size,
                    data,
                })))
            }
        }
    }

    /// Reads sub-header lines until the blank separator, folding
    /// `Content-Disposition` parameters and `Content-Type` into one map
    /// with lower-cased keys.
    fn read_part_headers(&mut self) -> HttpResult<HashMap<String, String>> {
        let mut headers = HashMap::new();
        loop {
            let line = self.buffer.read_line()?;
            if line.is_empty() {
                return Err(HttpError::bad_request("multipart: truncated part headers"));
            }
            if line.starts_with(b"\r\n") {
                break;
            }
            let text = std::str::from_utf8(&line)
                .map_err(|_| HttpError::bad_request("multipart: non-UTF-8 part header"))?;
            for (i, item) in text.trim_end().split(';').enumerate() {
                let split = if i == 0 {
                    item.split_once(':')
                } else {
                    item.split_once('=')
                };
                if let Some((key, value)) = split {
                    let value = value.trim().trim_matches('"').to_string();
                    headers.insert(key.trim().to_ascii_lowercase(), value);
                }
            }
        }
        Ok(headers)
    }

    /// Scans forward for the next boundary, reading windows of twice the
    /// boundary length and keeping a boundary-sized tail between reads so
    /// matches spanning a window edge are not missed. On success the
    /// buffer is left positioned at the boundary start, which is also the
    /// returned offset.
    fn scan_to_boundary(&mut self, from: u64) -> io::Result<Option<u64>> {
        self.buffer.seek(from)?;
        let window = self.boundary.len() * 2;
        let mut tail: Vec<u8> = Vec::new();
        loop {
            let chunk = self.buffer.read_at_most(window)?;
            if chunk.is_empty() {
                return Ok(None);
            }
            tail.extend_from_slice(&chunk);
            if let Some(idx) = find(&tail, &self.boundary) {
                let pos = self.buffer.tell()? - tail.len() as u64 + idx as u64;
                self.buffer.seek(pos)?;
                return Ok(Some(pos));
            }
            let keep = self.boundary.len() - 1;
            if tail.len() > keep {
                tail.drain(..tail.len() - keep);
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
