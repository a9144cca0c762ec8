//! Parsed HTTP request representation.

use std::collections::HashMap;
use std::fmt;

use crate::http::buffer::SpoolBuffer;
use crate::http::multipart::UploadedFile;

/// The closed set of methods handlers can implement. Anything else is
/// answered with 405 at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Head,
}

impl Method {
    /// Parses a method token case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("GET") {
            Some(Method::Get)
        } else if token.eq_ignore_ascii_case("POST") {
            Some(Method::Post)
        } else if token.eq_ignore_ascii_case("HEAD") {
            Some(Method::Head)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Head => "head",
        }
    }
}

/// Protocol version as a major/minor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// Legacy two-token request lines are pinned to this marker.
    pub const HTTP_09: Version = Version { major: 0, minor: 9 };
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
    pub const HTTP_11: Version = Version { major: 1, minor: 1 };

    pub fn is_legacy(&self) -> bool {
        *self == Version::HTTP_09
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// One parsed request. Owned exclusively by its connection; spooled body
/// data is removed when the request is dropped after the response.
pub struct Request {
    pub method: Method,
    /// Path with any query string already split off.
    pub path: String,
    pub version: Version,
    /// Header map, keys case-folded to lowercase.
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    /// Decoded arguments; a name may carry several values.
    pub arguments: HashMap<String, Vec<String>>,
    /// Uploaded files from multipart bodies.
    pub files: HashMap<String, Vec<UploadedFile>>,
    pub body: Option<SpoolBuffer>,
}

impl Request {
    pub fn new(method: Method, path: String, version: Version) -> Self {
        Self {
            method,
            path,
            version,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            arguments: HashMap::new(),
            files: HashMap::new(),
            body: None,
        }
    }

    /// Header lookup; the name is matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_str())
    }

    /// First value of an argument, if present.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .finish()
    }
}
