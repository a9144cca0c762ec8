//! HTTP/1.x protocol engine.
//!
//! Owns the connection lifecycle: requests are parsed straight off the
//! wire and responses written back, including chunked transfer,
//! byte-range delivery and static-file caching semantics.
//!
//! # Architecture
//!
//! - **`buffer`**: spillable byte store; memory until a threshold, then
//!   a temp file
//! - **`session`**: one accepted connection; buffered reads, raw writes,
//!   keep-alive flag
//! - **`request`** / **`response`**: the parsed-request record and the
//!   response record with its three file delivery modes
//! - **`parser`**: request line → headers → body state machine with
//!   three body-framing strategies
//! - **`multipart`**: streaming multipart/form-data parser over a body
//!   buffer
//! - **`writer`**: serializes responses back onto the session
//! - **`connection`**: drives sequential request/response cycles on one
//!   connection
//! - **`error`**: the protocol error taxonomy (kind + status code)
//! - **`mime`**: extension → MIME type table
//!
//! # Connection lifecycle
//!
//! ```text
//!   accept ──► parse request ──► dispatch handler ──► write response
//!                  │                                        │
//!                  │ malformed: default error page, close   │ keep-alive
//!                  ▼                                        ▼
//!               teardown ◄───────────────────────── parse next request
//! ```

pub mod buffer;
pub mod connection;
pub mod error;
pub mod mime;
pub mod multipart;
pub mod parser;
pub mod request;
pub mod response;
pub mod session;
pub mod writer;

pub use buffer::SpoolBuffer;
pub use error::{HttpError, HttpResult};
pub use request::{Method, Request, Version};
pub use response::{Response, StatusCode};
pub use session::Session;
