//! Protocol and dispatch error taxonomy.
//!
//! Parse and dispatch failures are modeled as an explicit result type
//! carrying an error kind plus the status code of the default response,
//! propagated synchronously up to the connection driver.

use crate::http::response::StatusCode;

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The peer went away before or during a request. No response is
    /// written; the session is simply torn down.
    #[error("connection closed by peer")]
    Closed,

    /// A protocol or dispatch failure with a well-known status. The
    /// connection driver answers with the default error page for the
    /// status and closes the connection.
    #[error("{status:?}: {reason}")]
    Status {
        status: StatusCode,
        reason: &'static str,
    },

    /// Transport-level failure while reading or writing the socket.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn bad_request(reason: &'static str) -> Self {
        HttpError::Status {
            status: StatusCode::BadRequest,
            reason,
        }
    }

    pub fn not_found(reason: &'static str) -> Self {
        HttpError::Status {
            status: StatusCode::NotFound,
            reason,
        }
    }

    pub fn method_not_allowed() -> Self {
        HttpError::Status {
            status: StatusCode::MethodNotAllowed,
            reason: "method not allowed",
        }
    }

    pub fn internal(reason: &'static str) -> Self {
        HttpError::Status {
            status: StatusCode::InternalServerError,
            reason,
        }
    }

    /// Status used for the default error response.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Status { status, .. } => *status,
            HttpError::Closed | HttpError::Io(_) => StatusCode::InternalServerError,
        }
    }
}
