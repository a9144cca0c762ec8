//! Per-connection request/response driver.
//!
//! Owns one session for its whole life and runs sequential
//! request/response cycles until keep-alive ends or the peer goes away.
//! Requests on the same connection are strictly ordered; a session is
//! never processed concurrently.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::handlers;
use crate::http::error::HttpError;
use crate::http::parser::RequestParser;
use crate::http::request::Version;
use crate::http::response::Response;
use crate::http::session::Session;
use crate::http::writer;
use crate::server::context::ServerContext;

pub struct Connection<S> {
    session: Session<S>,
    ctx: Arc<ServerContext>,
    /// Protocol version of the request currently being served; error
    /// responses are written in this version.
    version: Version,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, ctx: Arc<ServerContext>) -> Self {
        Self {
            session: Session::new(stream),
            ctx,
            version: Version::HTTP_11,
        }
    }

    /// Serves requests until the connection should close. Failures are
    /// fatal to this session only: a default error response is written
    /// best-effort and the socket is torn down.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match self.serve_one().await {
                Ok(()) => {
                    if self.session.close_connection {
                        break;
                    }
                }
                Err(HttpError::Closed) => break,
                Err(HttpError::Io(e)) => {
                    debug!(session = self.session.id(), error = %e, "transport error");
                    break;
                }
                Err(err) => {
                    let status = err.status();
                    debug!(session = self.session.id(), error = %err, "request failed");
                    let _ = writer::send_default_error(&mut self.session, self.version, status)
                        .await;
                    break;
                }
            }
        }
        let _ = self.session.shutdown().await;
        debug!(session = self.session.id(), "session closed");
        Ok(())
    }

    /// One full parse/dispatch/respond cycle. The request, along with
    /// any spooled body data, is dropped when the cycle ends.
    async fn serve_one(&mut self) -> Result<(), HttpError> {
        self.session.close_connection = true;
        self.version = Version::HTTP_11;
        let threshold = self.ctx.config.limits.spool_threshold;
        let mut parser = RequestParser::new(&mut self.session, threshold);
        let result = parser.parse().await;
        self.version = parser.version();
        let mut request = result?;
        debug!(
            session = self.session.id(),
            method = request.method.as_str(),
            path = %request.path,
            "dispatching request"
        );
        let mut response = Response::new();
        handlers::dispatch(&self.ctx, &mut request, &mut response)?;
        writer::send_response(
            &mut self.session,
            &mut response,
            request.version,
            self.ctx.config.static_files.max_chunk_size,
        )
        .await?;
        Ok(())
    }
}
