//! Accept loop.
//!
//! One listener task accepts connections; each accepted socket gets its
//! own task running sequential request/response cycles (keep-alive loops
//! inside the task). A semaphore sized by `server.max_workers` bounds
//! how many sessions are in flight at once; further connections queue on
//! the permit before being accepted.

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::http::connection::Connection;
use crate::server::context::ServerContext;

pub async fn run(ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&ctx.config.server.listen_addr).await?;
    info!("Listening on {}", ctx.config.server.listen_addr);
    serve(listener, ctx).await
}

/// Accept loop over an already-bound listener (tests bind to an
/// ephemeral port and pass it in).
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let permits = Arc::new(Semaphore::new(ctx.config.server.max_workers));
    loop {
        let permit = permits.clone().acquire_owned().await?;
        let (socket, peer) = listener.accept().await?;
        info!(peer = %peer, "accepted connection");

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, ctx);
            if let Err(e) = conn.run().await {
                error!(peer = %peer, error = %e, "connection error");
            }
            drop(permit);
        });
    }
}
