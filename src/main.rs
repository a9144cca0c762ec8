mod config;
mod handlers;
mod http;
mod server;

use std::sync::Arc;

use config::Config;
use handlers::Handler;
use http::error::HttpResult;
use http::request::Request;
use http::response::Response;
use server::context::ServerContext;

struct IndexHandler;

impl Handler for IndexHandler {
    fn get(
        &self,
        _ctx: &ServerContext,
        _request: &mut Request,
        response: &mut Response,
    ) -> HttpResult<()> {
        response.set_header("Content-Type", "text/html; charset=utf-8");
        response.write("<html><body><h1>owlet</h1></body></html>");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let mut ctx = ServerContext::new(cfg);
    ctx.route("/", Arc::new(IndexHandler));
    let ctx = Arc::new(ctx);

    tokio::select! {
        res = server::listener::run(ctx) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
