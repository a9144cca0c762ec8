//! Request handlers and dispatch.
//!
//! Handlers implement a closed capability trait over the supported
//! methods; every method defaults to 405 so a handler only implements
//! what it supports. Dispatch resolves the static-file prefix before the
//! explicit route registry and invokes the handler through a method
//! lookup, never by name.

pub mod static_files;

use crate::http::error::{HttpError, HttpResult};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::server::context::ServerContext;

pub use static_files::StaticFileHandler;

/// Business logic invoked once per request. A handler mutates its
/// response; the connection driver serializes it afterwards.
pub trait Handler: Send + Sync {
    fn get(
        &self,
        _ctx: &ServerContext,
        _request: &mut Request,
        _response: &mut Response,
    ) -> HttpResult<()> {
        Err(HttpError::method_not_allowed())
    }

    fn post(
        &self,
        _ctx: &ServerContext,
        _request: &mut Request,
        _response: &mut Response,
    ) -> HttpResult<()> {
        Err(HttpError::method_not_allowed())
    }

    fn head(
        &self,
        _ctx: &ServerContext,
        _request: &mut Request,
        _response: &mut Response,
    ) -> HttpResult<()> {
        Err(HttpError::method_not_allowed())
    }
}

/// Resolves the handler for a parsed request and runs it. The static
/// file prefix wins over the route registry; an unresolved path is 404.
pub fn dispatch(
    ctx: &ServerContext,
    request: &mut Request,
    response: &mut Response,
) -> HttpResult<()> {
    if request.path.starts_with(&ctx.config.static_files.route_prefix) {
        return invoke(&StaticFileHandler, ctx, request, response);
    }
    let handler = ctx
        .resolve(&request.path)
        .ok_or_else(|| HttpError::not_found("no route for path"))?;
    invoke(handler.as_ref(), ctx, request, response)
}

fn invoke(
    handler: &dyn Handler,
    ctx: &ServerContext,
    request: &mut Request,
    response: &mut Response,
) -> HttpResult<()> {
    match request.method {
        Method::Get => handler.get(ctx, request, response),
        Method::Post => handler.post(ctx, request, response),
        Method::Head => handler.head(ctx, request, response),
    }
}
