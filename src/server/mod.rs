//! Server startup: shared context and the accept loop.

pub mod context;
pub mod listener;

pub use context::ServerContext;
