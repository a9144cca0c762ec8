//! Owlet - a hand-built HTTP/1.x server engine.
//!
//! Core library: the wire protocol, static file serving and the
//! task-per-connection server loop.

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;
