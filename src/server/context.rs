//! Shared server context.
//!
//! One `ServerContext` is constructed at startup and handed as an `Arc`
//! to the listener, every connection and every handler invocation. It is
//! read-only after startup; no ambient global lookup anywhere.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::handlers::Handler;

pub struct ServerContext {
    pub config: Config,
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: HashMap::new(),
        }
    }

    /// Registers a handler for an exact path. Startup-time only.
    pub fn route(&mut self, path: impl Into<String>, handler: Arc<dyn Handler>) {
        self.routes.insert(path.into(), handler);
    }

    /// Looks up the handler registered for a path.
    pub fn resolve(&self, path: &str) -> Option<&Arc<dyn Handler>> {
        self.routes.get(path)
    }
}
