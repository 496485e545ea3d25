//! Accept loop and the state shared by every connection.

pub mod listener;

use std::time::Duration;

use crate::config::Config;
use crate::http::parser::ConnectionCloseMatch;
use crate::static_files::PathResolver;

/// Read-only settings handed to each connection task.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub resolver: PathResolver,
    pub index_file: String,
    pub idle_timeout: Duration,
    pub close_match: ConnectionCloseMatch,
}

impl ServerContext {
    /// Validates the document root and captures the per-connection settings.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            resolver: PathResolver::new(&cfg.static_files.root)?,
            index_file: cfg.static_files.index_file.clone(),
            idle_timeout: cfg.idle_timeout(),
            close_match: cfg.static_files.connection_close,
        })
    }
}
