//! Per-connection context and the message-level error type

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::BridgeConfig;
use crate::server::file_api::FileApiError;
use crate::server::protocol::ErrorReply;

/// Shared, read-only server configuration
pub type SharedConfig = Arc<BridgeConfig>;

/// Handler context built when a connection is accepted
///
/// Holds everything a handler needs; nothing in it is shared mutably
/// across connections.
#[derive(Clone)]
pub struct ConnectionContext {
    pub config: SharedConfig,
}

impl ConnectionContext {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Directory request paths and git commands are resolved against
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Resolve a client path against the root; absolute paths replace it
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.config.root.join(path)
    }
}

/// Errors that end up as an untagged `{success:false, error}` reply
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    File(#[from] FileApiError),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BridgeError {
    pub fn to_reply(&self) -> ErrorReply {
        ErrorReply::new(self.to_string())
    }
}
