//! Connector and session traits.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::unblock::error::UnblockError;
use crate::unblock::types::SessionResult;

/// Everything needed to open one authenticated router session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTarget<'a> {
    pub host: &'a str,
    pub port: u16,
    pub username: &'a str,
    /// Path of the materialized private key file
    pub key_path: &'a Path,
    /// Bound on TCP connect plus handshake plus authentication
    pub ready_timeout: Duration,
    /// Bound on a single command's output collection
    pub command_timeout: Duration,
}

/// Opens authenticated sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate.
    ///
    /// # Errors
    ///
    /// * [`UnblockError::ConnectTimeout`] when `ready_timeout` elapses first
    /// * [`UnblockError::AuthenticationFailed`] when every auth method is rejected
    /// * [`UnblockError::NetworkUnreachable`] or [`UnblockError::Session`] for
    ///   transport failures
    async fn connect(
        &self,
        target: &SessionTarget<'_>,
    ) -> Result<Box<dyn RemoteSession>, UnblockError>;
}

/// An authenticated session able to run commands.
#[async_trait]
pub trait RemoteSession: Send {
    /// Run `command` and collect its output.
    ///
    /// A non-zero exit code is a normal result, not an error.
    async fn execute(&mut self, command: &str) -> Result<SessionResult, UnblockError>;

    /// Tear the session down. Never fails; problems are logged.
    async fn close(self: Box<Self>);
}
