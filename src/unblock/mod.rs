//! Remote unblock core and its MCP tool surface.
//!
//! This module is organized into the following submodules:
//!
//! - `types`: Credentials, requests, session results and outcomes
//! - `config`: Call-time settings resolution with environment variable support
//! - `error`: Error taxonomy and transport error classification
//! - `validator`: MAC address, duration, IPv4 and command template checks
//! - `keys`: Private key format detection, conversion and ephemeral artifacts
//! - `auth`: SSH authentication strategies (key, keyboard-interactive)
//! - `remote`: Session connector traits and the russh-backed client
//! - `probe`: TCP reachability pre-flight check
//! - `retry`: Adjusted-duration retry policy
//! - `storage`: Credential store trait and key/value implementation
//! - `orchestrator`: `test_connection` / `unblock_device` entry points
//! - `commands`: MCP tool implementations

pub(crate) mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod keys;
pub(crate) mod message;
pub mod orchestrator;
pub mod probe;
pub mod remote;
pub mod retry;
pub(crate) mod schema;
pub mod storage;
pub mod types;
pub mod validator;

pub use commands::RouterUnblockTools;
pub use error::{ErrorKind, UnblockError};
pub use orchestrator::UnblockService;
pub use types::{OperationOutcome, RemoteCredentials, SessionResult, UnblockRequest};
