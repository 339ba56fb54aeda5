//! Error taxonomy for the remote unblock core.
//!
//! Validation errors (`InvalidMacAddress`, `InvalidDuration`,
//! `IncompleteConfiguration`) are raised before any remote interaction.
//! Transport errors coming out of russh are plain strings, so they are
//! classified by message content into three buckets:
//!
//! 1. **Authentication failures**: rejected credentials, denied access.
//!    These map to [`UnblockError::AuthenticationFailed`].
//!
//! 2. **Reachability failures**: refused, reset, unreachable hosts.
//!    These map to [`UnblockError::NetworkUnreachable`].
//!
//! 3. **Everything else**: protocol, negotiation and channel errors map to
//!    [`UnblockError::Session`].
//!
//! Authentication patterns are checked first. A message that mentions both
//! a connection problem and an authentication failure is an auth failure.
//!
//! # Examples
//!
//! ```rust,ignore
//! use router_unblock::unblock::error::classify_transport_error;
//!
//! let err = classify_transport_error("Permission denied (publickey)");
//! assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
//!
//! let err = classify_transport_error("Connection refused (os error 111)");
//! assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
//! ```

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unblock::keys::format::MANUAL_CONVERSION_STEPS;

/// Authentication error patterns.
const AUTH_ERRORS: &[&str] = &[
    "authentication failed",
    "key authentication failed",
    "keyboard-interactive",
    "permission denied",
    "publickey",
    "auth fail",
    "no authentication",
    "all authentication methods failed",
    "authentication rejected",
    "failed to load private key",
];

/// Reachability error patterns.
const UNREACHABLE_ERRORS: &[&str] = &[
    "connection refused",
    "connection reset",
    "network is unreachable",
    "no route to host",
    "host is down",
    "host unreachable",
    "temporary failure",
    "broken pipe",
];

/// Errors produced by the remote unblock core.
#[derive(Debug, Error)]
pub enum UnblockError {
    #[error("Invalid private key format: {0}")]
    InvalidKeyFormat(String),

    #[error("PuTTY key needs manual conversion: {reason}")]
    ManualConversionRequired { reason: String },

    #[error("Network unreachable: {reason}")]
    NetworkUnreachable { reason: String },

    #[error("SSH connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("SSH authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid MAC address: '{0}' (expected xx:xx:xx:xx:xx:xx)")]
    InvalidMacAddress(String),

    #[error("Invalid duration: {0} minute(s) (expected 1 to 1440)")]
    InvalidDuration(i64),

    #[error("Incomplete router configuration: {0}")]
    IncompleteConfiguration(String),

    #[error("Remote command failed with exit code {exit_code}")]
    RemoteCommandFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("SSH session error: {0}")]
    Session(String),

    #[error("Failed to store ephemeral key: {0}")]
    KeyStorage(String),
}

/// Serializable classification of an [`UnblockError`], embedded in outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidKeyFormat,
    ManualConversionRequired,
    NetworkUnreachable,
    ConnectTimeout,
    AuthenticationFailed,
    InvalidMacAddress,
    InvalidDuration,
    IncompleteConfiguration,
    RemoteCommandFailed,
    Session,
    KeyStorage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidKeyFormat => "invalid_key_format",
            ErrorKind::ManualConversionRequired => "manual_conversion_required",
            ErrorKind::NetworkUnreachable => "network_unreachable",
            ErrorKind::ConnectTimeout => "connect_timeout",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::InvalidMacAddress => "invalid_mac_address",
            ErrorKind::InvalidDuration => "invalid_duration",
            ErrorKind::IncompleteConfiguration => "incomplete_configuration",
            ErrorKind::RemoteCommandFailed => "remote_command_failed",
            ErrorKind::Session => "session",
            ErrorKind::KeyStorage => "key_storage",
        };
        f.write_str(name)
    }
}

impl UnblockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnblockError::InvalidKeyFormat(_) => ErrorKind::InvalidKeyFormat,
            UnblockError::ManualConversionRequired { .. } => ErrorKind::ManualConversionRequired,
            UnblockError::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            UnblockError::ConnectTimeout(_) => ErrorKind::ConnectTimeout,
            UnblockError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            UnblockError::InvalidMacAddress(_) => ErrorKind::InvalidMacAddress,
            UnblockError::InvalidDuration(_) => ErrorKind::InvalidDuration,
            UnblockError::IncompleteConfiguration(_) => ErrorKind::IncompleteConfiguration,
            UnblockError::RemoteCommandFailed { .. } => ErrorKind::RemoteCommandFailed,
            UnblockError::Session(_) => ErrorKind::Session,
            UnblockError::KeyStorage(_) => ErrorKind::KeyStorage,
        }
    }

    /// Whether the error was raised before any remote interaction.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UnblockError::InvalidMacAddress(_)
                | UnblockError::InvalidDuration(_)
                | UnblockError::IncompleteConfiguration(_)
        )
    }

    /// Human-actionable steps for errors the administrator has to fix by hand.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            UnblockError::ManualConversionRequired { .. } => Some(MANUAL_CONVERSION_STEPS),
            _ => None,
        }
    }
}

/// Classify a transport-level error message into an [`UnblockError`].
///
/// Authentication patterns take precedence over reachability patterns.
pub fn classify_transport_error(error: &str) -> UnblockError {
    let error_lower = error.to_lowercase();

    if AUTH_ERRORS.iter().any(|p| error_lower.contains(p)) {
        return UnblockError::AuthenticationFailed(error.to_string());
    }

    if UNREACHABLE_ERRORS.iter().any(|p| error_lower.contains(p)) {
        return UnblockError::NetworkUnreachable {
            reason: error.to_string(),
        };
    }

    UnblockError::Session(error.to_string())
}
