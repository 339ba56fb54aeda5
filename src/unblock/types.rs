//! Data model shared by the unblock core and its callers.
//!
//! Outcome types implement `Serialize`, `Deserialize`, and `JsonSchema` so the
//! MCP layer can return them as structured content. Field names follow the
//! camelCase JSON contract expected by the request-handling layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::unblock::error::{ErrorKind, UnblockError};
use crate::unblock::keys::format::KeyFormat;
use crate::unblock::validator::{normalize_mac_address, validate_duration};

/// Command template used when none is configured.
pub const DEFAULT_COMMAND_TEMPLATE: &str =
    "SSH_ORIGINAL_COMMAND=\"unblock {MAC} {MINUTES}\" sh /tmp/kidtemp_unblock.sh";

/// Generic failure text shown to unauthenticated end users.
pub const END_USER_FAILURE_MESSAGE: &str =
    "The device could not be unblocked right now. Please try again later.";

/// Router access details, loaded fresh from the credential store per operation.
#[derive(Clone)]
pub struct RemoteCredentials {
    pub host: String,
    pub username: String,
    pub private_key: Zeroizing<String>,
    pub command_template: String,
}

impl RemoteCredentials {
    /// Fail with `IncompleteConfiguration` naming every empty field.
    pub fn ensure_complete(&self) -> Result<(), UnblockError> {
        let missing: Vec<&str> = [
            ("router address", self.host.trim().is_empty()),
            ("SSH username", self.username.trim().is_empty()),
            ("SSH private key", self.private_key.trim().is_empty()),
            ("command template", self.command_template.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(UnblockError::IncompleteConfiguration(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("private_key", &"<redacted>")
            .field("command_template", &self.command_template)
            .finish()
    }
}

/// A validated unblock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnblockRequest {
    /// Uppercase, colon-separated.
    pub mac_address: String,
    pub duration_minutes: u32,
}

impl UnblockRequest {
    pub fn new(mac_address: &str, duration_minutes: i64) -> Result<Self, UnblockError> {
        let mac_address = normalize_mac_address(mac_address)?;

        if !validate_duration(duration_minutes) {
            return Err(UnblockError::InvalidDuration(duration_minutes));
        }

        Ok(Self {
            mac_address,
            duration_minutes: duration_minutes as u32,
        })
    }
}

/// Captured result of one remote command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    /// -1 when the remote side reported no exit status
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Whether the command timed out (partial output may be available)
    #[serde(default)]
    pub timed_out: bool,
}

impl SessionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Most useful output fragment for diagnostics: stderr, else stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }

    pub fn into_error(self) -> UnblockError {
        UnblockError::RemoteCommandFailed {
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Value returned to callers of the orchestrator. Never carries key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    /// Remote command output fragment (stdout on success, stderr/stdout on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Duration actually granted when the requested one was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "crate::unblock::schema::optional_uint")]
    pub adjusted_duration: Option<u32>,
    /// Remote exit code, when a command ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// When the granted access ends (RFC3339 format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Failure classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output: None,
            adjusted_duration: None,
            code: None,
            expires_at: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: ErrorKind) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            adjusted_duration: None,
            code: None,
            expires_at: None,
            error: Some(error),
        }
    }

    /// Failure outcome for `err`, prefixing the message with `context`.
    pub fn from_error(context: &str, err: &UnblockError) -> Self {
        let mut message = format!("{}: {}", context, err);
        if let Some(remediation) = err.remediation() {
            message.push_str("\n\n");
            message.push_str(remediation);
        }

        let mut outcome = Self::failure(message, err.kind());
        if let UnblockError::RemoteCommandFailed {
            exit_code,
            stdout,
            stderr,
        } = err
        {
            outcome.code = Some(*exit_code);
            let fragment = if stderr.trim().is_empty() { stdout } else { stderr };
            outcome.output = Some(fragment.trim().to_string());
        }
        outcome
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_adjusted_duration(mut self, minutes: u32) -> Self {
        self.adjusted_duration = Some(minutes);
        self
    }

    /// Record the expiry of a grant of `minutes` starting now.
    pub fn expiring_in(mut self, minutes: u32) -> Self {
        let expires = chrono::Utc::now() + chrono::Duration::minutes(i64::from(minutes));
        self.expires_at = Some(expires.to_rfc3339());
        self
    }

    /// View suitable for an unauthenticated end user: no remote output, no
    /// exit codes, and a generic message on failure.
    pub fn for_end_user(&self) -> Self {
        if self.success {
            Self {
                output: None,
                code: None,
                ..self.clone()
            }
        } else {
            Self {
                success: false,
                message: END_USER_FAILURE_MESSAGE.to_string(),
                output: None,
                adjusted_duration: None,
                code: None,
                expires_at: None,
                error: self.error,
            }
        }
    }
}

/// Result of normalizing a pasted private key to OpenSSH format.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyConversionResponse {
    pub success: bool,
    pub format: KeyFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_key: Option<String>,
    pub message: String,
    /// Manual steps when automatic conversion is not possible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// Router configuration as shown to the administrator. The key itself is
/// never included.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfigView {
    pub router_ip: String,
    pub ssh_user: String,
    pub ssh_key_configured: bool,
    pub ssh_key_format: KeyFormat,
    pub command_template: String,
}
