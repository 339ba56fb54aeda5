//! Top-level operations: test connection, unblock device, key conversion.
//!
//! Every operation loads credentials and settings fresh, materializes the
//! private key into an [`EphemeralKey`] and destroys it on every exit path.
//! Each remote command gets its own session which is always closed.
//!
//! ## Unblock Flow
//!
//! ```text
//! Validating -> KeyMaterialized -> ProbeComplete -> Connected -> Executed
//!     Executed -> Success
//!     Executed -> RetryPending -> RetryExecuted -> Success | Failed
//!     Executed -> Failed
//! ```
//!
//! The retry with an adjusted duration is the only automatic retry. The
//! reachability probe is fatal for unblock and advisory for the connection
//! test.
//!
//! No operation returns an error: failures become an [`OperationOutcome`]
//! with `success: false` and an [`ErrorKind`].

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::unblock::config::{CoreSettings, EnvSettings, SettingsProvider};
use crate::unblock::error::{ErrorKind, UnblockError};
use crate::unblock::keys::{EphemeralKey, KeyFormat, detect_key_format, ensure_openssh_format};
use crate::unblock::message::UnblockMessageBuilder;
use crate::unblock::probe::probe;
use crate::unblock::remote::{Connector, SessionTarget, SshConnector};
use crate::unblock::retry::{alternative_duration, is_duration_rejection};
use crate::unblock::storage::CredentialStore;
use crate::unblock::types::{
    KeyConversionResponse, OperationOutcome, RemoteCredentials, SessionResult, UnblockRequest,
};
use crate::unblock::validator::render_command_template;

/// No-op command used to verify the session end to end.
pub const CONNECTION_TEST_COMMAND: &str = "echo \"SSH connection test\"";

/// Duration used by [`UnblockService::test_unblock`] when none is given.
pub const TEST_UNBLOCK_MINUTES: i64 = 1;

/// Progress of one unblock call, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnblockState {
    Validating,
    KeyMaterialized,
    ProbeComplete,
    Connected,
    Executed,
    RetryPending,
    RetryExecuted,
    Success,
    Failed,
}

impl UnblockState {
    pub fn is_terminal(self) -> bool {
        matches!(self, UnblockState::Success | UnblockState::Failed)
    }
}

fn enter(state: UnblockState) {
    debug!(?state, terminal = state.is_terminal(), "unblock state");
}

/// Orchestrates remote operations against the router.
pub struct UnblockService {
    store: Arc<dyn CredentialStore>,
    settings: Arc<dyn SettingsProvider>,
    connector: Arc<dyn Connector>,
}

impl UnblockService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        settings: Arc<dyn SettingsProvider>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            store,
            settings,
            connector,
        }
    }

    /// Service using real SSH sessions and environment settings.
    pub fn with_ssh(store: Arc<dyn CredentialStore>) -> Self {
        Self::new(store, Arc::new(EnvSettings), Arc::new(SshConnector::new()))
    }

    /// Verify that the router accepts our key and runs commands.
    pub async fn test_connection(&self) -> OperationOutcome {
        let operation_id = Uuid::new_v4();
        async {
            info!("Testing router connection");
            let settings = self.settings.settings();

            let credentials = match self.store.load() {
                Ok(c) => c,
                Err(e) => return OperationOutcome::from_error("SSH connection failed", &e),
            };
            let key = match materialize_key(&credentials, &settings).await {
                Ok(k) => k,
                Err(e) => return OperationOutcome::from_error("SSH key error", &e),
            };

            let outcome = self.test_with_key(&credentials, &settings, &key).await;
            key.destroy();

            if outcome.success {
                info!("Router connection test succeeded");
            } else {
                warn!("Router connection test failed: {}", outcome.message);
            }
            outcome
        }
        .instrument(info_span!("test_connection", %operation_id))
        .await
    }

    async fn test_with_key(
        &self,
        credentials: &RemoteCredentials,
        settings: &CoreSettings,
        key: &EphemeralKey,
    ) -> OperationOutcome {
        if let Err(e) = probe(&credentials.host, settings.ssh_port, settings.probe_timeout).await {
            warn!("Probe failed, trying SSH anyway: {}", e);
        }

        let target = SessionTarget {
            host: &credentials.host,
            port: settings.ssh_port,
            username: &credentials.username,
            key_path: key.path(),
            ready_timeout: settings.test_ready_timeout,
            command_timeout: settings.command_timeout,
        };

        match self.run_command(&target, CONNECTION_TEST_COMMAND).await {
            Ok(result) if result.succeeded() => OperationOutcome::success("SSH connection successful")
                .with_output(result.stdout.trim())
                .with_code(0),
            Ok(result) => {
                let diagnostic = result.diagnostic().to_string();
                OperationOutcome::failure(
                    format!("SSH connection test failed: {}", diagnostic),
                    ErrorKind::RemoteCommandFailed,
                )
                .with_output(diagnostic)
                .with_code(result.exit_code)
            }
            Err(e) => OperationOutcome::from_error("SSH connection failed", &e),
        }
    }

    /// Unblock `mac_address` for `duration_minutes`.
    pub async fn unblock_device(&self, mac_address: &str, duration_minutes: i64) -> OperationOutcome {
        let operation_id = Uuid::new_v4();
        async {
            enter(UnblockState::Validating);
            match self.try_unblock(mac_address, duration_minutes).await {
                Ok(outcome) => {
                    enter(UnblockState::Success);
                    info!("{}", outcome.message);
                    outcome
                }
                Err(e) => {
                    enter(UnblockState::Failed);
                    if e.is_validation() {
                        warn!("Unblock request rejected: {}", e);
                    } else {
                        error!("Unblock of {} failed: {:?}", mac_address, e);
                    }
                    OperationOutcome::from_error("Unblock failed", &e)
                }
            }
        }
        .instrument(info_span!("unblock_device", %operation_id, mac = %mac_address))
        .await
    }

    /// Admin diagnostic: full unblock path with a short default duration.
    pub async fn test_unblock(&self, mac_address: &str, duration_minutes: Option<i64>) -> OperationOutcome {
        self.unblock_device(mac_address, duration_minutes.unwrap_or(TEST_UNBLOCK_MINUTES))
            .await
    }

    async fn try_unblock(
        &self,
        mac_address: &str,
        duration_minutes: i64,
    ) -> Result<OperationOutcome, UnblockError> {
        let request = UnblockRequest::new(mac_address, duration_minutes)?;
        let settings = self.settings.settings();
        let credentials = self.store.load()?;
        let command = render_command_template(
            &credentials.command_template,
            &request.mac_address,
            request.duration_minutes,
        )?;

        let key = materialize_key(&credentials, &settings).await?;
        enter(UnblockState::KeyMaterialized);

        let result = self
            .unblock_with_key(&request, &credentials, &settings, &key, &command)
            .await;
        key.destroy();
        result
    }

    async fn unblock_with_key(
        &self,
        request: &UnblockRequest,
        credentials: &RemoteCredentials,
        settings: &CoreSettings,
        key: &EphemeralKey,
        command: &str,
    ) -> Result<OperationOutcome, UnblockError> {
        probe(&credentials.host, settings.ssh_port, settings.probe_timeout).await?;
        enter(UnblockState::ProbeComplete);

        let target = SessionTarget {
            host: &credentials.host,
            port: settings.ssh_port,
            username: &credentials.username,
            key_path: key.path(),
            ready_timeout: settings.unblock_ready_timeout,
            command_timeout: settings.command_timeout,
        };

        let first = self.run_command(&target, command).await?;
        enter(UnblockState::Executed);
        if first.succeeded() {
            return Ok(granted(request, request.duration_minutes, first));
        }

        if first.timed_out || !is_duration_rejection(&first.stdout) {
            return Err(first.into_error());
        }
        let Some(adjusted) = alternative_duration(request.duration_minutes) else {
            return Err(first.into_error());
        };

        enter(UnblockState::RetryPending);
        info!(
            "Router rejected {} minute(s), retrying with {}",
            request.duration_minutes, adjusted
        );
        let retry_command =
            render_command_template(&credentials.command_template, &request.mac_address, adjusted)?;
        let retry = self.run_command(&target, &retry_command).await?;
        enter(UnblockState::RetryExecuted);

        if retry.succeeded() {
            Ok(granted(request, adjusted, retry).with_adjusted_duration(adjusted))
        } else {
            Err(retry.into_error())
        }
    }

    /// Open a fresh session, run `command`, always close the session.
    async fn run_command(
        &self,
        target: &SessionTarget<'_>,
        command: &str,
    ) -> Result<SessionResult, UnblockError> {
        let mut session = self.connector.connect(target).await?;
        enter(UnblockState::Connected);

        let result = session.execute(command).await;
        session.close().await;

        if let Ok(r) = &result {
            debug!(exit_code = r.exit_code, timed_out = r.timed_out, "command finished");
        }
        result
    }

    /// Normalize pasted key text to OpenSSH format for the administrator.
    pub async fn convert_key(&self, content: &str) -> KeyConversionResponse {
        let format = detect_key_format(content);
        let converter = self.settings.settings().key_converter;

        match ensure_openssh_format(content, &converter).await {
            Ok(key) => {
                let message = if format == KeyFormat::Openssh {
                    "Key is already in OpenSSH format".to_string()
                } else {
                    format!("Key converted from {} format", format)
                };
                KeyConversionResponse {
                    success: true,
                    format,
                    converted_key: Some(key.as_str().to_string()),
                    message,
                    remediation: None,
                }
            }
            Err(e) => {
                warn!("Key conversion failed ({}): {}", format, e);
                KeyConversionResponse {
                    success: false,
                    format,
                    converted_key: None,
                    message: e.to_string(),
                    remediation: e.remediation().map(str::to_string),
                }
            }
        }
    }
}

async fn materialize_key(
    credentials: &RemoteCredentials,
    settings: &CoreSettings,
) -> Result<EphemeralKey, UnblockError> {
    let key = ensure_openssh_format(&credentials.private_key, &settings.key_converter).await?;
    EphemeralKey::materialize(&key, settings.key_dir.as_deref())
}

fn granted(request: &UnblockRequest, minutes: u32, result: SessionResult) -> OperationOutcome {
    let message = UnblockMessageBuilder::new(&request.mac_address, request.duration_minutes)
        .with_effective_duration(minutes)
        .build();

    OperationOutcome::success(message)
        .with_output(result.stdout.trim())
        .with_code(result.exit_code)
        .expiring_in(minutes)
}
