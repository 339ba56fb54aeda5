//! MCP tool implementations for the router unblock service.
//!
//! - `router_test_connection`: Check that the router accepts the configured key
//! - `router_unblock_device`: Unblock a device for a number of minutes
//! - `router_test_unblock`: Admin diagnostic unblock (1 minute by default)
//! - `router_convert_key`: Normalize a pasted private key to OpenSSH format
//! - `router_update_config`: Update router address, user, key or command template
//! - `router_get_config`: Show the router configuration (never the key)
//!
//! Remote operations are admitted through a semaphore sized by
//! `ROUTER_MAX_SESSIONS` so a burst of requests cannot open unbounded
//! sessions against the router.

use std::sync::Arc;

use poem_mcpserver::{Tools, tool::StructuredContent};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::info;

use super::config::resolve_max_sessions;
use super::keys::{KeyFormat, detect_key_format};
use super::keys::format::is_public_key;
use super::orchestrator::UnblockService;
use super::storage::{
    COMMAND_TEMPLATE_KEY, MemoryCredentialStore, ROUTER_IP_KEY, SSH_KEY_KEY, SSH_USER_KEY,
};
use super::types::{KeyConversionResponse, OperationOutcome, RouterConfigView};
use super::validator::{validate_command_template, validate_ipv4};

/// MCP tools for the router unblock service.
///
/// Cloning is cheap; every clone shares the same service, store and
/// admission semaphore.
#[derive(Clone)]
pub struct RouterUnblockTools {
    service: Arc<UnblockService>,
    store: Arc<MemoryCredentialStore>,
    permits: Arc<Semaphore>,
}

impl RouterUnblockTools {
    pub fn new(
        service: Arc<UnblockService>,
        store: Arc<MemoryCredentialStore>,
        max_sessions: usize,
    ) -> Self {
        Self {
            service,
            store,
            permits: Arc::new(Semaphore::new(max_sessions.max(1))),
        }
    }

    /// Tools backed by real SSH, with credentials seeded from the environment.
    pub fn from_env() -> Self {
        let store = Arc::new(MemoryCredentialStore::from_env());
        let service = Arc::new(UnblockService::with_ssh(store.clone()));
        Self::new(service, store, resolve_max_sessions())
    }

    async fn admit(&self) -> Result<SemaphorePermit<'_>, String> {
        self.permits
            .acquire()
            .await
            .map_err(|_| "Service is shutting down".to_string())
    }

    fn config_view(&self) -> RouterConfigView {
        let key = self.store.get(SSH_KEY_KEY).filter(|k| !k.trim().is_empty());

        RouterConfigView {
            router_ip: self
                .store
                .get(ROUTER_IP_KEY)
                .map(|v| v.as_str().to_string())
                .unwrap_or_default(),
            ssh_user: self
                .store
                .get(SSH_USER_KEY)
                .map(|v| v.as_str().to_string())
                .unwrap_or_default(),
            ssh_key_configured: key.is_some(),
            ssh_key_format: key
                .as_deref()
                .map(|k| detect_key_format(k))
                .unwrap_or(KeyFormat::Unknown),
            command_template: self.store.command_template(),
        }
    }
}

#[Tools]
impl RouterUnblockTools {
    /// Test the SSH connection to the router.
    ///
    /// Runs a harmless echo command with the configured key and reports
    /// whether it succeeded.
    async fn router_test_connection(&self) -> Result<StructuredContent<OperationOutcome>, String> {
        let _permit = self.admit().await?;
        Ok(StructuredContent(self.service.test_connection().await))
    }

    /// Unblock a device on the router for a number of minutes.
    ///
    /// By default the result is the end-user view: failures carry a generic
    /// message without router output. Set `detailed=true` for the full
    /// diagnostic view.
    async fn router_unblock_device(
        &self,
        /// Device MAC address in the form "xx:xx:xx:xx:xx:xx"
        mac_address: String,
        /// Unblock duration in minutes (1 to 1440)
        duration_minutes: i64,
        /// Return router output, exit code and the full error message (default: false)
        detailed: Option<bool>,
    ) -> Result<StructuredContent<OperationOutcome>, String> {
        let _permit = self.admit().await?;
        let outcome = self
            .service
            .unblock_device(&mac_address, duration_minutes)
            .await;

        if detailed.unwrap_or(false) {
            Ok(StructuredContent(outcome))
        } else {
            Ok(StructuredContent(outcome.for_end_user()))
        }
    }

    /// Run a diagnostic unblock with full output (1 minute unless specified).
    async fn router_test_unblock(
        &self,
        /// Device MAC address in the form "xx:xx:xx:xx:xx:xx"
        mac_address: String,
        /// Unblock duration in minutes (default: 1)
        duration_minutes: Option<i64>,
    ) -> Result<StructuredContent<OperationOutcome>, String> {
        let _permit = self.admit().await?;
        Ok(StructuredContent(
            self.service
                .test_unblock(&mac_address, duration_minutes)
                .await,
        ))
    }

    /// Convert a private key (OpenSSH, PEM or PuTTY .ppk) to OpenSSH format.
    ///
    /// Nothing is stored. Use `router_update_config` to save the result.
    async fn router_convert_key(
        &self,
        /// Full private key text
        key_content: String,
    ) -> StructuredContent<KeyConversionResponse> {
        StructuredContent(self.service.convert_key(&key_content).await)
    }

    /// Update the router configuration. Only the given fields change.
    ///
    /// All fields are validated before anything is stored. The key is never
    /// echoed back.
    async fn router_update_config(
        &self,
        /// Router IPv4 address (e.g., "192.168.1.1")
        router_ip: Option<String>,
        /// SSH username on the router
        ssh_user: Option<String>,
        /// Private key text (OpenSSH, PEM or PuTTY .ppk)
        ssh_key: Option<String>,
        /// Command template containing {MAC} and {MINUTES}
        command_template: Option<String>,
    ) -> Result<StructuredContent<RouterConfigView>, String> {
        if router_ip.as_deref().is_some_and(|ip| !validate_ipv4(ip.trim())) {
            return Err(format!(
                "Invalid router IPv4 address: '{}'",
                router_ip.as_deref().unwrap_or_default()
            ));
        }

        if ssh_user.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err("SSH username must not be empty".to_string());
        }

        if let Some(key) = &ssh_key {
            if is_public_key(key) {
                return Err(
                    "A public key was supplied; paste the private key instead".to_string(),
                );
            }
            if detect_key_format(key) == KeyFormat::Unknown {
                return Err(
                    "Unrecognized key format; supported formats are OpenSSH, PEM and PuTTY (.ppk)"
                        .to_string(),
                );
            }
        }

        if let Some(template) = &command_template {
            validate_command_template(template).map_err(|e| e.to_string())?;
        }

        let mut changed = Vec::new();
        if let Some(ip) = router_ip {
            self.store.set(ROUTER_IP_KEY, ip.trim());
            changed.push(ROUTER_IP_KEY);
        }
        if let Some(user) = ssh_user {
            self.store.set(SSH_USER_KEY, user.trim());
            changed.push(SSH_USER_KEY);
        }
        if let Some(key) = ssh_key {
            self.store.set(SSH_KEY_KEY, key.trim());
            changed.push(SSH_KEY_KEY);
        }
        if let Some(template) = command_template {
            self.store.set(COMMAND_TEMPLATE_KEY, template);
            changed.push(COMMAND_TEMPLATE_KEY);
        }
        info!("Router configuration updated: {:?}", changed);

        Ok(StructuredContent(self.config_view()))
    }

    /// Show the current router configuration. The key itself is never returned.
    async fn router_get_config(&self) -> StructuredContent<RouterConfigView> {
        StructuredContent(self.config_view())
    }
}
