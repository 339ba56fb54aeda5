//! Call-time settings resolution for the unblock core.
//!
//! Settings are read when an operation starts, never cached at process start,
//! so an administrator can retune timeouts without a restart. Each value is
//! resolved with a two-tier priority:
//!
//! 1. **Environment Variable** - Value from environment variable
//! 2. **Default** - Built-in default value
//!
//! Unparseable values fall back to the default.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ROUTER_SSH_PORT` | 22 | Remote shell port for probe and session |
//! | `ROUTER_PROBE_TIMEOUT_MS` | 5000ms | Connectivity probe timeout |
//! | `ROUTER_TEST_READY_TIMEOUT` | 15s | Handshake and auth bound for test connection |
//! | `ROUTER_UNBLOCK_READY_TIMEOUT` | 10s | Handshake and auth bound for unblock |
//! | `ROUTER_COMMAND_TIMEOUT` | 30s | Remote command execution timeout |
//! | `ROUTER_MAX_SESSIONS` | 2 | Concurrent remote sessions admitted by the tools |
//! | `SSH_KEYS_PATH` | temp dir | Directory for ephemeral key files |
//! | `PUTTYGEN_PATH` | `puttygen` | External PuTTY key converter |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default remote shell port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default connectivity probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

/// Default handshake and auth timeout for test connections, in seconds
pub const DEFAULT_TEST_READY_TIMEOUT_SECS: u64 = 15;

/// Default handshake and auth timeout for unblock requests, in seconds
pub const DEFAULT_UNBLOCK_READY_TIMEOUT_SECS: u64 = 10;

/// Default remote command execution timeout in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Default number of concurrent remote sessions
pub const DEFAULT_MAX_SESSIONS: usize = 2;

/// Default external PuTTY converter binary
pub const DEFAULT_KEY_CONVERTER: &str = "puttygen";

pub const SSH_PORT_ENV_VAR: &str = "ROUTER_SSH_PORT";
pub const PROBE_TIMEOUT_MS_ENV_VAR: &str = "ROUTER_PROBE_TIMEOUT_MS";
pub const TEST_READY_TIMEOUT_ENV_VAR: &str = "ROUTER_TEST_READY_TIMEOUT";
pub const UNBLOCK_READY_TIMEOUT_ENV_VAR: &str = "ROUTER_UNBLOCK_READY_TIMEOUT";
pub const COMMAND_TIMEOUT_ENV_VAR: &str = "ROUTER_COMMAND_TIMEOUT";
pub const MAX_SESSIONS_ENV_VAR: &str = "ROUTER_MAX_SESSIONS";
pub const KEYS_PATH_ENV_VAR: &str = "SSH_KEYS_PATH";
pub const KEY_CONVERTER_ENV_VAR: &str = "PUTTYGEN_PATH";

/// Tunables for one orchestrated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub ssh_port: u16,
    pub probe_timeout: Duration,
    pub test_ready_timeout: Duration,
    pub unblock_ready_timeout: Duration,
    pub command_timeout: Duration,
    /// `None` uses the system temp directory
    pub key_dir: Option<PathBuf>,
    pub key_converter: PathBuf,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            ssh_port: DEFAULT_SSH_PORT,
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            test_ready_timeout: Duration::from_secs(DEFAULT_TEST_READY_TIMEOUT_SECS),
            unblock_ready_timeout: Duration::from_secs(DEFAULT_UNBLOCK_READY_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            key_dir: None,
            key_converter: PathBuf::from(DEFAULT_KEY_CONVERTER),
        }
    }
}

impl CoreSettings {
    /// Resolve every setting from the environment.
    pub fn from_env() -> Self {
        Self {
            ssh_port: resolve_ssh_port(),
            probe_timeout: resolve_probe_timeout(),
            test_ready_timeout: resolve_test_ready_timeout(),
            unblock_ready_timeout: resolve_unblock_ready_timeout(),
            command_timeout: resolve_command_timeout(),
            key_dir: resolve_key_dir(),
            key_converter: resolve_key_converter(),
        }
    }
}

/// Source of settings, consulted at the start of every operation.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> CoreSettings;
}

/// Reads the environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

impl SettingsProvider for EnvSettings {
    fn settings(&self) -> CoreSettings {
        CoreSettings::from_env()
    }
}

/// A fixed value is its own provider.
impl SettingsProvider for CoreSettings {
    fn settings(&self) -> CoreSettings {
        self.clone()
    }
}

fn env_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Resolve the remote shell port: env var -> default
pub fn resolve_ssh_port() -> u16 {
    env_or(SSH_PORT_ENV_VAR, DEFAULT_SSH_PORT)
}

/// Resolve the probe timeout: env var (milliseconds) -> default
pub fn resolve_probe_timeout() -> Duration {
    Duration::from_millis(env_or(PROBE_TIMEOUT_MS_ENV_VAR, DEFAULT_PROBE_TIMEOUT_MS))
}

/// Resolve the test-connection ready timeout: env var (seconds) -> default
pub fn resolve_test_ready_timeout() -> Duration {
    Duration::from_secs(env_or(
        TEST_READY_TIMEOUT_ENV_VAR,
        DEFAULT_TEST_READY_TIMEOUT_SECS,
    ))
}

/// Resolve the unblock ready timeout: env var (seconds) -> default
pub fn resolve_unblock_ready_timeout() -> Duration {
    Duration::from_secs(env_or(
        UNBLOCK_READY_TIMEOUT_ENV_VAR,
        DEFAULT_UNBLOCK_READY_TIMEOUT_SECS,
    ))
}

/// Resolve the command execution timeout: env var (seconds) -> default
pub fn resolve_command_timeout() -> Duration {
    Duration::from_secs(env_or(COMMAND_TIMEOUT_ENV_VAR, DEFAULT_COMMAND_TIMEOUT_SECS))
}

/// Resolve the concurrent session cap: env var -> default. Zero is raised to one.
pub fn resolve_max_sessions() -> usize {
    env_or(MAX_SESSIONS_ENV_VAR, DEFAULT_MAX_SESSIONS).max(1)
}

/// Resolve the ephemeral key directory: env var -> none (system temp dir)
pub fn resolve_key_dir() -> Option<PathBuf> {
    env::var(KEYS_PATH_ENV_VAR)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

/// Resolve the PuTTY converter path: env var -> default
pub fn resolve_key_converter() -> PathBuf {
    env::var(KEY_CONVERTER_ENV_VAR)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_CONVERTER))
}
