//! russh-backed router session client.
//!
//! ## Session Lifecycle
//!
//! 1. **Client Configuration**: a legacy-inclusive algorithm list, because
//!    router firmware ships old SSH daemons that only speak SHA-1 key
//!    exchange and CBC ciphers.
//!
//! 2. **Connection and Authentication**: TCP connect, handshake and the
//!    [`AuthChain`] (key file, then keyboard-interactive) all run under a
//!    single ready timeout. The ready timeout ends with authentication.
//!
//! 3. **Command Execution**: a session channel runs one command; stdout,
//!    stderr and the exit status are collected until the channel closes or
//!    the command timeout elapses. A connection lost before the command
//!    finished is a [`UnblockError::Session`], not an exit code.
//!
//! 4. **Teardown**: the connection is disconnected explicitly.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::{ChannelMsg, Disconnect, Preferred, client};
use tracing::{debug, warn};

use crate::unblock::auth::{AuthChain, AuthStrategy};
use crate::unblock::error::{UnblockError, classify_transport_error};
use crate::unblock::types::SessionResult;

use super::handler::RouterClientHandler;
use super::traits::{Connector, RemoteSession, SessionTarget};

/// Key exchange methods, modern first, down to group1-sha1.
const KEX_ALGORITHMS: &[russh::kex::Name] = &[
    russh::kex::CURVE25519,
    russh::kex::CURVE25519_PRE_RFC_8731,
    russh::kex::ECDH_SHA2_NISTP256,
    russh::kex::ECDH_SHA2_NISTP384,
    russh::kex::ECDH_SHA2_NISTP521,
    russh::kex::DH_G16_SHA512,
    russh::kex::DH_G14_SHA256,
    russh::kex::DH_GEX_SHA256,
    russh::kex::DH_GEX_SHA1,
    russh::kex::DH_G14_SHA1,
    russh::kex::DH_G1_SHA1,
    russh::kex::EXTENSION_SUPPORT_AS_CLIENT,
    russh::kex::EXTENSION_OPENSSH_STRICT_KEX_AS_CLIENT,
];

const CIPHERS: &[russh::cipher::Name] = &[
    russh::cipher::CHACHA20_POLY1305,
    russh::cipher::AES_256_GCM,
    russh::cipher::AES_128_GCM,
    russh::cipher::AES_256_CTR,
    russh::cipher::AES_192_CTR,
    russh::cipher::AES_128_CTR,
    russh::cipher::AES_256_CBC,
    russh::cipher::AES_192_CBC,
    russh::cipher::AES_128_CBC,
];

const MACS: &[russh::mac::Name] = &[
    russh::mac::HMAC_SHA512_ETM,
    russh::mac::HMAC_SHA256_ETM,
    russh::mac::HMAC_SHA512,
    russh::mac::HMAC_SHA256,
    russh::mac::HMAC_SHA1_ETM,
    russh::mac::HMAC_SHA1,
];

/// Build the russh client configuration for router sessions.
///
/// No inactivity timeout: router scripts may stay silent for a long time and
/// the command timeout bounds execution instead. Keepalives go out every 10
/// seconds with at most 3 unanswered.
pub fn build_client_config() -> Arc<client::Config> {
    let preferred = Preferred {
        kex: Cow::Borrowed(KEX_ALGORITHMS),
        cipher: Cow::Borrowed(CIPHERS),
        mac: Cow::Borrowed(MACS),
        ..Preferred::default()
    };

    Arc::new(client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(10)),
        keepalive_max: 3,
        preferred,
        ..Default::default()
    })
}

/// [`Connector`] that opens real SSH connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

impl SshConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        target: &SessionTarget<'_>,
    ) -> Result<Box<dyn RemoteSession>, UnblockError> {
        let handle = tokio::time::timeout(target.ready_timeout, open_authenticated(target))
            .await
            .map_err(|_| UnblockError::ConnectTimeout(target.ready_timeout))??;

        Ok(Box::new(SshSession {
            handle,
            command_timeout: target.command_timeout,
        }))
    }
}

async fn open_authenticated(
    target: &SessionTarget<'_>,
) -> Result<client::Handle<RouterClientHandler>, UnblockError> {
    let config = build_client_config();

    debug!("Connecting to {}:{}", target.host, target.port);
    let mut handle = client::connect(config, (target.host, target.port), RouterClientHandler)
        .await
        .map_err(|e| classify_transport_error(&format!("Failed to connect: {}", e)))?;

    let chain = AuthChain::for_router(target.key_path);
    match chain.authenticate(&mut handle, target.username).await {
        Ok(true) => Ok(handle),
        Ok(false) => Err(UnblockError::AuthenticationFailed(
            "no authentication methods succeeded".to_string(),
        )),
        Err(e) => match classify_transport_error(&e) {
            // Anything that goes wrong during the auth phase is reported as auth
            UnblockError::Session(reason) | UnblockError::NetworkUnreachable { reason } => {
                Err(UnblockError::AuthenticationFailed(reason))
            }
            other => Err(other),
        },
    }
}

/// An authenticated russh session.
struct SshSession {
    handle: client::Handle<RouterClientHandler>,
    command_timeout: Duration,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn execute(&mut self, command: &str) -> Result<SessionResult, UnblockError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| UnblockError::Session(format!("Failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| UnblockError::Session(format!("Failed to execute command: {}", e)))?;

        let mut stdout = Vec::with_capacity(1024);
        let mut stderr = Vec::with_capacity(256);
        let mut exit_code: Option<u32> = None;

        let collected = tokio::time::timeout(self.command_timeout, async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
                    // ext == 1 is stderr
                    Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                        stderr.extend_from_slice(&data)
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => exit_code = Some(exit_status),
                    Some(ChannelMsg::Eof) => {
                        if exit_code.is_some() {
                            return Ok(());
                        }
                    }
                    Some(ChannelMsg::Close) => return Ok(()),
                    Some(_) => {}
                    None if exit_code.is_some() => return Ok(()),
                    None => {
                        return Err(UnblockError::Session(
                            "connection lost before the command finished".to_string(),
                        ));
                    }
                }
            }
        })
        .await;

        let timed_out = match collected {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                warn!(
                    "Command aborted ({} bytes stdout, {} bytes stderr received): {}",
                    stdout.len(),
                    stderr.len(),
                    e
                );
                return Err(e);
            }
            Err(_) => {
                warn!(
                    "Command timed out after {:?}, returning partial output ({} bytes stdout, {} bytes stderr)",
                    self.command_timeout,
                    stdout.len(),
                    stderr.len()
                );
                true
            }
        };

        let _ = channel.close().await;

        Ok(SessionResult {
            exit_code: exit_code_from(exit_code),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            timed_out,
        })
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            debug!("Disconnect reported an error: {}", e);
        }
    }
}

/// Remote exit status as reported to callers; -1 when absent or out of range.
fn exit_code_from(status: Option<u32>) -> i32 {
    status.and_then(|c| i32::try_from(c).ok()).unwrap_or(-1)
}
