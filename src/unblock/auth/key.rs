//! Private key file SSH authentication.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use russh::{client, keys};
use tracing::debug;

use crate::unblock::remote::handler::RouterClientHandler;

use super::traits::AuthStrategy;

/// Loads a passphrase-less private key from a file (normally the ephemeral
/// key artifact) and uses it for public key authentication.
pub struct KeyAuth {
    key_path: PathBuf,
}

impl KeyAuth {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }
}

#[async_trait]
impl AuthStrategy for KeyAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<RouterClientHandler>,
        username: &str,
    ) -> Result<bool, String> {
        let key_pair = keys::load_secret_key(&self.key_path, None)
            .map_err(|e| format!("Failed to load private key from {:?}: {}", self.key_path, e))?;

        // Old dropbear builds only know ssh-rsa; let the server pick the hash
        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .ok()
            .flatten()
            .flatten();
        debug!("Using RSA hash algorithm for key auth: {:?}", hash_alg);

        let key_with_hash = keys::PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg);

        let result = handle
            .authenticate_publickey(username, key_with_hash)
            .await
            .map_err(|e| format!("Key authentication failed: {}", e))?;

        Ok(result.success())
    }

    fn name(&self) -> &'static str {
        "key"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_auth_name() {
        let auth = KeyAuth::new("/tmp/temp_abc");
        assert_eq!(auth.name(), "key");
    }

    #[test]
    fn test_key_auth_from_pathbuf() {
        let path = PathBuf::from("/tmp/temp_abc");
        let auth = KeyAuth::new(path.clone());
        assert_eq!(auth.key_path, path);
    }
}
