//! Authentication chain for trying multiple strategies.

use std::path::PathBuf;

use async_trait::async_trait;
use russh::client;
use tracing::debug;

use crate::unblock::remote::handler::RouterClientHandler;

use super::traits::AuthStrategy;
use super::{KeyAuth, KeyboardInteractiveAuth};

/// Authentication chain that tries multiple strategies in order.
///
/// The first successful strategy stops the chain. When every strategy fails,
/// the last error (or rejection) is returned.
pub struct AuthChain {
    strategies: Vec<Box<dyn AuthStrategy>>,
}

impl AuthChain {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Chain used for router sessions: key file, then keyboard-interactive.
    pub fn for_router(key_path: impl Into<PathBuf>) -> Self {
        Self::new().with_key(key_path).with_keyboard_interactive()
    }

    pub fn with_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.strategies.push(Box::new(KeyAuth::new(key_path)));
        self
    }

    pub fn with_keyboard_interactive(mut self) -> Self {
        self.strategies.push(Box::new(KeyboardInteractiveAuth::new()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }
}

impl Default for AuthChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStrategy for AuthChain {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<RouterClientHandler>,
        username: &str,
    ) -> Result<bool, String> {
        if self.is_empty() {
            return Err("No authentication strategies configured".to_string());
        }

        let mut last_error = None;

        for strategy in &self.strategies {
            debug!("Trying authentication strategy: {}", strategy.name());

            match strategy.authenticate(handle, username).await {
                Ok(true) => {
                    debug!("Authentication succeeded with strategy: {}", strategy.name());
                    return Ok(true);
                }
                Ok(false) => {
                    debug!("Authentication rejected for strategy: {}", strategy.name());
                    last_error = Some(format!("{} authentication rejected", strategy.name()));
                }
                Err(e) => {
                    debug!("Authentication error with strategy {}: {}", strategy.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| "All authentication methods failed".to_string()))
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_chain_empty() {
        let chain = AuthChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
    }

    #[test]
    fn test_router_chain_tries_key_first() {
        let chain = AuthChain::for_router("/tmp/temp_abc");
        let names: Vec<_> = chain.strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["key", "keyboard-interactive"]);
    }

    #[test]
    fn test_auth_chain_fluent_api_preserves_order() {
        let chain = AuthChain::new()
            .with_keyboard_interactive()
            .with_key("/key1")
            .with_key("/key2");

        let names: Vec<_> = chain.strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["keyboard-interactive", "key", "key"]);
    }

    #[test]
    fn test_auth_chain_default_is_empty() {
        let chain = AuthChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.name(), "chain");
    }

    #[test]
    fn test_auth_chain_implements_auth_strategy() {
        let chain = AuthChain::for_router("/tmp/temp_abc");
        fn requires_auth_strategy(_: &dyn AuthStrategy) {}
        requires_auth_strategy(&chain);
    }

    #[test]
    fn test_auth_chain_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthChain>();
    }
}
