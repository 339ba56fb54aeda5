//! Authentication strategy trait definition.

use async_trait::async_trait;
use russh::client;

use crate::unblock::remote::handler::RouterClientHandler;

/// Trait for SSH authentication strategies.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// async tasks.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Attempt to authenticate with the router.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Authentication succeeded
    /// * `Ok(false)` - Authentication failed (credentials rejected)
    /// * `Err(message)` - Error during authentication attempt
    async fn authenticate(
        &self,
        handle: &mut client::Handle<RouterClientHandler>,
        username: &str,
    ) -> Result<bool, String>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}
