//! Credential store trait definition.

use crate::unblock::error::UnblockError;
use crate::unblock::types::RemoteCredentials;

/// Source of router credentials.
///
/// Implementations must be thread-safe (`Send + Sync`). `load` is called
/// once per operation; implementations should not cache on behalf of the
/// caller.
pub trait CredentialStore: Send + Sync {
    /// Load the current credentials.
    ///
    /// # Errors
    ///
    /// [`UnblockError::IncompleteConfiguration`] when any field is empty.
    fn load(&self) -> Result<RemoteCredentials, UnblockError>;
}
