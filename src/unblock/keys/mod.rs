//! Private key material handling.
//!
//! - [`format`]: detect OpenSSH / PuTTY / PEM keys and normalize to OpenSSH
//! - [`ephemeral`]: write a key to an owner-only file for one session

pub mod ephemeral;
pub mod format;

pub use ephemeral::EphemeralKey;
pub use format::{KeyFormat, detect_key_format, ensure_openssh_format};
