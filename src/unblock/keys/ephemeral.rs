//! Short-lived, owner-only key files.
//!
//! An [`EphemeralKey`] exists for exactly one orchestrated operation. It is
//! created right before the session attempt and destroyed on every exit
//! path. [`EphemeralKey::destroy`] never fails: a cleanup error is logged and
//! swallowed so it cannot mask the outcome of the operation. If the value is
//! dropped without `destroy` (for instance during a panic) the file is still
//! removed by `tempfile`.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::unblock::error::UnblockError;
use crate::unblock::keys::format::has_private_key_envelope;

/// File name prefix of ephemeral key artifacts.
pub const KEY_FILE_PREFIX: &str = "temp_";

pub struct EphemeralKey {
    file: NamedTempFile,
}

impl EphemeralKey {
    /// Write `secret` to a unique owner-only file in `dir` (or the system
    /// temp directory). A trailing newline is appended when missing.
    pub fn materialize(secret: &str, dir: Option<&Path>) -> Result<Self, UnblockError> {
        if !has_private_key_envelope(secret) {
            return Err(UnblockError::InvalidKeyFormat(
                "missing -----BEGIN/END ... PRIVATE KEY----- envelope".to_string(),
            ));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(KEY_FILE_PREFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o600));
        }

        let file = match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    UnblockError::KeyStorage(format!("cannot create {}: {}", dir.display(), e))
                })?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .map_err(|e| UnblockError::KeyStorage(e.to_string()))?;

        let mut key = Self { file };
        key.write_secret(secret)?;

        debug!("Materialized ephemeral key at {}", key.path().display());
        Ok(key)
    }

    fn write_secret(&mut self, secret: &str) -> Result<(), UnblockError> {
        let handle = self.file.as_file_mut();
        let io = |e: std::io::Error| UnblockError::KeyStorage(e.to_string());

        handle.write_all(secret.as_bytes()).map_err(io)?;
        if !secret.ends_with('\n') {
            handle.write_all(b"\n").map_err(io)?;
        }
        handle.sync_all().map_err(io)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the artifact. Errors are logged, never returned.
    pub fn destroy(self) {
        let path = self.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed ephemeral key {}", path.display()),
            Err(e) => warn!("Failed to remove ephemeral key {}: {}", path.display(), e),
        }
    }
}

impl std::fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("path", &self.path())
            .finish()
    }
}
