//! Read-only permission hardening for published artifacts.
//!
//! Built packages are left write-protected (0444) both in the build tree and
//! in the working directory.

use std::path::Path;

use tracing::debug;

/// Error during permission changes.
#[derive(Debug, thiserror::Error)]
pub enum ImmutableError {
  #[error("failed to set permissions on {path}: {source}")]
  SetPermissions {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read metadata for {path}: {source}")]
  Metadata {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Make a single file read-only for owner, group and others.
///
/// - **Unix**: sets mode 0444
/// - **Other**: sets the read-only attribute
pub fn make_readonly(path: &Path) -> Result<(), ImmutableError> {
  debug!(path = ?path, "making file read-only");

  let metadata = std::fs::metadata(path).map_err(|e| ImmutableError::Metadata {
    path: path.display().to_string(),
    source: e,
  })?;

  let mut perms = metadata.permissions();
  set_readonly_bits(&mut perms);

  std::fs::set_permissions(path, perms).map_err(|e| ImmutableError::SetPermissions {
    path: path.display().to_string(),
    source: e,
  })
}

#[cfg(unix)]
fn set_readonly_bits(perms: &mut std::fs::Permissions) {
  use std::os::unix::fs::PermissionsExt;
  perms.set_mode(0o444);
}

#[cfg(not(unix))]
fn set_readonly_bits(perms: &mut std::fs::Permissions) {
  perms.set_readonly(true);
}
