pub mod immutable;
pub mod paths;

/// Returns `true` when the process runs with an effective uid of 0.
#[cfg(unix)]
pub fn is_elevated() -> bool {
  nix::unistd::geteuid().is_root()
}

/// Returns `true` when the process runs with administrative rights.
#[cfg(not(unix))]
pub fn is_elevated() -> bool {
  false
}

/// Returns the host name, or `"unknown"` if it cannot be determined.
pub fn hostname() -> String {
  whoami::fallible::hostname().unwrap_or_else(|_| "unknown".to_string())
}
