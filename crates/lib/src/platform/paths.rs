use std::io;
use std::path::{Path, PathBuf};

use crate::consts::{BUILD_TREE_DIR, REPO_DIR_ENV};

/// Returns the user's home directory, or `None` if `HOME` is unset or empty.
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME")
    .filter(|home| !home.is_empty())
    .map(PathBuf::from)
}

/// Returns the `rpmbuild` top directory under the given home directory.
pub fn build_tree_root(home: &Path) -> PathBuf {
  home.join(BUILD_TREE_DIR)
}

/// Returns the working repository directory, canonicalized.
///
/// `RPMSEED_REPO_DIR` takes precedence; otherwise this is the directory
/// containing the running executable.
pub fn repo_dir() -> io::Result<PathBuf> {
  let dir = match std::env::var_os(REPO_DIR_ENV).filter(|dir| !dir.is_empty()) {
    Some(dir) => PathBuf::from(dir),
    None => {
      let exe = std::env::current_exe()?;
      exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))?
    }
  };
  dunce::canonicalize(dir)
}
