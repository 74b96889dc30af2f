//! Run configuration, read once from the environment.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::error::SeedError;
use crate::platform::paths;

/// Everything a run needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Config {
  /// Home directory the build tree lives under.
  pub home_dir: PathBuf,
  /// Working repository directory holding spec files and seed subtrees.
  pub repo_dir: PathBuf,
  /// Search path used to resolve external tools.
  pub search_path: OsString,
  /// Directory temporary build logs are written to.
  pub scratch_dir: PathBuf,
}

impl Config {
  pub fn new(home_dir: PathBuf, repo_dir: PathBuf, search_path: impl Into<OsString>) -> Self {
    Self {
      home_dir,
      repo_dir,
      search_path: search_path.into(),
      scratch_dir: std::env::temp_dir(),
    }
  }

  /// Use a different directory for temporary build logs.
  pub fn with_scratch_dir(mut self, scratch_dir: PathBuf) -> Self {
    self.scratch_dir = scratch_dir;
    self
  }

  /// Read `HOME`, `PATH` and `RPMSEED_REPO_DIR` from the process environment.
  pub fn from_env() -> Result<Self, SeedError> {
    let home_dir = paths::home_dir().ok_or(SeedError::MissingHome)?;
    let repo_dir = paths::repo_dir().map_err(SeedError::RepoDir)?;
    let search_path = std::env::var_os("PATH").unwrap_or_default();

    debug!(home = ?home_dir, repo = ?repo_dir, "configuration loaded");

    Ok(Self::new(home_dir, repo_dir, search_path))
  }

  /// The `rpmbuild` top directory.
  pub fn build_tree_root(&self) -> PathBuf {
    paths::build_tree_root(&self.home_dir)
  }
}
