//! Build tree provisioning.
//!
//! Creates the `rpmbuild` top directory layout, merges same-named
//! subdirectories from the working repository into it with `rsync -a`, and
//! stages the discovered spec files into `SPECS/`.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::consts::{BUILD_TREE_SUBDIRS, SPECS_SUBDIR};
use crate::discover::SpecFile;
use crate::error::SeedError;

/// The `rpmbuild` top directory and its fixed subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTree {
  root: PathBuf,
}

impl BuildTree {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn subdir(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  pub fn specs_dir(&self) -> PathBuf {
    self.subdir(SPECS_SUBDIR)
  }

  /// Where a spec file is staged for the build.
  pub fn staged_spec(&self, spec: &SpecFile) -> PathBuf {
    self.specs_dir().join(spec.file_name())
  }
}

/// Create every build tree subdirectory and merge seed subtrees from `repo_dir`.
///
/// Each subdirectory is attempted even when an earlier one failed; the
/// returned error carries the number of failed steps.
pub async fn provision(tree: &BuildTree, repo_dir: &Path, rsync: &Path) -> Result<(), SeedError> {
  info!(root = ?tree.root(), "provisioning build tree");
  let mut failures = 0u32;

  for name in BUILD_TREE_SUBDIRS {
    let target = tree.subdir(name);

    if let Err(e) = create_dir(&target) {
      warn!(path = ?target, error = %e, "failed to create build tree directory");
      failures += 1;
      continue;
    }

    let seed = repo_dir.join(name);
    if seed.is_dir() {
      if let Err(e) = merge_subtree(rsync, &seed, &target).await {
        warn!(from = ?seed, to = ?target, error = %e, "failed to merge seed directory");
        failures += 1;
      }
    }
  }

  if failures > 0 {
    return Err(SeedError::BuildTreeSeedFailure {
      root: tree.root().to_path_buf(),
      failures,
    });
  }

  Ok(())
}

/// Copy every spec file into `SPECS/`, overwriting earlier copies.
pub fn stage_specs(tree: &BuildTree, repo_dir: &Path, specs: &[SpecFile]) -> Result<(), SeedError> {
  let mut failures = 0u32;

  for spec in specs {
    let from = spec.source_path(repo_dir);
    let to = tree.staged_spec(spec);
    debug!(from = ?from, to = ?to, "staging spec file");

    if let Err(e) = std::fs::copy(&from, &to) {
      warn!(spec = %spec, error = %e, "failed to stage spec file");
      failures += 1;
    }
  }

  if failures > 0 {
    return Err(SeedError::SpecStagingFailure {
      dir: tree.specs_dir(),
      failures,
    });
  }

  Ok(())
}

/// `mkdir -p` with mode 0755; existing directories are left alone.
fn create_dir(path: &Path) -> io::Result<()> {
  debug!(path = ?path, "creating build tree directory");

  let mut builder = std::fs::DirBuilder::new();
  builder.recursive(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(0o755);
  }
  builder.create(path)
}

/// `rsync -a <from>/ <to>/`: additive, archive-preserving merge.
async fn merge_subtree(rsync: &Path, from: &Path, to: &Path) -> Result<(), SeedError> {
  let source = with_trailing_slash(from);
  let destination = with_trailing_slash(to);
  debug!(rsync = ?rsync, from = ?source, to = ?destination, "merging seed directory");

  let output = Command::new(rsync)
    .arg("-a")
    .arg(&source)
    .arg(&destination)
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|e| SeedError::io(format!("failed to run {}", rsync.display()), e))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "rsync stderr");
    }
    return Err(SeedError::io(
      format!("rsync exited with {}", output.status),
      io::Error::other(stderr.trim().to_string()),
    ));
  }

  Ok(())
}

fn with_trailing_slash(path: &Path) -> OsString {
  let mut s = path.as_os_str().to_owned();
  s.push("/");
  s
}
