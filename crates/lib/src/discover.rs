//! Spec file discovery.
//!
//! Walks the working repository for regular files ending in `.spec`
//! (case-insensitive) and returns them sorted by relative path.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::consts::SPEC_EXTENSION;
use crate::error::SeedError;

/// A discovered spec file, relative to the working repository directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecFile {
  relative: PathBuf,
}

impl SpecFile {
  pub fn new(relative: impl Into<PathBuf>) -> Self {
    Self {
      relative: relative.into(),
    }
  }

  /// Path relative to the working repository directory, without a `./` prefix.
  pub fn relative(&self) -> &Path {
    &self.relative
  }

  /// Base name, used when staging into `SPECS/` and naming the build log.
  pub fn file_name(&self) -> String {
    self
      .relative
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default()
  }

  /// Absolute path under `repo_dir`.
  pub fn source_path(&self, repo_dir: &Path) -> PathBuf {
    repo_dir.join(&self.relative)
  }
}

impl fmt::Display for SpecFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.relative.display())
  }
}

/// Whether a file name ends in `.spec`, ignoring case.
pub fn is_spec_file(name: &OsStr) -> bool {
  name.to_string_lossy().to_lowercase().ends_with(SPEC_EXTENSION)
}

/// Find every spec file under `repo_dir`, sorted lexicographically.
///
/// Symlinks are not followed. Unreadable entries are logged and skipped.
pub fn discover_spec_files(repo_dir: &Path) -> Result<Vec<SpecFile>, SeedError> {
  debug!(dir = ?repo_dir, "searching for spec files");

  let mut specs = Vec::new();
  for entry in WalkDir::new(repo_dir).follow_links(false) {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        warn!(error = %e, "skipping unreadable entry");
        continue;
      }
    };

    if !entry.file_type().is_file() || !is_spec_file(entry.file_name()) {
      continue;
    }

    let relative = entry.path().strip_prefix(repo_dir).unwrap_or(entry.path());
    specs.push(SpecFile::new(relative));
  }

  if specs.is_empty() {
    return Err(SeedError::NoSpecFilesFound(repo_dir.to_path_buf()));
  }

  specs.sort_by(|a, b| {
    a.relative
      .to_string_lossy()
      .as_bytes()
      .cmp(b.relative.to_string_lossy().as_bytes())
  });

  warn_on_shared_names(&specs);
  debug!(count = specs.len(), "found spec files");
  Ok(specs)
}

/// Specs from different directories with the same base name overwrite each other in `SPECS/`.
fn warn_on_shared_names(specs: &[SpecFile]) {
  let mut names: Vec<String> = specs.iter().map(SpecFile::file_name).collect();
  names.sort();
  for pair in names.windows(2) {
    if pair[0] == pair[1] {
      warn!(name = %pair[0], "several spec files share a name; the last one staged wins");
    }
  }
}
