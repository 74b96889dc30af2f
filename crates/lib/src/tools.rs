//! External tool verification.
//!
//! Every command the orchestrator spawns is resolved to an absolute path once,
//! before any other stage runs. A missing tool does not stop verification of
//! the rest, so a single run reports all of them.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SeedError;

/// Resolved external tools, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
  tools: BTreeMap<String, PathBuf>,
}

impl ToolRegistry {
  /// Resolve every name in `names` against `search_path`.
  ///
  /// Relative search path entries are taken relative to the current directory.
  /// Fails with [`SeedError::ToolVerificationFailed`] listing every tool that
  /// could not be resolved.
  pub fn verify(names: &[&str], search_path: &OsStr) -> Result<Self, SeedError> {
    let cwd = std::env::current_dir().map_err(|e| SeedError::io("failed to read current directory", e))?;
    Self::verify_in(names, search_path, &cwd)
  }

  /// Like [`ToolRegistry::verify`], resolving relative entries against `cwd`.
  pub fn verify_in(names: &[&str], search_path: &OsStr, cwd: &Path) -> Result<Self, SeedError> {
    let mut registry = ToolRegistry::default();
    let mut failures = Vec::new();

    for name in names {
      let resolved =
        sanitize_tool_name(name).and_then(|clean| resolve_tool(&clean, search_path, cwd).map(|path| (clean, path)));
      match resolved {
        Ok((clean, path)) => {
          debug!(tool = %clean, path = ?path, "resolved tool");
          registry.tools.insert(normalize_key(&clean), path);
        }
        Err(e) => {
          warn!(tool = %name, error = %e, "tool verification failed");
          failures.push(e);
        }
      }
    }

    if failures.is_empty() {
      Ok(registry)
    } else {
      Err(SeedError::ToolVerificationFailed(failures))
    }
  }

  /// Path of a verified tool.
  pub fn get(&self, name: &str) -> Option<&Path> {
    self.tools.get(&normalize_key(name)).map(PathBuf::as_path)
  }

  /// Path of a verified tool, or [`SeedError::ToolNotFound`].
  pub fn require(&self, name: &str) -> Result<&Path, SeedError> {
    self.get(name).ok_or_else(|| SeedError::ToolNotFound(name.to_string()))
  }

  pub fn len(&self) -> usize {
    self.tools.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tools.is_empty()
  }
}

/// Strip backticks and reject names that cannot be looked up on a search path.
pub fn sanitize_tool_name(name: &str) -> Result<String, SeedError> {
  let cleaned: String = name.chars().filter(|c| *c != '`').collect();

  if cleaned.is_empty() || cleaned.contains(std::path::MAIN_SEPARATOR) || cleaned.contains('/') {
    return Err(SeedError::InvalidToolName(name.to_string()));
  }

  Ok(cleaned)
}

/// Registry key for a tool name: hyphens become underscores.
pub fn normalize_key(name: &str) -> String {
  name.replace('-', "_")
}

/// Resolve an already sanitized tool name to an absolute path.
///
/// Empty search path entries are skipped and relative ones are joined to `cwd`.
pub fn resolve_tool(name: &str, search_path: &OsStr, cwd: &Path) -> Result<PathBuf, SeedError> {
  let dirs: Vec<PathBuf> = std::env::split_paths(search_path)
    .filter(|dir| !dir.as_os_str().is_empty())
    .map(|dir| if dir.is_absolute() { dir } else { cwd.join(dir) })
    .collect();
  if dirs.is_empty() {
    return Err(SeedError::ToolNotFound(name.to_string()));
  }

  let search_path = std::env::join_paths(dirs).map_err(|_| SeedError::ToolNotFound(name.to_string()))?;
  let path = which::which_in(name, Some(search_path), cwd).map_err(|_| SeedError::ToolNotFound(name.to_string()))?;

  Ok(if path.is_absolute() { path } else { cwd.join(path) })
}
