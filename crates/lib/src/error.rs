//! Error and exit status types for an rpmseed run.
//!
//! Every failure knows how much it contributes to the process exit status.
//! The exit status is a count of failed sub-steps, not a per-cause code.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::immutable::ImmutableError;

/// Errors that can occur while preparing or running builds.
#[derive(Debug, Error)]
pub enum SeedError {
  /// Tool name is empty once backticks are stripped, or contains a path separator.
  #[error("invalid tool name: {0:?}")]
  InvalidToolName(String),

  /// Tool could not be resolved on the search path.
  #[error("required tool not found on PATH: {0}")]
  ToolNotFound(String),

  /// One or more required tools failed verification.
  #[error("{} required tool(s) unavailable: {}", .0.len(), join_messages(.0))]
  ToolVerificationFailed(Vec<SeedError>),

  /// The working directory contains no spec files.
  #[error("no spec files found under {}", .0.display())]
  NoSpecFilesFound(PathBuf),

  /// Creating or seeding the build tree failed.
  #[error("failed to seed build tree {} ({failures} step(s) failed)", root.display())]
  BuildTreeSeedFailure { root: PathBuf, failures: u32 },

  /// Copying spec files into the build tree failed.
  #[error("failed to stage {failures} spec file(s) into {}", dir.display())]
  SpecStagingFailure { dir: PathBuf, failures: u32 },

  /// The invoking account may not run the build tool with elevated privileges.
  #[error("not permitted to run {} via sudo without a password (building {spec})", tool.display())]
  PrivilegeNotGranted { spec: String, tool: PathBuf },

  /// The build tool reported no written package.
  #[error("no artifact produced for {0}")]
  ArtifactNotProduced(String),

  /// `HOME` is unset or empty.
  #[error("HOME is not set")]
  MissingHome,

  /// The working repository directory could not be resolved.
  #[error("failed to resolve repository directory: {0}")]
  RepoDir(#[source] io::Error),

  /// Setting read-only permissions failed.
  #[error(transparent)]
  Permissions(#[from] ImmutableError),

  /// I/O failure with context.
  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: io::Error,
  },
}

impl SeedError {
  pub fn io(context: impl Into<String>, source: io::Error) -> Self {
    SeedError::Io {
      context: context.into(),
      source,
    }
  }

  /// How many failed sub-steps this error stands for.
  pub fn weight(&self) -> u32 {
    match self {
      SeedError::ToolVerificationFailed(failures) => failures.len() as u32,
      SeedError::BuildTreeSeedFailure { failures, .. } | SeedError::SpecStagingFailure { failures, .. } => *failures,
      _ => 1,
    }
  }
}

fn join_messages(errors: &[SeedError]) -> String {
  errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Accumulated exit status of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitStatus(u32);

impl ExitStatus {
  pub fn new(failures: u32) -> Self {
    Self(failures)
  }

  pub fn add(&mut self, failures: u32) {
    self.0 = self.0.saturating_add(failures);
  }

  pub fn failures(self) -> u32 {
    self.0
  }

  pub fn is_success(self) -> bool {
    self.0 == 0
  }

  /// Process exit code. Non-zero counts are clamped to 1..=255 so they never wrap to 0.
  pub fn code(self) -> i32 {
    match self.0 {
      0 => 0,
      n => n.min(255) as i32,
    }
  }
}

impl fmt::Display for ExitStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
