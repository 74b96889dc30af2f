//! Privileged execution of the build tool.
//!
//! `rpmbuild` runs directly when the process is already root and through
//! `sudo` otherwise. Which one applies is decided once from the caller's
//! [`Identity`], so the rest of the pipeline only sees a
//! [`PrivilegedExecutor`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::consts::SUDO;
use crate::error::SeedError;
use crate::platform;
use crate::tools::ToolRegistry;

/// Who the orchestrator runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
  Root,
  User,
}

impl Identity {
  pub fn current() -> Self {
    if platform::is_elevated() {
      Identity::Root
    } else {
      Identity::User
    }
  }
}

/// Runs programs with whatever privileges the build needs.
pub trait PrivilegedExecutor: Send + Sync {
  /// Short label for logs.
  fn describe(&self) -> &'static str;

  /// Command that runs `program` with this executor's privileges. Arguments are appended by the caller.
  fn command(&self, program: &Path) -> Command;

  /// Command answering whether `program` may run without an interactive prompt,
  /// or `None` when no check is needed.
  fn authorization_query(&self, program: &Path) -> Option<Command>;
}

/// Runs programs as the current user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

impl PrivilegedExecutor for DirectExecutor {
  fn describe(&self) -> &'static str {
    "direct"
  }

  fn command(&self, program: &Path) -> Command {
    Command::new(program)
  }

  fn authorization_query(&self, _program: &Path) -> Option<Command> {
    None
  }
}

/// Runs programs through `sudo`.
#[derive(Debug, Clone)]
pub struct ElevatedExecutor {
  helper: PathBuf,
}

impl ElevatedExecutor {
  pub fn new(helper: impl Into<PathBuf>) -> Self {
    Self { helper: helper.into() }
  }
}

impl PrivilegedExecutor for ElevatedExecutor {
  fn describe(&self) -> &'static str {
    "sudo"
  }

  fn command(&self, program: &Path) -> Command {
    let mut command = Command::new(&self.helper);
    command.arg(program);
    command
  }

  fn authorization_query(&self, program: &Path) -> Option<Command> {
    let mut command = Command::new(&self.helper);
    command.arg("-n").arg("-l").arg(program);
    Some(command)
  }
}

/// Pick the executor for `identity`. Non-root identities need `sudo` in the registry.
pub fn select_executor(identity: Identity, tools: &ToolRegistry) -> Result<Box<dyn PrivilegedExecutor>, SeedError> {
  match identity {
    Identity::Root => Ok(Box::new(DirectExecutor)),
    Identity::User => Ok(Box::new(ElevatedExecutor::new(tools.require(SUDO)?))),
  }
}

/// Ask `executor` whether `program` may run without prompting.
///
/// Returns `Ok(false)` when the query ran and refused.
pub async fn authorize(executor: &dyn PrivilegedExecutor, program: &Path) -> Result<bool, SeedError> {
  let Some(mut query) = executor.authorization_query(program) else {
    return Ok(true);
  };

  let output = query
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|e| SeedError::io(format!("failed to query {} authorization", executor.describe()), e))?;

  debug!(
    executor = executor.describe(),
    program = ?program,
    status = %output.status,
    "authorization query finished"
  );

  Ok(output.status.success())
}
