//! A single `rpmbuild -bb` run and the retrieval of what it produced.
//!
//! Each spec file moves through `Pending -> Running -> {Succeeded, Failed}`.
//! The combined stdout/stderr of the build tool is teed into a temporary log
//! and scanned for `Wrote: <path>` lines; the last such path is the artifact.
//! Whatever happens, the temporary log is copied into the working directory
//! and removed.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::consts::{ARTIFACT_PREFIX, LOG_SUFFIX};
use crate::discover::SpecFile;
use crate::error::SeedError;
use crate::executor::{PrivilegedExecutor, authorize};
use crate::observer::RunObserver;
use crate::platform::immutable::make_readonly;
use crate::tree::BuildTree;

/// Lifecycle of one spec file's build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
  Pending,
  Running,
  Succeeded,
  Failed,
}

impl BuildState {
  pub fn as_str(&self) -> &'static str {
    match self {
      BuildState::Pending => "pending",
      BuildState::Running => "running",
      BuildState::Succeeded => "succeeded",
      BuildState::Failed => "failed",
    }
  }
}

/// Result of building one spec file.
#[derive(Debug)]
pub struct BuildOutcome {
  pub spec: SpecFile,
  pub state: BuildState,
  /// Copy of the artifact in the working directory.
  pub artifact: Option<PathBuf>,
  /// Copy of the build log in the working directory.
  pub log: Option<PathBuf>,
  pub duration: Duration,
  pub errors: Vec<SeedError>,
}

impl BuildOutcome {
  pub fn new(spec: SpecFile) -> Self {
    Self {
      spec,
      state: BuildState::Pending,
      artifact: None,
      log: None,
      duration: Duration::ZERO,
      errors: Vec::new(),
    }
  }

  /// Failed sub-steps of this build.
  pub fn failures(&self) -> u32 {
    self.errors.iter().map(SeedError::weight).sum()
  }

  pub fn is_success(&self) -> bool {
    self.state == BuildState::Succeeded
  }
}

/// What a build needs from the rest of the run.
pub struct BuildContext<'a> {
  pub tree: &'a BuildTree,
  pub repo_dir: &'a Path,
  /// Directory for the temporary per-spec log.
  pub scratch_dir: &'a Path,
  pub rpmbuild: &'a Path,
  pub executor: &'a dyn PrivilegedExecutor,
}

/// Tracks the last `Wrote: ` line seen in build output.
#[derive(Debug, Default)]
pub struct ArtifactScanner {
  last: Option<String>,
}

impl ArtifactScanner {
  pub fn observe(&mut self, line: &str) {
    if let Some(path) = artifact_path(line) {
      self.last = Some(path.to_string());
    }
  }

  pub fn into_artifact(self) -> Option<String> {
    self.last
  }
}

/// The path after `Wrote: `, if the line announces a written package.
pub fn artifact_path(line: &str) -> Option<&str> {
  line
    .trim_start()
    .strip_prefix(ARTIFACT_PREFIX)
    .map(str::trim)
    .filter(|path| !path.is_empty())
}

/// Build one staged spec file and collect its artifact and log.
pub async fn build_spec(ctx: &BuildContext<'_>, spec: &SpecFile, observer: &mut dyn RunObserver) -> BuildOutcome {
  let started = Instant::now();
  let mut outcome = BuildOutcome::new(spec.clone());

  observer.build_started(spec);
  outcome.state = BuildState::Running;
  info!(spec = %spec, executor = ctx.executor.describe(), "building package");

  run_build(ctx, spec, observer, &mut outcome).await;

  outcome.duration = started.elapsed();
  outcome.state = if outcome.errors.is_empty() && outcome.artifact.is_some() {
    BuildState::Succeeded
  } else {
    BuildState::Failed
  };

  for e in &outcome.errors {
    warn!(spec = %spec, error = %e, "build step failed");
  }
  observer.build_finished(&outcome);
  outcome
}

async fn run_build(ctx: &BuildContext<'_>, spec: &SpecFile, observer: &mut dyn RunObserver, outcome: &mut BuildOutcome) {
  match authorize(ctx.executor, ctx.rpmbuild).await {
    Ok(true) => {}
    Ok(false) => {
      outcome.errors.push(privilege_not_granted(ctx, spec));
      return;
    }
    Err(e) => {
      warn!(spec = %spec, error = %e, "authorization query failed");
      outcome.errors.push(privilege_not_granted(ctx, spec));
      return;
    }
  }

  let temp_log = match tempfile::Builder::new()
    .prefix(&format!("{}.", spec.file_name()))
    .suffix(LOG_SUFFIX)
    .tempfile_in(ctx.scratch_dir)
  {
    Ok(file) => file,
    Err(e) => {
      outcome
        .errors
        .push(SeedError::io("failed to create temporary build log", e));
      return;
    }
  };
  debug!(log = ?temp_log.path(), "writing build log");

  match run_captured(ctx, spec, &temp_log, observer).await {
    Ok(Some(artifact)) => match publish_artifact(ctx, spec, &artifact) {
      Ok(published) => outcome.artifact = Some(published),
      Err(e) => outcome.errors.push(e),
    },
    Ok(None) => outcome.errors.push(SeedError::ArtifactNotProduced(spec.to_string())),
    Err(e) => outcome.errors.push(e),
  }

  match retrieve_log(temp_log, ctx.repo_dir, spec) {
    Ok(log) => outcome.log = Some(log),
    Err(e) => outcome.errors.push(e),
  }
}

fn privilege_not_granted(ctx: &BuildContext<'_>, spec: &SpecFile) -> SeedError {
  SeedError::PrivilegeNotGranted {
    spec: spec.to_string(),
    tool: ctx.rpmbuild.to_path_buf(),
  }
}

/// `_topdir <root>` for `rpmbuild --define`.
fn topdir_define(root: &Path) -> OsString {
  let mut define = OsString::from("_topdir ");
  define.push(root.as_os_str());
  define
}

/// Run the build tool, teeing combined output into `log` and the observer.
///
/// Returns the last announced artifact path, if any.
async fn run_captured(
  ctx: &BuildContext<'_>,
  spec: &SpecFile,
  log: &NamedTempFile,
  observer: &mut dyn RunObserver,
) -> Result<Option<String>, SeedError> {
  let mut command = ctx.executor.command(ctx.rpmbuild);
  command
    .arg("--define")
    .arg(topdir_define(ctx.tree.root()))
    .arg("-bb")
    .arg(ctx.tree.staged_spec(spec))
    .current_dir(ctx.tree.root())
    .kill_on_drop(true)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  debug!(command = ?command.as_std(), "spawning build tool");

  let mut child = command
    .spawn()
    .map_err(|e| SeedError::io(format!("failed to run {}", ctx.rpmbuild.display()), e))?;

  let stdout = child
    .stdout
    .take()
    .ok_or_else(|| SeedError::io("build tool stdout", io::Error::other("not captured")))?;
  let stderr = child
    .stderr
    .take()
    .ok_or_else(|| SeedError::io("build tool stderr", io::Error::other("not captured")))?;

  let log_handle = log
    .as_file()
    .try_clone()
    .map_err(|e| SeedError::io("failed to open build log", e))?;
  let mut log_file = tokio::fs::File::from_std(log_handle);

  let mut out = BufReader::new(stdout).split(b'\n');
  let mut err = BufReader::new(stderr).split(b'\n');
  let (mut out_open, mut err_open) = (true, true);
  let mut scanner = ArtifactScanner::default();
  let read_error = |e: io::Error| SeedError::io("failed to read build output", e);

  while out_open || err_open {
    tokio::select! {
      segment = out.next_segment(), if out_open => match segment.map_err(read_error)? {
        Some(bytes) => tee_line(&bytes, &mut log_file, &mut scanner, observer).await?,
        None => out_open = false,
      },
      segment = err.next_segment(), if err_open => match segment.map_err(read_error)? {
        Some(bytes) => tee_line(&bytes, &mut log_file, &mut scanner, observer).await?,
        None => err_open = false,
      },
    }
  }

  log_file
    .flush()
    .await
    .map_err(|e| SeedError::io("failed to write build log", e))?;

  let status = child
    .wait()
    .await
    .map_err(|e| SeedError::io("failed to wait for build tool", e))?;
  if !status.success() {
    warn!(spec = %spec, status = %status, "build tool exited unsuccessfully");
  }

  Ok(scanner.into_artifact())
}

async fn tee_line(
  bytes: &[u8],
  log: &mut tokio::fs::File,
  scanner: &mut ArtifactScanner,
  observer: &mut dyn RunObserver,
) -> Result<(), SeedError> {
  let line = String::from_utf8_lossy(bytes);
  let line = line.trim_end_matches('\r');

  let mut entry = Vec::with_capacity(line.len() + 1);
  entry.extend_from_slice(line.as_bytes());
  entry.push(b'\n');
  log
    .write_all(&entry)
    .await
    .map_err(|e| SeedError::io("failed to write build log", e))?;

  observer.output_line(line);
  scanner.observe(line);
  Ok(())
}

/// Make the artifact read-only and copy it into the working directory.
fn publish_artifact(ctx: &BuildContext<'_>, spec: &SpecFile, announced: &str) -> Result<PathBuf, SeedError> {
  let artifact = ctx.tree.root().join(announced);
  let Some(name) = artifact.file_name() else {
    return Err(SeedError::ArtifactNotProduced(spec.to_string()));
  };
  let destination = ctx.repo_dir.join(name);

  // Not fatal: packages built through sudo are owned by root.
  if let Err(e) = make_readonly(&artifact) {
    warn!(artifact = ?artifact, error = %e, "could not make artifact read-only in build tree");
  }

  if destination.symlink_metadata().is_ok() {
    std::fs::remove_file(&destination)
      .map_err(|e| SeedError::io(format!("failed to replace {}", destination.display()), e))?;
  }

  std::fs::copy(&artifact, &destination).map_err(|e| {
    SeedError::io(
      format!("failed to copy {} to {}", artifact.display(), destination.display()),
      e,
    )
  })?;
  make_readonly(&destination)?;

  info!(artifact = ?destination, "published artifact");
  Ok(destination)
}

/// Copy the temporary log to `<repo>/<spec>.rpmbuild.log` and delete it.
fn retrieve_log(temp_log: NamedTempFile, repo_dir: &Path, spec: &SpecFile) -> Result<PathBuf, SeedError> {
  let destination = repo_dir.join(format!("{}{}", spec.file_name(), LOG_SUFFIX));

  let copied = File::open(temp_log.path())
    .and_then(|mut source| File::create(&destination).and_then(|mut target| io::copy(&mut source, &mut target)));

  if let Err(e) = temp_log.close() {
    warn!(error = %e, "failed to remove temporary build log");
  }

  copied.map_err(|e| SeedError::io(format!("failed to copy build log to {}", destination.display()), e))?;
  debug!(log = ?destination, "retrieved build log");
  Ok(destination)
}
