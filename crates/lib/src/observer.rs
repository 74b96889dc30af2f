//! Progress callbacks for a run.

use crate::build::BuildOutcome;
use crate::discover::SpecFile;

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  VerifyTools,
  Discover,
  Provision,
  StageSpecs,
  Build,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::VerifyTools => "verifying tools",
      Stage::Discover => "discovering spec files",
      Stage::Provision => "provisioning build tree",
      Stage::StageSpecs => "staging spec files",
      Stage::Build => "building packages",
    }
  }
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Receives progress from the orchestrator. Every method defaults to a no-op.
pub trait RunObserver {
  fn stage_started(&mut self, _stage: Stage) {}

  fn build_started(&mut self, _spec: &SpecFile) {}

  /// One line of combined build tool output.
  fn output_line(&mut self, _line: &str) {}

  fn build_finished(&mut self, _outcome: &BuildOutcome) {}
}
