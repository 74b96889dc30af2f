//! The full rpmseed pipeline.
//!
//! Stages run strictly in order:
//! - verify tools (all failures collected)
//! - discover spec files
//! - provision the build tree (all failures collected)
//! - stage spec files into `SPECS/`
//! - build each spec file in sorted order
//!
//! Any failure before the build stage ends the run. Build failures are
//! recorded per spec file and the loop moves on.

use tracing::{info, warn};

use crate::build::{BuildContext, BuildOutcome, build_spec};
use crate::config::Config;
use crate::consts::{REQUIRED_TOOLS, RPMBUILD, RSYNC};
use crate::discover::discover_spec_files;
use crate::error::{ExitStatus, SeedError};
use crate::executor::{Identity, select_executor};
use crate::observer::{RunObserver, Stage};
use crate::tools::ToolRegistry;
use crate::tree::{BuildTree, provision, stage_specs};

/// Everything a finished run reports.
#[derive(Debug, Default)]
pub struct RunReport {
  /// One entry per spec file that reached the build stage, in build order.
  pub outcomes: Vec<BuildOutcome>,
  pub status: ExitStatus,
  /// Message of the most recent failure.
  pub error: Option<String>,
  /// Stage the run stopped in, if it stopped early.
  pub aborted_at: Option<Stage>,
}

impl RunReport {
  fn abort(mut self, stage: Stage, error: SeedError) -> Self {
    warn!(stage = %stage, error = %error, "run aborted");
    self.status.add(error.weight());
    self.error = Some(error.to_string());
    self.aborted_at = Some(stage);
    self
  }

  fn record(&mut self, outcome: BuildOutcome) {
    self.status.add(outcome.failures());
    if let Some(e) = outcome.errors.last() {
      self.error = Some(e.to_string());
    }
    self.outcomes.push(outcome);
  }

  pub fn succeeded(&self) -> usize {
    self.outcomes.iter().filter(|o| o.is_success()).count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.len() - self.succeeded()
  }
}

/// Runs the pipeline for one configuration and identity.
#[derive(Debug, Clone)]
pub struct Orchestrator {
  config: Config,
  identity: Identity,
}

impl Orchestrator {
  pub fn new(config: Config, identity: Identity) -> Self {
    Self { config, identity }
  }

  pub async fn run(&self, observer: &mut dyn RunObserver) -> RunReport {
    let mut report = RunReport::default();
    let config = &self.config;

    observer.stage_started(Stage::VerifyTools);
    let tools = match ToolRegistry::verify(&REQUIRED_TOOLS, &config.search_path) {
      Ok(tools) => tools,
      Err(e) => return report.abort(Stage::VerifyTools, e),
    };
    info!(count = tools.len(), "verified tools");

    observer.stage_started(Stage::Discover);
    let specs = match discover_spec_files(&config.repo_dir) {
      Ok(specs) => specs,
      Err(e) => return report.abort(Stage::Discover, e),
    };
    info!(count = specs.len(), repo = ?config.repo_dir, "discovered spec files");

    let (rpmbuild, rsync) = match (tools.require(RPMBUILD), tools.require(RSYNC)) {
      (Ok(rpmbuild), Ok(rsync)) => (rpmbuild, rsync),
      (Err(e), _) | (_, Err(e)) => return report.abort(Stage::VerifyTools, e),
    };

    observer.stage_started(Stage::Provision);
    let tree = BuildTree::new(config.build_tree_root());
    if let Err(e) = provision(&tree, &config.repo_dir, rsync).await {
      return report.abort(Stage::Provision, e);
    }

    observer.stage_started(Stage::StageSpecs);
    if let Err(e) = stage_specs(&tree, &config.repo_dir, &specs) {
      return report.abort(Stage::StageSpecs, e);
    }

    observer.stage_started(Stage::Build);
    let executor = match select_executor(self.identity, &tools) {
      Ok(executor) => executor,
      Err(e) => return report.abort(Stage::Build, e),
    };

    let ctx = BuildContext {
      tree: &tree,
      repo_dir: &config.repo_dir,
      scratch_dir: &config.scratch_dir,
      rpmbuild,
      executor: executor.as_ref(),
    };

    for spec in &specs {
      let outcome = build_spec(&ctx, spec, observer).await;
      report.record(outcome);
    }

    info!(
      succeeded = report.succeeded(),
      failed = report.failed(),
      status = %report.status,
      "run finished"
    );
    report
  }
}
