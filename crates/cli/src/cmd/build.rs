//! The default `rpmseed` command.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use rpmseed_lib::build::{BuildOutcome, BuildState};
use rpmseed_lib::config::Config;
use rpmseed_lib::discover::SpecFile;
use rpmseed_lib::error::ExitStatus;
use rpmseed_lib::executor::Identity;
use rpmseed_lib::observer::{RunObserver, Stage};
use rpmseed_lib::orchestrate::{Orchestrator, RunReport};
use rpmseed_lib::platform;

use crate::output::{
  format_bytes, format_duration, print_error_block, print_failure, print_info, print_stat, print_success, symbols,
};

/// Prints progress and the build tool's output as it arrives.
struct TerminalObserver;

impl RunObserver for TerminalObserver {
  fn stage_started(&mut self, stage: Stage) {
    print_info(&capitalize(stage.as_str()));
  }

  fn build_started(&mut self, spec: &SpecFile) {
    println!();
    println!(
      "{} {}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      spec.if_supports_color(Stream::Stdout, |s| s.bold())
    );
  }

  fn output_line(&mut self, line: &str) {
    println!("{}", line);
  }

  fn build_finished(&mut self, outcome: &BuildOutcome) {
    match outcome.state {
      BuildState::Succeeded => print_success(&format!("Built {}", outcome.spec)),
      _ => print_failure(&format!("Failed to build {}", outcome.spec)),
    }
  }
}

/// Run every stage against the repository next to the binary.
pub fn cmd_build() -> Result<ExitStatus> {
  let config = Config::from_env().context("Failed to read configuration")?;

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let identity = Identity::current();
  debug!(?identity, repo = ?config.repo_dir, "starting run");

  let orchestrator = Orchestrator::new(config, identity);
  let report = rt.block_on(orchestrator.run(&mut TerminalObserver));

  print_summary(&report);

  if !report.status.is_success() {
    let message = report.error.as_deref().unwrap_or("build failed");
    print_error_block(message, &platform::hostname(), report.status);
  }

  Ok(report.status)
}

fn print_summary(report: &RunReport) {
  if report.outcomes.is_empty() {
    return;
  }

  println!();
  println!("{}", "Summary".if_supports_color(Stream::Stdout, |s| s.bold()));
  for outcome in &report.outcomes {
    let symbol = if outcome.is_success() {
      symbols::SUCCESS
    } else {
      symbols::FAILURE
    };
    println!(
      "  {} {} ({}, {})",
      symbol,
      outcome.spec,
      outcome.state.as_str(),
      format_duration(outcome.duration)
    );
    if let Some(artifact) = &outcome.artifact {
      let size = std::fs::metadata(artifact).map(|m| format_bytes(m.len())).unwrap_or_default();
      print_stat("package", &format!("{} {}", artifact.display(), size));
    }
    if let Some(log) = &outcome.log {
      print_stat("log", &log.display().to_string());
    }
  }

  println!();
  print_stat("Succeeded", &report.succeeded().to_string());
  print_stat("Failed", &report.failed().to_string());
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
