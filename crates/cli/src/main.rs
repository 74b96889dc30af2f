mod cmd;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// rpmseed - build every spec file in a repository with rpmbuild
///
/// Looks for *.spec files under the directory holding this binary (or
/// RPMSEED_REPO_DIR), seeds ~/rpmbuild, runs `rpmbuild -bb` for each spec and
/// copies the packages and build logs back.
#[derive(Parser)]
#[command(name = "rpmseed")]
#[command(author, version, about, long_about)]
struct Cli {}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let _cli = Cli::parse();

  let code = match cmd::cmd_build() {
    Ok(status) => status.code(),
    Err(err) => {
      output::print_error(&format!("{:#}", err));
      1
    }
  };

  std::process::exit(code);
}
