//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Which answer the fake `sudo` gives to authorization queries.
#[derive(Clone, Copy)]
pub enum Sudo {
  Allow,
  Deny,
}

/// Isolated test environment.
///
/// Each test gets its own home, repository, tool and scratch directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Environment with all three fake tools installed.
  pub fn new(sudo: Sudo) -> Self {
    let env = Self::without_tools();
    env.install_tool("rpmbuild", "rpmbuild.sh");
    env.install_tool("rsync", "rsync.sh");
    env.install_tool(
      "sudo",
      match sudo {
        Sudo::Allow => "sudo-allow.sh",
        Sudo::Deny => "sudo-deny.sh",
      },
    );
    env
  }

  /// Environment with an empty tool directory.
  pub fn without_tools() -> Self {
    let temp = TempDir::new().unwrap();
    for dir in ["home", "repo", "bin", "tmp"] {
      std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    Self { temp }
  }

  /// Copy a fixture script into the tool directory as `name`.
  pub fn install_tool(&self, name: &str, fixture: &str) {
    let dest = self.bin_path().join(name);
    std::fs::copy(fixture_path(fixture), &dest).unwrap();
    std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  fn dir(&self, name: &str) -> PathBuf {
    let p = self.temp.path().join(name);
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn home_path(&self) -> PathBuf {
    self.dir("home")
  }

  pub fn repo_path(&self) -> PathBuf {
    self.dir("repo")
  }

  pub fn bin_path(&self) -> PathBuf {
    self.dir("bin")
  }

  pub fn build_tree(&self) -> PathBuf {
    self.home_path().join("rpmbuild")
  }

  /// Write a file relative to the repository.
  pub fn write_repo_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.repo_path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Mode bits of a file relative to the repository.
  pub fn repo_mode(&self, relative_path: &str) -> u32 {
    mode(&self.repo_path().join(relative_path))
  }

  /// Get a pre-configured Command for the rpmseed binary.
  ///
  /// The environment is cleared and rebuilt from:
  /// - `HOME`: isolated home holding the build tree
  /// - `PATH`: the fake tool directory only
  /// - `RPMSEED_REPO_DIR`: isolated repository
  /// - `TMPDIR`: isolated scratch directory for build logs
  pub fn rpmseed_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("rpmseed");
    cmd.env_clear();
    cmd.env("HOME", self.home_path());
    cmd.env("PATH", self.bin_path());
    cmd.env("RPMSEED_REPO_DIR", self.repo_path());
    cmd.env("TMPDIR", self.dir("tmp"));
    cmd
  }
}

pub fn mode(path: &Path) -> u32 {
  std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}
