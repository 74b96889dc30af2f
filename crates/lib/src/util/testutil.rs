//! Test utilities for rpmseed-lib.
//!
//! Fake `rpmbuild`, `rsync` and `sudo` programs written as `/bin/sh` scripts.
//! Each script resets its own `PATH` so tests can hand the orchestrator a
//! search path that holds nothing but the fakes.

use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\nPATH=/usr/bin:/bin\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Fake `rpmbuild`.
///
/// Expects `--define "_topdir <dir>" -bb <spec>`. Appends the spec name to
/// `<dir>/invocations.log`, then either fails (spec contains `FAIL`) or writes
/// `<dir>/RPMS/noarch/<name>-1.0-1.noarch.rpm` and prints a `Wrote:` line.
/// A spec containing `DEBUGINFO` also writes a debuginfo package last.
pub const FAKE_RPMBUILD: &str = r#"
topdir="${2#_topdir }"
for spec; do :; done
name=$(basename "$spec" .spec)
echo "$name" >> "$topdir/invocations.log"
echo "Executing(%prep): /bin/sh -e /var/tmp/rpm-tmp.$name"
echo "warning: bogus date in %changelog" 1>&2
if grep -q FAIL "$spec"; then
  echo "error: Bad exit status from /var/tmp/rpm-tmp.$name (%build)" 1>&2
  exit 1
fi
mkdir -p "$topdir/RPMS/noarch"
echo "$name" > "$topdir/RPMS/noarch/$name-1.0-1.noarch.rpm"
echo "Wrote: $topdir/RPMS/noarch/$name-1.0-1.noarch.rpm"
if grep -q DEBUGINFO "$spec"; then
  echo "$name" > "$topdir/RPMS/noarch/$name-debuginfo-1.0-1.noarch.rpm"
  echo "Wrote: $topdir/RPMS/noarch/$name-debuginfo-1.0-1.noarch.rpm"
fi
exit 0
"#;

/// Fake `rsync -a SRC/ DST/`: additive copy of SRC's contents into DST.
pub const FAKE_RSYNC: &str = r#"
mkdir -p "$3" && cp -a "$2". "$3"
"#;

/// Fake `sudo` that authorizes `-n -l` queries and runs everything else.
pub const FAKE_SUDO_ALLOW: &str = r#"
if [ "$1" = "-n" ] && [ "$2" = "-l" ]; then
  echo "$3"
  exit 0
fi
exec "$@"
"#;

/// Fake `sudo` that refuses `-n -l` queries.
pub const FAKE_SUDO_DENY: &str = r#"
if [ "$1" = "-n" ] && [ "$2" = "-l" ]; then
  echo "sudo: a password is required" 1>&2
  exit 1
fi
exec "$@"
"#;

/// Install all three fakes into `dir`, with `sudo` either allowing or denying.
pub fn install_fake_tools(dir: &Path, allow_sudo: bool) {
  write_script(dir, "rpmbuild", FAKE_RPMBUILD);
  write_script(dir, "rsync", FAKE_RSYNC);
  write_script(dir, "sudo", if allow_sudo { FAKE_SUDO_ALLOW } else { FAKE_SUDO_DENY });
}

/// Write a spec file relative to `repo`, creating parent directories.
pub fn write_spec(repo: &Path, relative: &str, content: &str) -> PathBuf {
  let path = repo.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
  path
}
