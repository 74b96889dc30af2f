/// Overrides the working repository directory (defaults to the executable's directory).
pub const REPO_DIR_ENV: &str = "RPMSEED_REPO_DIR";

/// Name of the build tree directory under the user's home directory.
pub const BUILD_TREE_DIR: &str = "rpmbuild";

/// Subdirectories `rpmbuild` expects under its top directory.
pub const BUILD_TREE_SUBDIRS: [&str; 6] = ["BUILD", "BUILDROOT", "RPMS", "SOURCES", "SPECS", "SRPMS"];

/// Subdirectory the spec files are staged into.
pub const SPECS_SUBDIR: &str = "SPECS";

/// Extension of packaging spec files, matched case-insensitively.
pub const SPEC_EXTENSION: &str = ".spec";

/// Prefix `rpmbuild` prints in front of every package it writes.
pub const ARTIFACT_PREFIX: &str = "Wrote: ";

/// Suffix of the build log copied into the working directory.
pub const LOG_SUFFIX: &str = ".rpmbuild.log";

pub const RPMBUILD: &str = "rpmbuild";
pub const RSYNC: &str = "rsync";
pub const SUDO: &str = "sudo";

/// External commands the orchestrator spawns. All must resolve on `PATH`.
pub const REQUIRED_TOOLS: [&str; 3] = [RPMBUILD, RSYNC, SUDO];
