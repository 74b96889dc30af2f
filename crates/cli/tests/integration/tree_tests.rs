//! Build tree provisioning through the binary.

use predicates::prelude::*;
use serial_test::serial;

use super::common::{Sudo, TestEnv};

#[test]
#[serial]
fn tree_is_created_with_all_subdirectories() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("hello.spec", "Name: hello");

  env.rpmseed_cmd().assert().success();

  for dir in ["BUILD", "BUILDROOT", "RPMS", "SOURCES", "SPECS", "SRPMS"] {
    assert!(env.build_tree().join(dir).is_dir(), "{dir} missing");
  }
  assert!(env.build_tree().join("SPECS/hello.spec").is_file());
}

#[test]
#[serial]
fn repo_sources_are_merged_without_deleting_existing_files() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("hello.spec", "Name: hello");
  env.write_repo_file("SOURCES/hello.tar.gz", "tarball");
  env.write_repo_file("SOURCES/patches/fix.patch", "patch");

  let existing = env.build_tree().join("SOURCES/keep.txt");
  std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
  std::fs::write(&existing, "keep").unwrap();

  env.rpmseed_cmd().assert().success();

  let sources = env.build_tree().join("SOURCES");
  assert_eq!(std::fs::read_to_string(sources.join("hello.tar.gz")).unwrap(), "tarball");
  assert!(sources.join("patches/fix.patch").is_file());
  assert!(existing.is_file());
}

#[test]
#[serial]
fn nested_specs_are_staged_by_base_name() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("pkgs/deep/tool.spec", "Name: tool");

  env.rpmseed_cmd().assert().success();

  assert!(env.build_tree().join("SPECS/tool.spec").is_file());
  assert!(env.repo_path().join("tool.spec.rpmbuild.log").is_file());
}

#[test]
#[serial]
fn blocked_subdirectory_aborts_before_building() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("hello.spec", "Name: hello");
  std::fs::create_dir_all(env.build_tree()).unwrap();
  std::fs::write(env.build_tree().join("RPMS"), "not a directory").unwrap();

  env
    .rpmseed_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to seed build tree"));

  assert!(!env.build_tree().join("invocations.log").exists());
}
