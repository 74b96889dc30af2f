//! End-to-end build runs.

use predicates::prelude::*;
use serial_test::serial;

use super::common::{Sudo, TestEnv, mode};

#[test]
#[serial]
fn build_publishes_read_only_artifact_and_log() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("hello.spec", "Name: hello");

  env
    .rpmseed_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote:"))
    .stdout(predicate::str::contains("Built hello.spec"));

  assert_eq!(env.repo_mode("hello-1.0-1.noarch.rpm"), 0o444);
  assert_eq!(
    mode(&env.build_tree().join("RPMS/noarch/hello-1.0-1.noarch.rpm")),
    0o444
  );

  let log = std::fs::read_to_string(env.repo_path().join("hello.spec.rpmbuild.log")).unwrap();
  assert!(log.contains("Executing(%prep)"));
  assert!(log.contains("warning: bogus date"));
  assert!(log.contains("Wrote:"));
}

#[test]
#[serial]
fn failing_spec_sets_exit_status_and_others_still_build() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("broken.spec", "FAIL");
  env.write_repo_file("good.spec", "Name: good");

  env
    .rpmseed_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("ERROR: no artifact produced for broken.spec"))
    .stderr(predicate::str::contains("exit status 1"));

  assert!(env.repo_path().join("good-1.0-1.noarch.rpm").exists());
  assert!(env.repo_path().join("broken.spec.rpmbuild.log").exists());
}

#[test]
#[serial]
fn every_failure_adds_to_exit_status() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("a.spec", "FAIL");
  env.write_repo_file("b.spec", "FAIL");
  env.write_repo_file("c.spec", "FAIL");

  env.rpmseed_cmd().assert().code(3);
}

#[test]
#[serial]
fn specs_are_built_in_sorted_order() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("zz.spec", "Name: zz");
  env.write_repo_file("nested/mm.spec", "Name: mm");
  env.write_repo_file("aa.spec", "Name: aa");

  env.rpmseed_cmd().assert().success();

  let invocations = std::fs::read_to_string(env.build_tree().join("invocations.log")).unwrap();
  assert_eq!(invocations, "aa\nmm\nzz\n");
}

#[test]
#[serial]
fn rebuild_replaces_read_only_copy() {
  let env = TestEnv::new(Sudo::Allow);
  env.write_repo_file("hello.spec", "Name: hello");

  env.rpmseed_cmd().assert().success();
  env.rpmseed_cmd().assert().success();

  assert_eq!(env.repo_mode("hello-1.0-1.noarch.rpm"), 0o444);
}

#[test]
#[serial]
fn refused_sudo_fails_without_building() {
  if rpmseed_lib::platform::is_elevated() {
    return;
  }

  let env = TestEnv::new(Sudo::Deny);
  env.write_repo_file("hello.spec", "Name: hello");

  env
    .rpmseed_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("not permitted"));

  assert!(!env.build_tree().join("invocations.log").exists());
  assert!(!env.repo_path().join("hello-1.0-1.noarch.rpm").exists());
}
