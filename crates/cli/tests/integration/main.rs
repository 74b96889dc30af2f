//! CLI integration tests.
//!
//! Every test runs the real binary against fake build tools in an isolated
//! home, repository and search path.

#![cfg(unix)]

mod build_tests;
mod common;
mod tree_tests;
