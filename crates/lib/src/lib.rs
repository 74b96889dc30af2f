//! rpmseed-lib: build orchestration around `rpmbuild`
//!
//! This crate implements every stage of an `rpmseed` run:
//! - `tools`: resolving the external commands the run depends on
//! - `discover`: finding `*.spec` files in the working repository
//! - `tree`: provisioning and seeding the `~/rpmbuild` build tree
//! - `executor`: running `rpmbuild` directly or through `sudo`
//! - `build`: one `rpmbuild -bb` invocation and its artifact/log retrieval
//! - `orchestrate`: the whole pipeline and its aggregate exit status

pub mod build;
pub mod config;
pub mod consts;
pub mod discover;
pub mod error;
pub mod executor;
pub mod observer;
pub mod orchestrate;
pub mod platform;
pub mod tools;
pub mod tree;
pub mod util;
