//! Link dotfiles into place with per-host overrides.
//!
//! A configuration file names *containers*: directories of packages (or a
//! single package) together with where they are linked to. Every file of a
//! package gets a symbolic link at the matching destination path, and files
//! or directories tagged `name#host` are only linked on that host.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load the configuration and resolve the current host's options
//! - **[`linking`]**: plan the links of a package and create them
//! - **[`report`]**: render link outcomes for display
//! - **[`commands`]**: top-level orchestration over containers and packages
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod linking;
pub mod logging;
pub mod operations;
pub mod paths;
pub mod report;
