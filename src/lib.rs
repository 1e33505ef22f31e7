//! Configuration staging and placement engine.
//!
//! Renders a tree of configuration templates into a staging directory, then
//! converges a live target directory onto it: unchanged paths are skipped,
//! changed paths are (optionally) backed up and overwritten, and every path
//! created or overwritten is recorded in a manifest.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load the TOML document templates are rendered against
//! - **[`render`]**: template tree + configuration → staging tree
//! - **[`place`]**: staging tree → live target tree, with backup and manifest
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `render`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod place;
pub mod render;
