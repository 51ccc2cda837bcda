//! Sweep launcher
//!
//! Command line front end: parses arguments, loads the sweep config, sets up
//! logging and runs one of the `launch`, `plan` or `artifacts` commands.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{build_cli, Invocation, LaunchArgs, LogFormat};
