//! `ktkit_cli`:
//! the `kt` binary's argument parsing and command handlers.
//!
//! - `cli`      : clap definitions and `run`
//! - `progress` : text gauge for `kt check`

pub mod cli;
pub mod progress;

pub use cli::{Cli, Commands, run};
