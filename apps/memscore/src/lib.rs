//! # memscore
//!
//! Library half of the Memory Score binary: the clap command surface, the
//! command implementations, configuration and CLI errors.
//!
//! The binary in `main.rs` only sets up logging and dispatches here, so
//! integration tests drive the same command functions directly.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::{Cli, Commands, Context, execute};
pub use config::Config;
pub use error::CliError;
