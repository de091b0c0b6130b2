//! CLI module
//!
//! Command-line driver that runs a pagination controller and prints every
//! state transition.
//!
//! # Commands
//!
//! - `fetch` - Page through an HTTP source defined in YAML
//! - `demo` - Page through a synthetic in-memory source
//! - `validate` - Check a source definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{drive, render_state, Runner};
