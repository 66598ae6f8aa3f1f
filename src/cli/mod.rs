//! Command-line interface
//!
//! This module contains the CLI commands and argument parsing, and the
//! JSON summaries the `decode` command prints.

pub mod commands;
pub mod decode;

pub use commands::{Command, Opt};
pub use decode::{summarize, BlockSummary, MessageSummary};
