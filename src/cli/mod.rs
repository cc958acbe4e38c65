//! CLI module for toolshare - command-line interface and subcommands.
//!
//! Every subcommand maps onto one marketplace operation.

pub mod commands;

pub use commands::Cli;
