//! Command-line interface for orderpad.
//!
//! This module provides the CLI structure and command definitions for the
//! `opad` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ListCommand, MoveCommand, OutputFormat, RemoveCommand, StatusCommand,
};

/// opad - keep a customer order list
///
/// Records customer orders, persists them on-device, and lets you work the
/// list from a form screen or from these subcommands.
#[derive(Debug, Parser)]
#[command(name = "opad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute; opens the form screen when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the order form screen (the default)
    Ui,

    /// Add an order to the end of the list
    Add(AddCommand),

    /// List saved orders
    List(ListCommand),

    /// Remove the order at a position
    Remove(RemoveCommand),

    /// Move the order at a position up by one
    MoveUp(MoveCommand),

    /// Move the order at a position down by one
    MoveDown(MoveCommand),

    /// Show list and store status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    ///
    /// Invocations that open the form screen default to quiet logging, so
    /// log lines don't tear the display; `-v` overrides that.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet || (self.verbose == 0 && self.launches_ui()) {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// Check whether this invocation opens the form screen.
    #[must_use]
    pub fn launches_ui(&self) -> bool {
        matches!(self.command, None | Some(Command::Ui))
    }
}
