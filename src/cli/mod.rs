//! CLI module for Variant Kit
//!
//! Every subcommand builds an engine from the loaded configuration, runs one
//! operation against it and prints the result to stdout.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{build_engine, execute, run};

/// Variant Kit - Sticky A/B test variant allocation
#[derive(Debug, Parser)]
#[command(name = "variant-kit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print the variant of a test, allocating one if needed
    Variant { test: String },

    /// Force a test to a variant
    Set { test: String, variant: String },

    /// Print whether a test is assigned a non-control variant
    IsTest { test: String },

    /// Print the declared variants and weights of a test
    Weights { test: String },

    /// List registered tests
    Tests,

    /// Print the current assignments
    Assignments,

    /// Forget all assignments and delete the persisted record
    Reset,

    /// Move assignments stored under another key into the configured one
    Migrate { from_key: String },
}
