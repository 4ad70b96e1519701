//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{SynthCommand, ValidateCommand};
use std::ffi::OsString;

/// Build and validate CodePipeline definitions from YAML
#[derive(Debug, Parser, Clone)]
#[command(name = "codepipeline-synth")]
#[command(author = "codepipeline-synth Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Synthesize CodePipeline stage and action definitions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Synthesize a pipeline document
    Synth(SynthCommand),

    /// Validate a pipeline configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
