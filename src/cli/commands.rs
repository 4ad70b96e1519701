//! CLI command definitions

use crate::synth::OutputFormat;
use clap::Args;

/// Synthesize a pipeline document
#[derive(Debug, Args, Clone)]
pub struct SynthCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,

    /// Wrap the document in a template resource
    #[arg(long)]
    pub template: bool,

    /// Override the pipeline account
    #[arg(long)]
    pub account: Option<String>,

    /// Override the pipeline region
    #[arg(long)]
    pub region: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print the synthesized document as JSON
    #[arg(long)]
    pub json: bool,

    /// Override the pipeline account
    #[arg(long)]
    pub account: Option<String>,

    /// Override the pipeline region
    #[arg(long)]
    pub region: Option<String>,
}

/// Output format argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}
