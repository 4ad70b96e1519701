use anyhow::{Context, Result};
use codepipeline_synth::cli::commands::{SynthCommand, ValidateCommand};
use codepipeline_synth::cli::output::*;
use codepipeline_synth::cli::{Cli, Command};
use codepipeline_synth::core::config::PipelineConfig;
use codepipeline_synth::synth::{self, Template};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Synth(cmd) => synth_pipeline(cmd)?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

fn load_config(file: &str, account: &Option<String>, region: &Option<String>) -> Result<PipelineConfig> {
    PipelineConfig::load(file, account.clone(), region.clone()).context("Failed to load pipeline config")
}

fn synth_pipeline(cmd: &SynthCommand) -> Result<()> {
    let config = load_config(&cmd.file, &cmd.account, &cmd.region)?;
    let pipeline = config.to_pipeline()?;
    let document = pipeline.synthesize()?;

    let format = cmd.format.into();
    let rendered = if cmd.template {
        synth::render(&Template::from_document(document), format)?
    } else {
        synth::render(&document, format)?
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &rendered).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("{} Wrote {}", CHECK, style(path).bold());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = load_config(&cmd.file, &cmd.account, &cmd.region)
        .and_then(|config| Ok(config.to_pipeline()?))
        .and_then(|pipeline| Ok((pipeline.synthesize()?, pipeline)));

    match result {
        Ok((document, pipeline)) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            print!("{}", format_pipeline_summary(&pipeline));
            println!("  {}", format_document_stats(&document));

            if cmd.json {
                println!("\n{}", document.to_json()?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
