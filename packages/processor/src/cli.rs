//! Command-line interface for the processor.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::processor::RichTextProcessor;

/// RichText Processor - Convert between editor markup and the RichText dialect.
#[derive(Parser)]
#[command(name = "richtext-processor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Processor configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a RichText document to view markup.
    ToView {
        /// Input document path
        input: PathBuf,
    },

    /// Round-trip a RichText document through the view and back,
    /// producing schema-valid output.
    Normalize {
        /// Input document path
        input: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether a document survives normalization unchanged.
    Check {
        /// Input document path
        input: PathBuf,
    },
}

/// Run the CLI.
///
/// # Errors
/// Returns an error when the configuration or input cannot be read, or
/// when `check` finds a document that normalization would change.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let processor = RichTextProcessor::new(config)?;

    match cli.command {
        Commands::ToView { input } => to_view_command(&processor, &input),
        Commands::Normalize { input, output } => {
            normalize_command(&processor, &input, output.as_deref())
        }
        Commands::Check { input } => check_command(&processor, &input),
    }
}

fn load_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::default());
    };
    let raw = fs::read_to_string(path)?;
    let config: ProcessorConfig = serde_yaml_ng::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

fn to_view_command(processor: &RichTextProcessor, input: &Path) -> Result<()> {
    let data = fs::read_to_string(input)?;
    println!("{}", processor.to_view_markup(&data));
    Ok(())
}

fn normalize_command(
    processor: &RichTextProcessor,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let data = fs::read_to_string(input)?;
    let normalized = processor.normalize(&data)?;
    match output {
        Some(path) => fs::write(path, normalized)?,
        None => println!("{normalized}"),
    }
    Ok(())
}

fn check_command(processor: &RichTextProcessor, input: &Path) -> Result<()> {
    let data = fs::read_to_string(input)?;
    let normalized = processor.normalize(&data)?;
    if normalized == data.trim_end() {
        println!("ok: {}", input.display());
        Ok(())
    } else {
        Err(crate::error::RichTextError::NotNormalized(
            input.display().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_to_view() {
        let cli = Cli::parse_from(["richtext-processor", "to-view", "doc.xml"]);

        let Commands::ToView { input } = cli.command else {
            panic!("expected to-view command");
        };
        assert_eq!(input, PathBuf::from("doc.xml"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_normalize_with_output() {
        let cli = Cli::parse_from([
            "richtext-processor",
            "normalize",
            "doc.xml",
            "--output",
            "out.xml",
        ]);

        let Commands::Normalize { input, output } = cli.command else {
            panic!("expected normalize command");
        };
        assert_eq!(input, PathBuf::from("doc.xml"));
        assert_eq!(output, Some(PathBuf::from("out.xml")));
    }

    #[test]
    fn test_cli_parse_global_config_flag() {
        let cli = Cli::parse_from([
            "richtext-processor",
            "check",
            "doc.xml",
            "--config",
            "processor.yaml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("processor.yaml")));
    }
}
