use super::{absolute, execute};
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use xmlens_lens::{Modification, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// XML file to modify
    pub file: PathBuf,

    /// Change statement (repeatable)
    #[arg(short, long = "change")]
    pub changes: Vec<String>,

    /// Condition that must hold for the changes to run (repeatable)
    #[arg(short = 'o', long = "onlyif")]
    pub onlyif: Vec<String>,

    /// Print the result instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let modification = Modification {
        file: absolute(&args.file, cwd),
        changes: args.changes,
        onlyif: args.onlyif,
    };

    let execution = execute(&modification, !args.dry_run)?;

    match execution.outcome {
        Outcome::ConditionFailed(position) => {
            println!(
                "{} no changes made: condition failed (#{})",
                "•".yellow(),
                position + 1
            );
        }
        Outcome::Applied(_) if args.dry_run => match args.format {
            OutputFormat::Xml => print!("{}", execution.document.to_xml()),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&execution.document)?)
            }
        },
        Outcome::Applied(count) => {
            println!(
                "{} {} ({} operation{})",
                "✓".green(),
                modification.file.display(),
                count,
                if count == 1 { "" } else { "s" }
            );
        }
    }

    Ok(())
}
