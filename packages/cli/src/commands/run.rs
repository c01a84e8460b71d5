use super::{absolute, execute};
use crate::config::Manifest;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use xmlens_lens::{Modification, Outcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Manifest listing modifications (defaults to ./xmlens.json)
    pub manifest: Option<PathBuf>,

    /// Evaluate every modification without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: RunArgs, cwd: &Path) -> Result<()> {
    let path = match &args.manifest {
        Some(path) => absolute(path, cwd),
        None => Manifest::default_path(cwd),
    };
    let manifest = Manifest::load(&path)?;

    println!(
        "{} {} ({} modifications)",
        "Running".green().bold(),
        path.display(),
        manifest.modifications.len()
    );

    for entry in &manifest.modifications {
        let label = entry.label();
        let execution = execute(&Modification::from(entry), !args.dry_run)
            .with_context(|| format!("Modification '{}' failed", label))?;

        match execution.outcome {
            Outcome::Applied(count) => {
                println!("   {} {} ({} operations)", "✓".green(), label, count)
            }
            Outcome::ConditionFailed(_) => println!(
                "   {} {}: no changes made: condition failed",
                "•".yellow(),
                label
            ),
        }
    }

    Ok(())
}
