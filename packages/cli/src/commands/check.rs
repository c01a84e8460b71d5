use super::{absolute, load_document};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use xmlens_lens::{Modification, XmlLens};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// XML file to inspect
    pub file: PathBuf,

    /// Condition to evaluate (repeatable)
    #[arg(short = 'o', long = "onlyif", required = true)]
    pub onlyif: Vec<String>,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let modification = Modification {
        file: absolute(&args.file, cwd),
        changes: Vec::new(),
        onlyif: args.onlyif,
    };
    modification.validate()?;

    let mut document = load_document(&modification.file)?;
    let lens = XmlLens::new(&mut document, &modification.changes, &modification.onlyif)?;
    let total = lens.validations().len();

    match lens.check()? {
        None => {
            println!("{} {} condition{} hold", "✓".green(), total, if total == 1 { "" } else { "s" });
            Ok(())
        }
        Some(position) => {
            println!("{} condition {} of {} failed", "✗".red(), position + 1, total);
            bail!("{} does not satisfy its conditions", modification.file.display())
        }
    }
}
