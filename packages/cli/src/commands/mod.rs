pub mod apply;
pub mod check;
pub mod run;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use run::{run, RunArgs};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use xmlens_document::Document;
use xmlens_lens::{Modification, Outcome, XmlLens};

/// Result of running one modification
#[derive(Debug)]
pub struct Execution {
    pub outcome: Outcome,
    pub document: Document,
}

/// Resolve a command-line path against the working directory
pub fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

pub fn load_document(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Document::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Validate, load, evaluate and (when `persist` is set and something ran)
/// write the document back.
pub fn execute(modification: &Modification, persist: bool) -> Result<Execution> {
    modification.validate()?;

    let mut document = load_document(&modification.file)?;
    let outcome = XmlLens::new(&mut document, &modification.changes, &modification.onlyif)?.run()?;

    if persist && matches!(outcome, Outcome::Applied(n) if n > 0) {
        fs::write(&modification.file, document.to_xml())
            .with_context(|| format!("Failed to write {}", modification.file.display()))?;
        info!(file = %modification.file.display(), "Wrote document");
    }

    Ok(Execution { outcome, document })
}
