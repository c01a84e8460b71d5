//! A named set of changes and conditions aimed at one file.
//!
//! [`Modification::validate`] runs every check that can be made without
//! reading the file, so a bad statement is reported before anything is
//! loaded or written.

use crate::error::{LensError, LensResult};
use crate::lens::XmlLens;
use crate::statement::Statement;
use std::path::PathBuf;
use tracing::debug;
use xmlens_document::Document;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modification {
    pub file: PathBuf,
    pub changes: Vec<String>,
    pub onlyif: Vec<String>,
}

impl Modification {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    pub fn change(mut self, statement: impl Into<String>) -> Self {
        self.changes.push(statement.into());
        self
    }

    pub fn onlyif(mut self, statement: impl Into<String>) -> Self {
        self.onlyif.push(statement.into());
        self
    }

    /// Check the file path and every statement's grammar and paths
    pub fn validate(&self) -> LensResult<()> {
        if !self.file.is_absolute() {
            return Err(LensError::UnqualifiedFile(self.file.display().to_string()));
        }

        for source in self.statements() {
            let statement = Statement::parse(source)?;
            for path in statement.command.paths() {
                if !path.starts_with('/') {
                    return Err(LensError::InvalidXPath(path.to_string()));
                }
            }
        }

        debug!(file = %self.file.display(), "Modification is valid");
        Ok(())
    }

    /// Validate, then build a lens over `document`
    pub fn lens<'doc>(&self, document: &'doc mut Document) -> LensResult<XmlLens<'doc>> {
        self.validate()?;
        XmlLens::new(document, &self.changes, &self.onlyif)
    }

    fn statements(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .chain(self.onlyif.iter())
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(modification: Modification) -> String {
        modification.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_file_must_be_absolute() {
        let msg = message(Modification::new("my/path"));
        assert!(msg.contains("paths must be fully qualified"), "{}", msg);
    }

    #[test]
    fn test_changes_require_absolute_xpath() {
        let msg = message(Modification::new("/my/path").change(r#"set blah/bloo/hah "test""#));
        assert!(msg.contains("invalid xpath"), "{}", msg);
    }

    #[test]
    fn test_unknown_commands() {
        let msg = message(Modification::new("/my/path").change(r#"sets /blah/bloo/hah "test""#));
        assert!(msg.contains("Unrecognized command"), "{}", msg);

        let msg = message(Modification::new("/my/path").onlyif(r#"gets /blah/bloo/hah "test""#));
        assert!(msg.contains("Unrecognized command"), "{}", msg);
    }

    #[test]
    fn test_invalid_syntax() {
        for modification in [
            Modification::new("/my/path").change("ins blue befores red"),
            Modification::new("/my/path").change("set /blah/bloo/hah test"),
            Modification::new("/my/path").onlyif("get /blah/bloo/hah test"),
            Modification::new("/my/path").onlyif("match /blah/bloo/hah test"),
        ] {
            let msg = message(modification);
            assert!(msg.contains("Invalid syntax"), "{}", msg);
        }
    }

    #[test]
    fn test_onlyif_requires_absolute_xpath() {
        let msg = message(Modification::new("/my/path").onlyif(r#"get blah/bloo/hah == "test""#));
        assert!(msg.contains("invalid xpath"), "{}", msg);
    }

    #[test]
    fn test_insert_target_is_checked() {
        let msg = message(Modification::new("/my/path").change("ins q before a/b"));
        assert!(msg.contains("invalid xpath"), "{}", msg);
    }

    #[test]
    fn test_valid_modification_builds_lens() {
        let modification = Modification::new("/etc/app.xml")
            .change(r#"set /a/b "v""#)
            .onlyif("match /a/b size == 0");
        let mut doc = Document::parse("<a/>").unwrap();

        let mut lens = modification.lens(&mut doc).unwrap();
        assert!(lens.run().unwrap().is_applied());
        assert_eq!(doc.to_xml(), "<a>\n  <b>v</b>\n</a>\n");
    }
}
