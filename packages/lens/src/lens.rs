//! # Lens
//!
//! A lens binds one list of changes and one list of conditions to one
//! document. Construction parses and compiles every statement, so a lens
//! that fails to build has touched nothing.
//!
//! ```rust,ignore
//! use xmlens_document::Document;
//! use xmlens_lens::XmlLens;
//!
//! let mut doc = Document::parse(r#"<a><b x="1"/></a>"#)?;
//! let mut lens = XmlLens::new(
//!     &mut doc,
//!     &[r#"set /a/b#attribute/x "2""#],
//!     &[r#"get /a/b#attribute/x == "1""#],
//! )?;
//! lens.evaluate()?;
//! ```

use crate::error::LensResult;
use crate::operation::{Compiled, Operation, Validation};
use crate::statement::Statement;
use tracing::{debug, info, instrument, warn};
use xmlens_document::Document;

/// Result of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every validation passed; this many operations ran
    Applied(usize),
    /// The validation at this position failed; nothing ran
    ConditionFailed(usize),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

pub struct XmlLens<'doc> {
    document: &'doc mut Document,
    validations: Vec<Validation>,
    operations: Vec<Operation>,
}

impl<'doc> XmlLens<'doc> {
    /// Compile `changes` then `conditions` against `document`.
    ///
    /// Blank statements are skipped. A statement compiles by its command,
    /// not by the list it came from: a `get` among the changes still gates.
    pub fn new<C, V>(document: &'doc mut Document, changes: &[C], conditions: &[V]) -> LensResult<Self>
    where
        C: AsRef<str>,
        V: AsRef<str>,
    {
        let mut validations = Vec::new();
        let mut operations = Vec::new();

        let statements = changes
            .iter()
            .map(AsRef::as_ref)
            .chain(conditions.iter().map(AsRef::as_ref))
            .filter(|s| !s.trim().is_empty());

        for source in statements {
            let statement = Statement::parse(source)?;
            match statement.compile(document)? {
                Compiled::Operation(op) => operations.push(op),
                Compiled::Validation(check) => validations.push(check),
                Compiled::Nothing => {}
            }
        }

        debug!(
            validations = validations.len(),
            operations = operations.len(),
            "Built lens"
        );

        Ok(Self {
            document,
            validations,
            operations,
        })
    }

    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    /// Run the validations only. `Ok(None)` when all pass, otherwise the
    /// position of the first failing one.
    pub fn check(&self) -> LensResult<Option<usize>> {
        for (i, validation) in self.validations.iter().enumerate() {
            if !validation.check(&*self.document)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Run validations in order, stopping at the first failure; if all
    /// pass, run every operation in order.
    #[instrument(skip(self), fields(validations = self.validations.len(), operations = self.operations.len()))]
    pub fn run(&mut self) -> LensResult<Outcome> {
        if let Some(failed) = self.check()? {
            warn!(
                condition = self.validations[failed].name(),
                position = failed,
                "Condition failed, no changes made"
            );
            return Ok(Outcome::ConditionFailed(failed));
        }

        for operation in &self.operations {
            debug!(operation = operation.name(), "Applying operation");
            operation.apply(&mut *self.document)?;
        }

        info!(operations = self.operations.len(), "Lens applied");
        Ok(Outcome::Applied(self.operations.len()))
    }

    /// Two-phase evaluation returning the (possibly mutated) document
    pub fn evaluate(&mut self) -> LensResult<&Document> {
        self.run()?;
        Ok(&*self.document)
    }
}
