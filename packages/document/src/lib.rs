//! # xmlens Document
//!
//! Arena-backed tree documents: named elements with ordered attributes,
//! optional text and ordered children.
//!
//! ```text
//! XML text ──parse──▶ Document (arena of Nodes, NodeId handles) ──serialize──▶ XML text
//! ```
//!
//! Handles stay valid for the lifetime of the document, including for
//! nodes that have been detached from the tree.

pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use document::Document;
pub use error::{ParseError, ParseResult, TreeError, TreeResult};
pub use node::{Attribute, Node, NodeId, NodeKind};
pub use parser::{parse, Parser};
pub use serializer::{serialize, Serializer};

impl Document {
    /// Parse XML markup
    pub fn parse(source: &str) -> ParseResult<Self> {
        parse(source)
    }

    /// Serialize with the default indent
    pub fn to_xml(&self) -> String {
        serialize(self)
    }
}
