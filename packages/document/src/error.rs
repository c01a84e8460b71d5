use crate::node::NodeId;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lexer error at {pos}")]
    LexerError { pos: usize },

    #[error("Unexpected end tag </{name}> at {pos}")]
    UnexpectedEndTag { pos: usize, name: String },

    #[error("Mismatched tag at {pos}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unclosed tag <{0}>")]
    UnclosedTag(String),

    #[error("Text outside of the root element at {pos}")]
    TextOutsideRoot { pos: usize },

    #[error("Invalid start tag at {pos}")]
    InvalidStartTag { pos: usize },

    #[error("Document has no root element")]
    NoRootElement,
}

impl ParseError {
    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }

    pub fn unexpected_end_tag(pos: usize, name: impl Into<String>) -> Self {
        Self::UnexpectedEndTag {
            pos,
            name: name.into(),
        }
    }

    pub fn mismatched_tag(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedTag {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Errors raised by structural operations on the arena
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Node is not an element: {0}")]
    NotAnElement(NodeId),

    #[error("Inconsistent node arena: {0}")]
    InvalidArena(String),
}
