use thiserror::Error;
use xmlens_document::TreeError;

pub type LensResult<T> = Result<T, LensError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LensError {
    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("Invalid syntax in '{statement}': {message}")]
    InvalidSyntax { statement: String, message: String },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("invalid xpath: {0}")]
    InvalidXPath(String),

    #[error("File paths must be fully qualified, not '{0}'")]
    UnqualifiedFile(String),

    /// An internal primitive received a value of the wrong shape
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl LensError {
    pub fn invalid_syntax(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            statement: statement.into(),
            message: message.into(),
        }
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Raised while reading statements, before anything runs
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedCommand(_)
                | Self::InvalidSyntax { .. }
                | Self::UnsupportedOperator(_)
                | Self::InvalidXPath(_)
                | Self::UnqualifiedFile(_)
        )
    }

    /// Caller or internal-consistency bug; never a data condition
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::Tree(_))
    }
}
