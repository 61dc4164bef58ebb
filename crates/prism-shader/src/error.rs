//! Error types for the shader front end

use crate::token::Token;
use thiserror::Error;

/// Result type alias using [`ParseError`]
pub type Result<T> = std::result::Result<T, ParseError>;

/// Fatal parse failure; parsing stops at the first one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A specific token or construct was required here
    #[error("line {line}: expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        line: usize,
        position: usize,
    },

    /// A top-level declaration started with something other than a declaration keyword
    #[error("line {line}: unexpected {found} at declaration boundary")]
    UnexpectedDeclaration {
        found: String,
        line: usize,
        position: usize,
    },

    /// A numeric literal did not parse to an integer
    #[error("line {line}: invalid numeric literal `{text}`")]
    InvalidNumber {
        text: String,
        line: usize,
        position: usize,
    },

    /// An expression statement was neither an assignment nor a call
    #[error("line {line}: expression statement must be an assignment or a call")]
    NotAStatement { line: usize, position: usize },

    /// Nesting went past the configured depth limit
    #[error("line {line}: nesting exceeds the maximum depth of {limit}")]
    TooDeep {
        limit: usize,
        line: usize,
        position: usize,
    },
}

impl ParseError {
    pub fn expected(expected: impl Into<String>, found: &Token) -> Self {
        Self::Expected {
            expected: expected.into(),
            found: found.describe(),
            line: found.line,
            position: found.position,
        }
    }

    pub fn unexpected_declaration(found: &Token) -> Self {
        Self::UnexpectedDeclaration {
            found: found.describe(),
            line: found.line,
            position: found.position,
        }
    }

    pub fn invalid_number(text: impl Into<String>, at: &Token) -> Self {
        Self::InvalidNumber {
            text: text.into(),
            line: at.line,
            position: at.position,
        }
    }

    pub fn not_a_statement(at: &Token) -> Self {
        Self::NotAStatement {
            line: at.line,
            position: at.position,
        }
    }

    pub fn too_deep(limit: usize, at: &Token) -> Self {
        Self::TooDeep {
            limit,
            line: at.line,
            position: at.position,
        }
    }

    /// 1-based line where the error was detected
    pub fn line(&self) -> usize {
        match self {
            Self::Expected { line, .. }
            | Self::UnexpectedDeclaration { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::NotAStatement { line, .. }
            | Self::TooDeep { line, .. } => *line,
        }
    }

    /// Character offset where the error was detected
    pub fn position(&self) -> usize {
        match self {
            Self::Expected { position, .. }
            | Self::UnexpectedDeclaration { position, .. }
            | Self::InvalidNumber { position, .. }
            | Self::NotAStatement { position, .. }
            | Self::TooDeep { position, .. } => *position,
        }
    }
}

/// A primitive/aggregate combination with no size or vertex format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported type {}", render_type(.aggregate.as_deref(), .primitive))]
pub struct UnsupportedType {
    pub aggregate: Option<String>,
    pub primitive: String,
}

fn render_type(aggregate: Option<&str>, primitive: &str) -> String {
    match aggregate {
        Some(aggregate) => format!("`{}<{}>`", aggregate, primitive),
        None => format!("`{}`", primitive),
    }
}

/// Failure while deriving vertex buffer layouts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("no function named `{0}`")]
    UnknownFunction(String),

    #[error("argument `{argument}`: {source}")]
    Unsupported {
        argument: String,
        #[source]
        source: UnsupportedType,
    },
}
