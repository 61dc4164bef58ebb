//! Error type for file-level entry points

use prism_shader::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl ScriptError {
    /// Underlying parse error, if parsing (rather than reading) failed
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::Io { .. } => None,
        }
    }
}
