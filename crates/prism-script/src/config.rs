//! Parser limits

use serde::{Deserialize, Serialize};

/// Default nesting limit for expressions and blocks
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest allowed nesting of parenthesized expressions, argument lists,
    /// exponents and blocks before parsing fails with `TooDeep`
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}
