//! Per-parse session state
//!
//! A [`Session`] owns everything that must not leak between independent
//! parses: the set of unknown lexemes already reported, the registry of
//! struct names, and the diagnostics collected along the way.

use crate::token::{Token, TokenKind};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal message collected during lexing or parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub position: usize,
}

/// State shared by the lexer and both parsers for one source unit
#[derive(Debug, Default, Clone)]
pub struct Session {
    reported_unknown: BTreeSet<String>,
    struct_names: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything learned so far
    pub fn reset(&mut self) {
        self.reported_unknown.clear();
        self.struct_names.clear();
        self.diagnostics.clear();
    }

    /// Record an unknown lexeme; returns `true` the first time it is seen
    pub fn report_unknown(&mut self, lexeme: &str, line: usize, position: usize) -> bool {
        if !self.reported_unknown.insert(lexeme.to_string()) {
            return false;
        }
        tracing::warn!(lexeme, line, "unknown token");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: format!("unknown token `{}`", lexeme),
            line,
            position,
        });
        true
    }

    /// Record a warning that is not tied to an unknown lexeme
    pub fn warn(&mut self, message: impl Into<String>, line: usize, position: usize) {
        let message = message.into();
        tracing::warn!(line, "{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
            line,
            position,
        });
    }

    /// Distinct unknown lexemes reported in this session
    pub fn unknown_lexemes(&self) -> impl Iterator<Item = &str> {
        self.reported_unknown.iter().map(String::as_str)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn register_struct(&mut self, name: &str) {
        if self.struct_names.insert(name.to_string()) {
            tracing::trace!(name, "registered struct name");
        }
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.struct_names.contains(name)
    }

    /// Register every name that follows a `struct` keyword in `tokens`
    ///
    /// Runs before parsing so that uses of a struct that precede its
    /// declaration still classify as type names.
    pub fn register_struct_names(&mut self, tokens: &[Token]) {
        for pair in tokens.windows(2) {
            let [keyword, name] = pair else { continue };
            if keyword.kind == TokenKind::Reserved
                && keyword.text == "struct"
                && matches!(name.kind, TokenKind::Identifier | TokenKind::Unknown)
            {
                self.register_struct(&name.text);
            }
        }
    }

    /// Effective kind of `token`, with registered struct names promoted to type names
    pub fn classify(&self, token: &Token) -> TokenKind {
        match token.kind {
            TokenKind::Identifier | TokenKind::Unknown if self.is_struct(&token.text) => {
                TokenKind::TypeName
            }
            kind => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SubKind;

    fn ident(text: &str) -> Token {
        Token::new(TokenKind::Identifier, SubKind::None, text, 0, 1)
    }

    #[test]
    fn test_unknown_reported_once() {
        let mut session = Session::new();
        assert!(session.report_unknown("~", 1, 0));
        assert!(!session.report_unknown("~", 2, 10));
        assert!(session.report_unknown("$", 2, 11));
        assert_eq!(session.diagnostics().len(), 2);
        assert_eq!(session.unknown_lexemes().collect::<Vec<_>>(), vec!["$", "~"]);
    }

    #[test]
    fn test_struct_names_promote_identifiers() {
        let mut session = Session::new();
        let tokens = vec![
            ident("Light"),
            Token::new(TokenKind::Reserved, SubKind::Keyword, "struct", 6, 1),
            ident("Light"),
        ];
        session.register_struct_names(&tokens);

        assert_eq!(session.classify(&tokens[0]), TokenKind::TypeName);
        assert_eq!(session.classify(&ident("light")), TokenKind::Identifier);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = Session::new();
        session.register_struct("Camera");
        session.report_unknown("~", 1, 0);
        session.reset();

        assert!(!session.is_struct("Camera"));
        assert!(session.diagnostics().is_empty());
        assert!(session.report_unknown("~", 1, 0));
    }
}
