//! Cursor over a [`TokenList`] for the hand-written parsers

use crate::error::ParseError;
use crate::session::Session;
use crate::token::{Token, TokenKind, TokenList};

/// Token cursor with lookahead
///
/// The cursor never moves past the end-of-text sentinel, so `peek` always
/// has a token to return. Kinds are read through the [`Session`] so that
/// registered struct names classify as type names.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    session: &'a Session,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a TokenList, session: &'a Session) -> Self {
        Self {
            tokens: &tokens[..],
            session,
            pos: 0,
        }
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Current token
    pub fn peek(&self) -> &'a Token {
        self.peek_nth(0)
    }

    /// Token `n` places ahead, clamped to the sentinel
    pub fn peek_nth(&self, n: usize) -> &'a Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Effective kind of the current token
    pub fn kind(&self) -> TokenKind {
        self.session.classify(self.peek())
    }

    pub fn kind_nth(&self, n: usize) -> TokenKind {
        self.session.classify(self.peek_nth(n))
    }

    /// Consume the current token and return it
    pub fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !token.is_end() {
            self.pos += 1;
        }
        token
    }

    pub fn check(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    pub fn check_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|t| self.check(t))
    }

    /// Consume the current token if its text is `text`
    pub fn eat(&mut self, text: &str) -> bool {
        if self.check(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token with text `text` or fail
    pub fn expect(&mut self, text: &str) -> Result<&'a Token, ParseError> {
        if self.check(text) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("`{}`", text)))
        }
    }

    /// Consume an identifier (or a word the session reclassified) and return its text
    pub fn expect_name(&mut self) -> Result<&'a str, ParseError> {
        match self.kind() {
            TokenKind::Identifier | TokenKind::TypeName => Ok(self.advance().text.as_str()),
            _ => Err(self.error("a name")),
        }
    }

    pub fn at_end(&self) -> bool {
        self.peek().is_end()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// "expected X, found <current>" at the current token
    pub fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError::expected(expected, self.peek())
    }
}
