//! Lexer: source text to [`TokenList`]
//!
//! The lexer is total. Characters it cannot classify become single-character
//! [`TokenKind::Unknown`] tokens, each distinct lexeme is reported once per
//! [`Session`], and lexing always continues to the end of the text.

use crate::session::Session;
use crate::token::{
    SYMBOLS_1, SYMBOLS_2, SubKind, Token, TokenKind, TokenList, is_keyword, is_type_name,
    symbol_sub_kind,
};

/// Tokenize `text` with a fresh session
pub fn tokenize(text: &str) -> TokenList {
    let mut session = Session::new();
    Lexer::new(&mut session).tokenize(text)
}

/// Converts source text into tokens, reporting into a [`Session`]
pub struct Lexer<'s> {
    session: &'s mut Session,
}

impl<'s> Lexer<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    pub fn tokenize(&mut self, text: &str) -> TokenList {
        let chars: Vec<char> = text.chars().collect();
        let mut scanner = Scanner {
            chars: &chars,
            pos: 0,
            line: 1,
        };
        let mut tokens: Vec<Token> = Vec::new();
        // Open `<` lists that follow a type name
        let mut generics = 0usize;

        while let Some(c) = scanner.current() {
            let start = scanner.pos;
            let line = scanner.line;

            if c == '\n' {
                scanner.line += 1;
                scanner.pos += 1;
            } else if c.is_whitespace() {
                scanner.pos += 1;
            } else if c == '/' && scanner.peek(1) == Some('/') {
                scanner.skip_line();
            } else if c == '"' {
                let (value, terminated) = scanner.string();
                if !terminated {
                    self.session.warn("unterminated string literal", line, start);
                }
                tokens.push(Token::new(
                    TokenKind::String,
                    SubKind::None,
                    value,
                    start,
                    line,
                ));
            } else if starts_word(c, scanner.peek(1)) {
                let word = scanner.word();
                tokens.push(classify_word(word, start, line));
            } else if c.is_ascii_digit() {
                let digits = scanner.take_while(|c| c.is_ascii_digit());
                tokens.push(Token::new(
                    TokenKind::Number,
                    SubKind::None,
                    digits,
                    start,
                    line,
                ));
            } else if c == '>' && generics > 0 {
                // Closes the list even when `=` follows, as in `vec3<f32>= v`
                scanner.pos += 1;
                generics -= 1;
                tokens.push(Token::new(TokenKind::Symbol, SubKind::Operator, ">", start, line));
            } else if let Some(symbol) = scanner.symbol() {
                match symbol.as_str() {
                    "<" if generics > 0
                        || tokens.last().is_some_and(|t| t.kind == TokenKind::TypeName) =>
                    {
                        generics += 1;
                    }
                    ";" | "{" | "}" => generics = 0,
                    _ => {}
                }
                let sub_kind = symbol_sub_kind(&symbol);
                tokens.push(Token::new(TokenKind::Symbol, sub_kind, symbol, start, line));
            } else {
                scanner.pos += 1;
                let lexeme = c.to_string();
                self.session.report_unknown(&lexeme, line, start);
                tokens.push(Token::new(
                    TokenKind::Unknown,
                    SubKind::None,
                    lexeme,
                    start,
                    line,
                ));
            }
        }

        tracing::trace!(count = tokens.len(), "tokenized source");
        TokenList::new(tokens, scanner.pos, scanner.line)
    }
}

/// A letter, or `@` directly followed by a letter
fn starts_word(c: char, next: Option<char>) -> bool {
    c.is_alphabetic() || (c == '@' && next.is_some_and(char::is_alphabetic))
}

fn classify_word(word: String, position: usize, line: usize) -> Token {
    let sub_kind = if word.starts_with('@') {
        SubKind::Attribute
    } else if is_keyword(&word) {
        SubKind::Keyword
    } else {
        SubKind::None
    };

    let kind = if is_keyword(&word) {
        TokenKind::Reserved
    } else if is_type_name(&word) {
        TokenKind::TypeName
    } else {
        TokenKind::Identifier
    };

    Token::new(kind, sub_kind, word, position, line)
}

struct Scanner<'a> {
    chars: &'a [char],
    pos: usize,
    line: usize,
}

impl Scanner<'_> {
    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.current().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Leaves the newline in place so line counting stays in one spot
    fn skip_line(&mut self) {
        while self.current().is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        if let Some('@') = self.current() {
            word.push('@');
            self.pos += 1;
        }
        word.push_str(&self.take_while(|c| c.is_alphanumeric() || c == '_'));
        word
    }

    /// Reads a quoted string; returns its unescaped value and whether it was closed
    fn string(&mut self) -> (String, bool) {
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.current() {
            self.pos += 1;
            match c {
                '"' => return (value, true),
                '\\' => {
                    let Some(escaped) = self.current() else { break };
                    self.pos += 1;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        (value, false)
    }

    fn symbol(&mut self) -> Option<String> {
        let first = self.current()?;
        if let Some(second) = self.peek(1) {
            let pair: String = [first, second].iter().collect();
            if SYMBOLS_2.contains(&pair.as_str()) {
                self.pos += 2;
                return Some(pair);
            }
        }
        if SYMBOLS_1.contains(&first) {
            self.pos += 1;
            return Some(first.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &TokenList) -> Vec<&str> {
        tokens.significant().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_empty_source_yields_sentinel_only() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());

        let tokens = tokenize("  \t\r\n\n  ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.end().line, 3);
    }

    #[test]
    fn test_words_are_classified() {
        let tokens = tokenize("struct Light { color: vec3<f32> }");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Reserved,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::TypeName,
                TokenKind::Symbol,
                TokenKind::TypeName,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::EndOfText,
            ]
        );
    }

    #[test]
    fn test_attribute_is_fused() {
        let tokens = tokenize("@location(0) @interpolate");
        assert_eq!(tokens[0].text, "@location");
        assert_eq!(tokens[0].kind, TokenKind::Reserved);
        assert_eq!(tokens[0].sub_kind, SubKind::Attribute);
        assert_eq!(tokens[4].text, "@interpolate");
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_two_character_symbols_win() {
        let tokens = tokenize("a->b => c <= d += 1 <");
        assert_eq!(
            texts(&tokens),
            vec!["a", "->", "b", "=>", "c", "<=", "d", "+=", "1", "<"]
        );
    }

    #[test]
    fn test_type_generic_closes_before_equals() {
        let tokens = tokenize("let v: vec3<f32>= a; b >= c; array<vec4<f32>>= d");
        assert_eq!(
            texts(&tokens),
            vec![
                "let", "v", ":", "vec3", "<", "f32", ">", "=", "a", ";", "b", ">=", "c", ";",
                "array", "<", "vec4", "<", "f32", ">", ">", "=", "d"
            ]
        );

        // Identifiers do not open a list
        let tokens = tokenize("x<y>=z");
        assert_eq!(texts(&tokens), vec!["x", "<", "y", ">=", "z"]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize("x // trailing words\ny");
        assert_eq!(texts(&tokens), vec!["x", "y"]);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_numbers_have_no_fraction() {
        let tokens = tokenize("12.5");
        assert_eq!(texts(&tokens), vec!["12", ".", "5"]);
        assert_eq!(tokens[0].kind, TokenKind::Number);
    }

    #[test]
    fn test_positions_are_character_offsets() {
        let tokens = tokenize("a ⇔ b");
        assert_eq!(tokens[1].text, "⇔");
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        assert_eq!(tokens[2].position, 4);
    }

    #[test]
    fn test_unknown_characters_continue_lexing() {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize("a ~ b ~ c $");
        assert_eq!(texts(&tokens), vec!["a", "~", "b", "~", "c", "$"]);
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(session.diagnostics().len(), 2);
    }

    #[test]
    fn test_string_literals() {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize(r#"print("a \"b\"")"#);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, r#"a "b""#);
        assert!(session.diagnostics().is_empty());

        let tokens = Lexer::new(&mut session).tokenize("\"open");
        assert_eq!(tokens[0].text, "open");
        assert_eq!(session.diagnostics().len(), 1);
    }
}
