//! Token types and the fixed word/symbol tables used for classification

use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Coarse lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Identifier,
    TypeName,
    Number,
    String,
    Symbol,
    Reserved,
    EndOfText,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::TypeName => "type name",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Reserved => "reserved word",
            TokenKind::EndOfText => "end of text",
            TokenKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Finer classification within a [`TokenKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubKind {
    /// No finer class applies
    None,
    /// `@`-prefixed word such as `@location`
    Attribute,
    /// Declaration or control-flow keyword
    Keyword,
    /// Arithmetic, relational, logical or assignment operator
    Operator,
    /// Bracket of any shape
    Delimiter,
    /// `,` `;` `:` `.` `->` `#`
    Punctuation,
}

/// A classified lexeme with its source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub sub_kind: SubKind,
    pub text: String,
    /// Character offset of the first character
    pub position: usize,
    /// 1-based source line
    pub line: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        sub_kind: SubKind,
        text: impl Into<String>,
        position: usize,
        line: usize,
    ) -> Self {
        Self {
            kind,
            sub_kind,
            text: text.into(),
            position,
            line,
        }
    }

    /// The end-of-text sentinel
    pub fn end_of_text(position: usize, line: usize) -> Self {
        Self::new(TokenKind::EndOfText, SubKind::None, "", position, line)
    }

    /// Whether this is the word or symbol `text`; string literals never match
    pub fn is(&self, text: &str) -> bool {
        !matches!(self.kind, TokenKind::EndOfText | TokenKind::String) && self.text == text
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfText
    }

    /// Description used in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfText => "end of text".to_string(),
            kind => format!("{} `{}`", kind, self.text),
        }
    }
}

/// Ordered tokens; the last element is always the end-of-text sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    /// Build a list, appending the sentinel after `tokens`
    pub fn new(mut tokens: Vec<Token>, end_position: usize, end_line: usize) -> Self {
        tokens.retain(|t| !t.is_end());
        tokens.push(Token::end_of_text(end_position, end_line));
        Self { tokens }
    }

    /// The trailing sentinel
    pub fn end(&self) -> &Token {
        // Constructors guarantee a non-empty list
        &self.tokens[self.tokens.len() - 1]
    }

    /// Tokens without the sentinel
    pub fn significant(&self) -> &[Token] {
        &self.tokens[..self.tokens.len() - 1]
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl Deref for TokenList {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Words classified as [`TokenKind::Reserved`]
pub const KEYWORDS: &[&str] = &[
    "struct",
    "var",
    "let",
    "const",
    "fn",
    "return",
    "if",
    "else",
    "while",
    "for",
    "parallel",
    "in",
    "notin",
    "subset",
    "@group",
    "@binding",
    "@location",
    "@workgroup_size",
    "@builtin",
    "@vertex",
    "@fragment",
    "@compute",
];

/// Words classified as [`TokenKind::TypeName`]
pub const TYPE_NAMES: &[&str] = &[
    "bool",
    "f16",
    "f32",
    "i32",
    "u32",
    "vec2",
    "vec3",
    "vec4",
    "vec2f",
    "vec3f",
    "vec4f",
    "vec2i",
    "vec3i",
    "vec4i",
    "vec2u",
    "vec3u",
    "vec4u",
    "mat2x2",
    "mat3x3",
    "mat4x4",
    "array",
    "atomic",
    "ptr",
    "sampler",
    "texture_2d",
    "texture_cube",
    "texture_depth_2d",
];

/// Two-character symbols, tried before single characters
pub const SYMBOLS_2: &[&str] = &[
    "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "%=",
];

/// Single-character symbols
pub const SYMBOLS_1: &[char] = &[
    '+', '-', '*', '/', '%', '^', '=', '<', '>', '!', '&', '|', '⇔', '(', ')', '[', ']', '{',
    '}', ',', ';', ':', '.', '#',
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_type_name(word: &str) -> bool {
    TYPE_NAMES.contains(&word)
}

/// Sub-kind for a symbol lexeme
pub fn symbol_sub_kind(symbol: &str) -> SubKind {
    match symbol {
        "(" | ")" | "[" | "]" | "{" | "}" => SubKind::Delimiter,
        "," | ";" | ":" | "." | "->" | "#" => SubKind::Punctuation,
        _ => SubKind::Operator,
    }
}
