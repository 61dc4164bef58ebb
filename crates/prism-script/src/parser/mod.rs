//! Recursive-descent parser for the scripting dialect
//!
//! Top-level declarations use the same struct/var/fn dispatch as the shader
//! module parser, but function bodies and initializers are parsed into the
//! [`Ast`] instead of being skipped. Binary operators are handled by an
//! explicit operator stack (see [`expr`]); remaining recursion is bounded by
//! [`ParserConfig::max_depth`].

mod expr;
mod stmt;

use crate::ast::{Ast, Declaration, SourceUnit, StmtId, TermId};
use crate::config::ParserConfig;
use prism_shader::decl::{parse_modifiers, parse_signature, parse_struct};
use prism_shader::{ParseError, Result, Session, TokenKind, TokenList, TokenStream};

pub(crate) struct Parser<'a> {
    stream: TokenStream<'a>,
    ast: Ast,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList, session: &'a Session, config: &ParserConfig) -> Self {
        Self {
            stream: TokenStream::new(tokens, session),
            ast: Ast::new(),
            max_depth: config.max_depth,
            depth: 0,
        }
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(ParseError::too_deep(self.max_depth, self.stream.peek()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Whether the current token is the keyword `word`
    fn check_keyword(&self, word: &str) -> bool {
        self.stream.kind() == TokenKind::Reserved && self.stream.check(word)
    }

    fn expect_end(&self) -> Result<()> {
        if self.stream.at_end() {
            Ok(())
        } else {
            Err(self.stream.error("end of text"))
        }
    }

    fn parse_declarations(&mut self, unit: &mut SourceUnit) -> Result<()> {
        while !self.stream.at_end() {
            let modifier = parse_modifiers(&mut self.stream)?;
            let token = self.stream.peek();
            if token.kind != TokenKind::Reserved {
                return Err(ParseError::unexpected_declaration(token));
            }

            match token.text.as_str() {
                "struct" => unit.structs.push(parse_struct(&mut self.stream, modifier)?),
                "var" | "const" | "let" => {
                    let statement = self.parse_variable_declaration(modifier)?;
                    unit.declarations.push(Declaration::Variable { statement });
                }
                "fn" => {
                    let signature = parse_signature(&mut self.stream, modifier)?;
                    let body = self.parse_block()?;
                    tracing::debug!(name = %signature.name, "parsed function body");
                    unit.declarations.push(Declaration::Function { signature, body });
                }
                _ => return Err(ParseError::unexpected_declaration(token)),
            }
        }
        Ok(())
    }
}

/// Parse a whole source unit with the default [`ParserConfig`]
pub fn parse_source(tokens: &TokenList, session: &mut Session) -> Result<SourceUnit> {
    parse_source_with(tokens, session, &ParserConfig::default())
}

/// Parse a whole source unit: structs, global variables and function bodies
///
/// Struct names are registered in `session` first, so a struct may be used
/// before its declaration.
pub fn parse_source_with(
    tokens: &TokenList,
    session: &mut Session,
    config: &ParserConfig,
) -> Result<SourceUnit> {
    session.register_struct_names(tokens);
    let mut parser = Parser::new(tokens, session, config);
    let mut unit = SourceUnit::default();
    parser.parse_declarations(&mut unit)?;
    unit.ast = parser.ast;
    Ok(unit)
}

/// Parse a single expression that must span the whole token list
pub fn parse_expression(
    tokens: &TokenList,
    session: &mut Session,
    config: &ParserConfig,
) -> Result<(Ast, TermId)> {
    session.register_struct_names(tokens);
    let mut parser = Parser::new(tokens, session, config);
    let root = parser.parse_expression()?;
    parser.expect_end()?;
    Ok((parser.ast, root))
}

/// Parse a run of statements up to end of text
pub fn parse_statements(
    tokens: &TokenList,
    session: &mut Session,
    config: &ParserConfig,
) -> Result<(Ast, Vec<StmtId>)> {
    session.register_struct_names(tokens);
    let mut parser = Parser::new(tokens, session, config);
    let mut statements = Vec::new();
    while !parser.stream.at_end() {
        statements.push(parser.parse_statement()?);
    }
    Ok((parser.ast, statements))
}
