//! Module parser: token list to [`Module`]
//!
//! Single pass over top-level declarations. Function bodies are skipped by
//! brace counting; only signatures are kept.

use crate::decl::{parse_global_var, parse_modifiers, parse_signature, parse_struct, skip_body};
use crate::error::{LayoutError, ParseError, Result};
use crate::layout::{LayoutConfig, LayoutInput, VertexBufferLayout, build_layouts};
use crate::lexer::Lexer;
use crate::session::Session;
use crate::stream::TokenStream;
use crate::token::{TokenKind, TokenList};
use crate::types::{Function, Struct, Variable};
use serde::Serialize;

/// Structured metadata of a shader source unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Module {
    pub structs: Vec<Struct>,
    pub vars: Vec<Variable>,
    pub fns: Vec<Function>,
}

impl Module {
    /// Tokenize and parse `source` in a fresh session
    pub fn parse(source: &str) -> Result<Self> {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize(source);
        parse_module(&tokens, &mut session)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.fns.iter().find(|f| f.name == name)
    }

    pub fn structure(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn var(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Vertex buffer layouts for the entry point `function`
    ///
    /// Arguments typed with a struct declared in this module are expanded
    /// into that struct's members, and `@builtin` inputs are left out. An
    /// argument counts as per-instance when its own name or (for expanded
    /// structs) the member name is listed in `config`.
    pub fn vertex_buffer_layouts(
        &self,
        function: &str,
        config: &LayoutConfig,
    ) -> std::result::Result<Vec<VertexBufferLayout>, LayoutError> {
        let function = self
            .function(function)
            .ok_or_else(|| LayoutError::UnknownFunction(function.to_string()))?;

        let mut inputs = Vec::new();
        for arg in &function.args {
            let is_struct_arg = arg.ty.aggregate.is_none();
            match self.structure(&arg.ty.primitive).filter(|_| is_struct_arg) {
                Some(structure) => {
                    let whole = config.is_instance(&arg.name);
                    for member in &structure.members {
                        inputs.push(LayoutInput {
                            variable: member,
                            instance: whole || config.is_instance(&member.name),
                        });
                    }
                }
                None => inputs.push(LayoutInput {
                    variable: arg,
                    instance: config.is_instance(&arg.name),
                }),
            }
        }

        build_layouts(&inputs)
    }
}

/// Parse a token list into a [`Module`]
///
/// Struct names are registered in `session` before parsing so every use
/// of a struct, wherever it appears, reads as a type name.
pub fn parse_module(tokens: &TokenList, session: &mut Session) -> Result<Module> {
    session.register_struct_names(tokens);
    let mut stream = TokenStream::new(tokens, session);
    let mut module = Module::default();

    while !stream.at_end() {
        let modifier = parse_modifiers(&mut stream)?;
        let token = stream.peek();
        if token.kind != TokenKind::Reserved {
            return Err(ParseError::unexpected_declaration(token));
        }

        match token.text.as_str() {
            "struct" => module.structs.push(parse_struct(&mut stream, modifier)?),
            "var" => module.vars.push(parse_global_var(&mut stream, modifier)?),
            "fn" => {
                let function = parse_signature(&mut stream, modifier)?;
                skip_body(&mut stream)?;
                tracing::debug!(name = %function.name, args = function.args.len(), "parsed function");
                module.fns.push(function);
            }
            _ => return Err(ParseError::unexpected_declaration(token)),
        }
    }

    Ok(module)
}
