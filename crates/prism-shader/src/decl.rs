//! Declaration-level grammar shared by the module and script parsers
//!
//! Modifiers, types, struct declarations and function signatures read the
//! same way in both front ends; only function bodies differ (skipped here,
//! fully parsed by `prism-script`).

use crate::error::{ParseError, Result};
use crate::stream::TokenStream;
use crate::token::TokenKind;
use crate::types::{Function, Modifier, ShaderStage, Struct, Type, Variable};

/// Read a run of leading attributes
///
/// A token that is not a recognized attribute ends the run without error;
/// the caller decides whether what follows is valid.
pub fn parse_modifiers(stream: &mut TokenStream) -> Result<Modifier> {
    let mut modifier = Modifier::default();

    loop {
        let token = stream.peek();
        if token.kind != TokenKind::Reserved {
            break;
        }

        match token.text.as_str() {
            "@group" => {
                stream.advance();
                modifier.group = Some(parse_paren_number(stream)?);
            }
            "@binding" => {
                stream.advance();
                modifier.binding = Some(parse_paren_number(stream)?);
            }
            "@location" => {
                stream.advance();
                modifier.location = Some(parse_paren_number(stream)?);
            }
            "@workgroup_size" => {
                stream.advance();
                stream.expect("(")?;
                let mut sizes = vec![parse_number(stream)?];
                while stream.eat(",") {
                    if stream.check(")") {
                        break;
                    }
                    sizes.push(parse_number(stream)?);
                }
                stream.expect(")")?;
                modifier.workgroup_size = Some(sizes);
            }
            "@builtin" => {
                stream.advance();
                stream.expect("(")?;
                modifier.builtin = Some(stream.expect_name()?.to_string());
                stream.expect(")")?;
            }
            text => match ShaderStage::from_attribute(text) {
                Some(stage) => {
                    stream.advance();
                    modifier.stage = Some(stage);
                }
                None => break,
            },
        }
    }

    Ok(modifier)
}

fn parse_paren_number(stream: &mut TokenStream) -> Result<u32> {
    stream.expect("(")?;
    let value = parse_number(stream)?;
    stream.expect(")")?;
    Ok(value)
}

/// Consume a decimal number token as `u32`
pub fn parse_number(stream: &mut TokenStream) -> Result<u32> {
    if stream.kind() != TokenKind::Number {
        return Err(stream.error("a number"));
    }
    let token = stream.advance();
    token
        .text
        .parse()
        .map_err(|_| ParseError::invalid_number(&token.text, token))
}

/// Parse a type such as `f32`, `vec3<f32>`, `array<Particle, 64>` or a struct name
///
/// Attributes written before the type are kept in [`Type::modifier`].
pub fn parse_type(stream: &mut TokenStream) -> Result<Type> {
    let modifier = parse_modifiers(stream)?;
    let mut ty = parse_bare_type(stream)?;
    ty.modifier = modifier;
    Ok(ty)
}

fn parse_bare_type(stream: &mut TokenStream) -> Result<Type> {
    if stream.kind() != TokenKind::TypeName {
        return Err(stream.error("a type name"));
    }
    let name = stream.advance().text.clone();

    if !stream.eat("<") {
        return Ok(Type::scalar(name));
    }

    // Nested generics collapse into the primitive's name, e.g. `array<vec4<f32>>`
    let inner = parse_bare_type(stream)?;
    let mut ty = Type::aggregate(name, inner.to_string());
    while stream.eat(",") {
        if stream.kind() == TokenKind::Number {
            ty.length = Some(parse_number(stream)?);
        } else {
            // access mode such as `read_write`
            stream.expect_name()?;
        }
    }
    stream.expect(">")?;
    Ok(ty)
}

/// `name ":" Type`, with an optional leading attribute run
pub fn parse_typed_name(stream: &mut TokenStream) -> Result<Variable> {
    let modifier = parse_modifiers(stream)?;
    let name = stream.expect_name()?.to_string();
    stream.expect(":")?;
    let ty = parse_type(stream)?;
    Ok(Variable::new(name, ty).with_modifier(modifier))
}

/// `struct Name { member: Type, ... }`, starting at the `struct` keyword
pub fn parse_struct(stream: &mut TokenStream, modifier: Modifier) -> Result<Struct> {
    stream.expect("struct")?;
    let name = stream.expect_name()?.to_string();
    stream.expect("{")?;

    let mut members = Vec::new();
    while !stream.check("}") {
        members.push(parse_typed_name(stream)?);
        if !stream.eat(",") && !stream.eat(";") {
            break;
        }
    }
    stream.expect("}")?;
    stream.eat(";");

    tracing::debug!(name = %name, members = members.len(), "parsed struct");
    Ok(Struct {
        modifier,
        name,
        members,
    })
}

/// `fn name(args) [-> Type]`, starting at the `fn` keyword; stops before the body
pub fn parse_signature(stream: &mut TokenStream, modifier: Modifier) -> Result<Function> {
    stream.expect("fn")?;
    let name = stream.expect_name()?.to_string();

    stream.expect("(")?;
    let mut args = Vec::new();
    while !stream.check(")") {
        args.push(parse_typed_name(stream)?);
        if !stream.eat(",") {
            break;
        }
    }
    stream.expect(")")?;

    let return_type = if stream.eat("->") {
        Some(parse_type(stream)?)
    } else {
        None
    };

    Ok(Function {
        modifier,
        name,
        args,
        return_type,
    })
}

/// Skip a brace-delimited body by counting brace depth only
pub fn skip_body(stream: &mut TokenStream) -> Result<()> {
    stream.expect("{")?;
    let mut depth = 1usize;
    while depth > 0 {
        if stream.at_end() {
            return Err(stream.error("`}`"));
        }
        let token = stream.advance();
        if token.kind != TokenKind::Symbol {
            continue;
        }
        match token.text.as_str() {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

/// Consume and discard `<storage, read_write>`-style address space qualifiers
pub fn skip_var_qualifiers(stream: &mut TokenStream) -> Result<()> {
    if !stream.eat("<") {
        return Ok(());
    }
    loop {
        stream.expect_name()?;
        if !stream.eat(",") {
            break;
        }
    }
    stream.expect(">")?;
    Ok(())
}

/// `var<qualifiers> name [: Type] [= ...];`, starting at the `var` keyword
///
/// The initializer, if any, is skipped up to the terminating `;`.
pub fn parse_global_var(stream: &mut TokenStream, modifier: Modifier) -> Result<Variable> {
    stream.expect("var")?;
    skip_var_qualifiers(stream)?;
    let name = stream.expect_name()?.to_string();
    let ty = if stream.eat(":") {
        parse_type(stream)?
    } else {
        Type::inferred()
    };

    if stream.eat("=") {
        while !stream.check(";") {
            if stream.at_end() {
                return Err(stream.error("`;`"));
            }
            stream.advance();
        }
    }
    stream.expect(";")?;

    tracing::debug!(name = %name, "parsed global variable");
    Ok(Variable::new(name, ty).with_modifier(modifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::session::Session;

    fn with_stream<T>(source: &str, f: impl FnOnce(&mut TokenStream) -> T) -> T {
        let tokens = tokenize(source);
        let mut session = Session::new();
        session.register_struct_names(&tokens);
        let mut stream = TokenStream::new(&tokens, &session);
        f(&mut stream)
    }

    #[test]
    fn test_modifier_run() {
        let modifier = with_stream("@group(0) @binding(2) var", |s| {
            let m = parse_modifiers(s).unwrap();
            assert!(s.check("var"));
            m
        });
        assert_eq!(modifier.group, Some(0));
        assert_eq!(modifier.binding, Some(2));
        assert_eq!(modifier.location, None);
    }

    #[test]
    fn test_workgroup_size_and_stage() {
        let modifier = with_stream("@compute @workgroup_size(8, 8, 1) fn", |s| {
            parse_modifiers(s).unwrap()
        });
        assert_eq!(modifier.stage, Some(ShaderStage::Compute));
        assert_eq!(modifier.workgroup_size, Some(vec![8, 8, 1]));
    }

    #[test]
    fn test_unrecognized_attribute_ends_run() {
        with_stream("@location(1) @interpolate(flat)", |s| {
            let m = parse_modifiers(s).unwrap();
            assert_eq!(m.location, Some(1));
            assert_eq!(s.peek().text, "@interpolate");
        });
    }

    #[test]
    fn test_types() {
        let ty = with_stream("vec3<f32>", |s| parse_type(s).unwrap());
        assert_eq!(ty, Type::aggregate("vec3", "f32"));

        let ty = with_stream("array<vec4<f32>, 16>", |s| parse_type(s).unwrap());
        assert_eq!(ty.aggregate.as_deref(), Some("array"));
        assert_eq!(ty.primitive, "vec4<f32>");
        assert_eq!(ty.length, Some(16));

        let ty = with_stream("@builtin(position) vec4<f32>", |s| parse_type(s).unwrap());
        assert_eq!(ty.modifier.builtin.as_deref(), Some("position"));
    }

    #[test]
    fn test_type_requires_type_name() {
        let err = with_stream("velocity", |s| parse_type(s).unwrap_err());
        assert!(matches!(err, ParseError::Expected { .. }));
    }

    #[test]
    fn test_struct_name_usable_before_declaration() {
        with_stream("Light struct Light { a: f32 }", |s| {
            let ty = parse_type(s).unwrap();
            assert_eq!(ty.primitive, "Light");
            let light = parse_struct(s, Modifier::default()).unwrap();
            assert_eq!(light.members.len(), 1);
        });
    }

    #[test]
    fn test_skip_body_counts_braces() {
        with_stream("{ if (a) { b(); } { } } next", |s| {
            skip_body(s).unwrap();
            assert_eq!(s.peek().text, "next");
        });
        let err = with_stream("{ { }", |s| skip_body(s).unwrap_err());
        assert!(err.to_string().contains("end of text"));
    }

    #[test]
    fn test_invalid_number() {
        let err = with_stream("@location(99999999999)", |s| parse_modifiers(s).unwrap_err());
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }
}
