//! Plain-text renderings for terminal output

use prism_script::{Declaration, SourceUnit};
use prism_shader::{Diagnostic, Module, TokenList, VertexBufferLayout};
use std::fmt::Write;

pub fn tokens_text(tokens: &TokenList) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(
            out,
            "{:>4}:{:<5} {:<13} {}",
            token.line,
            token.position,
            token.kind.to_string(),
            token.text
        );
    }
    out
}

pub fn module_text(module: &Module) -> String {
    let mut out = String::new();
    for s in &module.structs {
        let _ = writeln!(out, "{}", s);
    }
    for var in &module.vars {
        let _ = writeln!(out, "var {};", var);
    }
    for function in &module.fns {
        let _ = writeln!(out, "{}", function);
    }
    out
}

pub fn layouts_text(layouts: &[VertexBufferLayout]) -> String {
    let mut out = String::new();
    for (slot, layout) in layouts.iter().enumerate() {
        let _ = writeln!(
            out,
            "buffer {} ({}) stride {}",
            slot, layout.step_mode, layout.array_stride
        );
        for attribute in &layout.attributes {
            let _ = writeln!(
                out,
                "  @location({}) offset {} {}",
                attribute.shader_location, attribute.offset, attribute.format
            );
        }
    }
    out
}

pub fn unit_text(unit: &SourceUnit) -> String {
    let mut out = String::new();
    for s in &unit.structs {
        let _ = writeln!(out, "{}", s);
    }
    for declaration in &unit.declarations {
        match declaration {
            Declaration::Variable { statement } => {
                let _ = writeln!(out, "{}", unit.ast.render_statement(*statement));
            }
            Declaration::Function { signature, body } => {
                let _ = writeln!(out, "{}", signature);
                let _ = writeln!(out, "  {}", unit.ast.render_statement(*body));
            }
        }
    }
    out
}

pub fn diagnostics_text(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        let _ = writeln!(out, "line {}: {:?}: {}", d.line, d.severity, d.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_script::ScriptParser;
    use prism_shader::tokenize;

    #[test]
    fn test_layouts_text() {
        let module = Module::parse("fn main(pos: vec3<f32>, uv: vec2<f32>) {}").unwrap();
        let layouts = module
            .vertex_buffer_layouts("main", &Default::default())
            .unwrap();
        let text = layouts_text(&layouts);
        assert!(text.starts_with("buffer 0 (vertex) stride 20\n"));
        assert!(text.contains("@location(1) offset 12 float32x2"));
    }

    #[test]
    fn test_tokens_text_has_one_line_per_token() {
        let tokens = tokenize("var x;");
        assert_eq!(tokens_text(&tokens).lines().count(), tokens.len());
    }

    #[test]
    fn test_unit_text_renders_bodies() {
        let unit = ScriptParser::new()
            .parse("fn f(a: f32) -> f32 { return a * 2; }")
            .unwrap();
        let text = unit_text(&unit);
        assert!(text.contains("(block (return (* a 2)))"));
    }
}
