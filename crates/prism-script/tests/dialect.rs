//! Integration tests for full-body parsing of the scripting dialect

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use prism_script::{
    Declaration, ParserConfig, ScriptParser, Statement, TermKind, parse_source,
};
use prism_shader::{Lexer, ParseError, Session, TokenKind};

const PARTICLES: &str = r#"
struct Particle {
    position: vec3<f32>,
    velocity: vec3<f32>,
}

@group(0) @binding(0) var<storage, read_write> particles: array<Particle>;
const GRAVITY: f32 = -10;

@compute @workgroup_size(64)
fn step(@builtin(global_invocation_id) id: vec3u) {
    let i = id.x;
    if (i >= arrayLength(particles)) {
        return;
    }
    var p: Particle = particles[i];
    parallel {
        { p.velocity.y += GRAVITY / 60; }
        { p.position += p.velocity / 60; }
    }
    for (var k = 0; k < 4; k += 1) {
        p.position = clamp(p.position, vec3<f32>(-1, -1, -1), vec3<f32>(1, 1, 1));
    }
    while (p.position.y < 0 && p.velocity.y < 0) {
        p.velocity.y = -p.velocity.y / 2;
    }
    particles[i] = p;
}
"#;

#[test]
fn parses_particle_kernel() {
    let unit = ScriptParser::new().parse(PARTICLES).expect("kernel should parse");

    assert_eq!(unit.structs.len(), 1);
    assert_eq!(unit.declarations.len(), 3);
    assert!(matches!(unit.declarations[0], Declaration::Variable { .. }));

    let (signature, body) = unit.function("step").unwrap();
    assert_eq!(signature.modifier.workgroup_size, Some(vec![64]));

    let Statement::Block { statements } = unit.ast.statement(body) else {
        panic!("function body should be a block");
    };
    assert_eq!(statements.len(), 7);
    assert!(matches!(
        unit.ast.statement(statements[3]),
        Statement::Parallel { blocks } if blocks.len() == 2
    ));
    assert_eq!(
        unit.ast.render_statement(statements[6]),
        "(= ([] particles i) p)"
    );
}

#[test]
fn global_declarations_keep_modifiers_and_types() {
    let unit = ScriptParser::new().parse(PARTICLES).unwrap();

    let Declaration::Variable { statement } = unit.declarations[0] else {
        panic!("expected a variable");
    };
    let Statement::VariableDeclaration { modifier, ty, .. } = unit.ast.statement(statement) else {
        panic!("expected a declaration statement");
    };
    assert_eq!(modifier.binding, Some(0));
    assert_eq!(ty.to_string(), "array<Particle>");

    let Declaration::Variable { statement } = unit.declarations[1] else {
        panic!("expected a constant");
    };
    assert_eq!(
        unit.ast.render_statement(statement),
        "(const GRAVITY: f32 -10)"
    );
}

#[test]
fn struct_used_before_declaration() {
    let source = "fn f() { var l: Light; } struct Light { c: f32 }";
    let mut session = Session::new();
    let tokens = Lexer::new(&mut session).tokenize(source);
    let unit = parse_source(&tokens, &mut session).unwrap();

    assert_eq!(unit.structs[0].name, "Light");
    assert_eq!(tokens[8].text, "Light");
    assert_eq!(tokens[8].kind, TokenKind::Identifier);
    let (_, body) = unit.function("f").unwrap();
    assert_eq!(unit.ast.render_statement(body), "(block (var l: Light))");
}

#[test]
fn every_term_has_its_owner() {
    let unit = ScriptParser::new().parse(PARTICLES).unwrap();
    let ast = &unit.ast;

    for (id, term) in ast.terms().iter() {
        if let TermKind::App { head, args } = &term.kind {
            assert_eq!(ast.term(*head).owner, Some(id));
            for arg in args {
                assert_eq!(ast.term(*arg).owner, Some(id));
            }
        }
    }
}

#[test]
fn rejects_unknown_top_level() {
    let err = ScriptParser::new().parse("return 1;").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedDeclaration { .. }));

    let err = ScriptParser::new().parse("fn f() { 1 + 2; }").unwrap_err();
    assert!(matches!(err, ParseError::NotAStatement { .. }));
}

#[test]
fn depth_limit_is_configurable() {
    let nested = format!("fn f() {{ x = {}1{}; }}", "(".repeat(50), ")".repeat(50));

    assert!(ScriptParser::new().parse(&nested).is_ok());

    let strict = ScriptParser::with_config(ParserConfig::with_max_depth(20));
    let err = strict.parse(&nested).unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { limit: 20, .. }));
}

#[test]
fn source_unit_serializes() {
    let unit = ScriptParser::new()
        .parse("fn main() { return a + b - c; }")
        .unwrap();
    let json = serde_json::to_value(&unit).unwrap();

    assert_eq!(json["declarations"][0]["declaration"], "function");
    assert_eq!(json["declarations"][0]["signature"]["name"], "main");
    let terms = json["ast"]["terms"].as_array().unwrap();
    assert!(terms.iter().any(|t| t["kind"] == "app"));
    assert!(
        terms
            .iter()
            .any(|t| t["kind"] == "ref-var" && t["coefficient"]["numerator"] == -1)
    );
}
