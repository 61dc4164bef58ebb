//! Expression grammar
//!
//! Binary levels, loosest first:
//!
//! | level          | operators                                      | chained |
//! |----------------|------------------------------------------------|---------|
//! | logical        | `=>` `⇔`                                       | no      |
//! | or             | `\|\|`                                         | yes     |
//! | and            | `&&`                                           | yes     |
//! | relational     | `==` `=` `!=` `<` `>` `<=` `>=` `in` `notin` `subset` | yes |
//! | additive       | `+` `-`                                        | yes     |
//! | multiplicative | `*`                                            | yes     |
//! | div/mod        | `/` `%`                                        | yes     |
//!
//! A chained operator keeps appending operands to one application while the
//! same operator repeats, so `1 < 2 < 3` is a single `<` node with three
//! arguments. Binary `-` is an additive `+` whose right operand has its
//! coefficient negated. These levels run on an explicit stack of open
//! applications rather than one recursive call per level.

use super::Parser;
use crate::ast::{TermId, TermKind, head};
use prism_shader::{ParseError, Result, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Logical,
    Or,
    And,
    Relational,
    Additive,
    Multiplicative,
    DivMod,
}

impl Level {
    fn chains(self) -> bool {
        self != Level::Logical
    }
}

/// Binary operator: precedence level, head text, and whether the right
/// operand is negated
fn binary_operator(kind: TokenKind, text: &str) -> Option<(Level, &'static str, bool)> {
    if !matches!(kind, TokenKind::Symbol | TokenKind::Reserved) {
        return None;
    }
    let op = match text {
        "=>" => (Level::Logical, "=>", false),
        "⇔" => (Level::Logical, "⇔", false),
        "||" => (Level::Or, "||", false),
        "&&" => (Level::And, "&&", false),
        "==" => (Level::Relational, "==", false),
        "=" => (Level::Relational, "=", false),
        "!=" => (Level::Relational, "!=", false),
        "<" => (Level::Relational, "<", false),
        ">" => (Level::Relational, ">", false),
        "<=" => (Level::Relational, "<=", false),
        ">=" => (Level::Relational, ">=", false),
        "in" => (Level::Relational, "in", false),
        "notin" => (Level::Relational, "notin", false),
        "subset" => (Level::Relational, "subset", false),
        "+" => (Level::Additive, "+", false),
        "-" => (Level::Additive, "+", true),
        "*" => (Level::Multiplicative, "*", false),
        "/" => (Level::DivMod, "/", false),
        "%" => (Level::DivMod, "%", false),
        _ => return None,
    };
    Some(op)
}

/// Operand waiting to be attached, with a sign still to apply
#[derive(Clone, Copy)]
struct Operand {
    term: TermId,
    negate: bool,
}

/// Application still accepting operands
struct Open {
    level: Level,
    op: &'static str,
    app: TermId,
    /// Sign the finished application carries into its parent
    negate: bool,
}

/// Tokens that may appear inside a generic argument list
fn is_type_like(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::TypeName | TokenKind::Number
    )
}

const GENERIC_LOOKAHEAD: usize = 64;

impl Parser<'_> {
    /// Full expression, starting at the loosest level
    pub(super) fn parse_expression(&mut self) -> Result<TermId> {
        self.nested(|p| p.parse_binary(Level::Logical))
    }

    fn parse_binary(&mut self, min: Level) -> Result<TermId> {
        let mut stack: Vec<Open> = Vec::new();
        let mut operand = Operand {
            term: self.parse_unary()?,
            negate: false,
        };

        loop {
            let token = self.stream.peek();
            let Some((level, op, negate_next)) = binary_operator(token.kind, &token.text) else {
                break;
            };
            if level < min {
                break;
            }
            self.stream.advance();

            while stack.last().is_some_and(|top| top.level > level) {
                if let Some(top) = stack.pop() {
                    operand = self.close(top, operand);
                }
            }

            match stack.last().map(|top| (top.level, top.op, top.app)) {
                Some((open_level, open_op, app))
                    if open_level == level && open_op == op && level.chains() =>
                {
                    self.attach(app, operand);
                }
                Some((open_level, ..)) if open_level == level => {
                    if let Some(top) = stack.pop() {
                        operand = self.close(top, operand);
                    }
                    stack.push(self.open(level, op, operand));
                }
                _ => stack.push(self.open(level, op, operand)),
            }

            operand = Operand {
                term: self.parse_unary()?,
                negate: negate_next,
            };
        }

        while let Some(top) = stack.pop() {
            operand = self.close(top, operand);
        }
        Ok(self.apply_sign(operand))
    }

    fn open(&mut self, level: Level, op: &'static str, first: Operand) -> Open {
        let app = self.ast.app(op, vec![first.term]);
        Open {
            level,
            op,
            app,
            negate: first.negate,
        }
    }

    fn close(&mut self, open: Open, last: Operand) -> Operand {
        self.attach(open.app, last);
        Operand {
            term: open.app,
            negate: open.negate,
        }
    }

    fn attach(&mut self, app: TermId, operand: Operand) {
        let term = self.apply_sign(operand);
        self.ast.push_arg(app, term);
    }

    fn apply_sign(&mut self, operand: Operand) -> TermId {
        if operand.negate {
            self.ast.negate(operand.term);
        }
        operand.term
    }

    /// Leading `-` signs fold into the operand's coefficient
    fn parse_unary(&mut self) -> Result<TermId> {
        let mut negative = false;
        while self.stream.kind() == TokenKind::Symbol && self.stream.check("-") {
            self.stream.advance();
            negative = !negative;
        }
        let term = self.parse_power()?;
        if negative {
            self.ast.negate(term);
        }
        Ok(term)
    }

    /// `base ^ exponent`, right-associative
    fn parse_power(&mut self) -> Result<TermId> {
        let base = self.parse_primary()?;
        if self.stream.kind() != TokenKind::Symbol || !self.stream.eat("^") {
            return Ok(base);
        }
        let exponent = self.nested(|p| p.parse_unary())?;
        Ok(self.ast.app("^", vec![base, exponent]))
    }

    pub(super) fn parse_primary(&mut self) -> Result<TermId> {
        let token = self.stream.peek();
        match self.stream.kind() {
            kind @ (TokenKind::Identifier | TokenKind::TypeName) => {
                self.stream.advance();
                let name = self.ast.ref_var(token.text.as_str());
                self.parse_postfix(name, Some(kind))
            }
            TokenKind::Number => {
                self.stream.advance();
                let value = token
                    .text
                    .parse()
                    .map_err(|_| ParseError::invalid_number(&token.text, token))?;
                Ok(self.ast.leaf(TermKind::ConstNum { value }))
            }
            TokenKind::String => {
                self.stream.advance();
                Ok(self.ast.leaf(TermKind::Str {
                    text: token.text.clone(),
                }))
            }
            TokenKind::Symbol => match token.text.as_str() {
                "#" => self.parse_hex(),
                "(" => self.parse_parenthesized(),
                "[" => {
                    let items = self.parse_list("[", "]")?;
                    let array = self.ast.app(head::ARRAY, items);
                    self.parse_postfix(array, None)
                }
                "{" => self.parse_object(),
                _ => Err(self.stream.error("an expression")),
            },
            _ => Err(self.stream.error("an expression")),
        }
    }

    /// Call, index, member and generic suffixes
    ///
    /// `name_kind` is set when `target` is a bare name, the only place a
    /// generic argument list may follow.
    fn parse_postfix(&mut self, mut target: TermId, name_kind: Option<TokenKind>) -> Result<TermId> {
        let mut generic_allowed = name_kind;
        loop {
            if self.stream.kind() != TokenKind::Symbol {
                break;
            }
            if self.stream.check("(") {
                let args = self.parse_list("(", ")")?;
                target = self.ast.app(head::CALL, prepend(target, args));
            } else if self.stream.eat("[") {
                let index = self.parse_expression()?;
                self.stream.expect("]")?;
                target = self.ast.app(head::INDEX, vec![target, index]);
            } else if self.stream.eat(".") {
                let field = self.stream.expect_name()?;
                let field = self.ast.ref_var(field);
                target = self.ast.app(head::MEMBER, vec![target, field]);
            } else if self.stream.check("<")
                && generic_allowed.is_some_and(|kind| self.opens_generic(kind))
            {
                let args = self.parse_generic_args()?;
                target = self.ast.app(head::GENERIC, prepend(target, args));
            } else {
                break;
            }
            generic_allowed = None;
        }
        Ok(target)
    }

    /// Decide whether the `<` at the cursor opens a generic argument list
    ///
    /// Always after a type name. After a plain identifier only when a
    /// balanced `<...>` of type-like tokens is directly followed by `(`,
    /// as in `bitcast<u32>(x)`. That shape wins over relational chaining:
    /// `a < b > (c)` is the generic call `(() (<> a b) c)`, never
    /// `(> (< a b) c)`. Space the operands differently, e.g. `a < b > c`,
    /// to get the comparison.
    fn opens_generic(&self, name_kind: TokenKind) -> bool {
        if name_kind == TokenKind::TypeName {
            return true;
        }
        let mut depth = 0usize;
        for n in 0..GENERIC_LOOKAHEAD {
            let token = self.stream.peek_nth(n);
            match self.stream.kind_nth(n) {
                TokenKind::Symbol => match token.text.as_str() {
                    "<" => depth += 1,
                    ">" => {
                        depth -= 1;
                        if depth == 0 {
                            return self.stream.peek_nth(n + 1).is("(");
                        }
                    }
                    "," => {}
                    _ => return false,
                },
                kind if is_type_like(kind) => {}
                _ => return false,
            }
        }
        false
    }

    fn parse_generic_args(&mut self) -> Result<Vec<TermId>> {
        self.stream.expect("<")?;
        let mut args = Vec::new();
        loop {
            args.push(self.nested(|p| p.parse_binary(Level::Additive))?);
            if !self.stream.eat(",") {
                break;
            }
        }
        self.stream.expect(">")?;
        Ok(args)
    }

    /// `open expr, expr, ... close`, trailing comma allowed
    fn parse_list(&mut self, open: &str, close: &str) -> Result<Vec<TermId>> {
        self.stream.expect(open)?;
        let mut items = Vec::new();
        while !self.stream.check(close) {
            items.push(self.parse_expression()?);
            if !self.stream.eat(",") {
                break;
            }
        }
        self.stream.expect(close)?;
        Ok(items)
    }

    /// Grouping, tuple, or arrow-function literal
    fn parse_parenthesized(&mut self) -> Result<TermId> {
        self.stream.expect("(")?;
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while !self.stream.check(")") {
            items.push(self.parse_expression()?);
            trailing_comma = self.stream.eat(",");
            if !trailing_comma {
                break;
            }
        }
        self.stream.expect(")")?;

        if self.stream.eat("=>") {
            // The body is checked for syntax only
            if self.stream.check("{") {
                self.parse_block()?;
            } else {
                self.parse_expression()?;
            }
            return Ok(self.ast.ref_var(head::LAMBDA));
        }

        let term = match items.as_slice() {
            [single] if !trailing_comma => *single,
            _ => self.ast.app(head::TUPLE, items),
        };
        self.parse_postfix(term, None)
    }

    /// `{ name, name: value, ... }`
    fn parse_object(&mut self) -> Result<TermId> {
        self.stream.expect("{")?;
        let mut fields = Vec::new();
        while !self.stream.check("}") {
            let name = self.stream.expect_name()?;
            let mut field = self.ast.ref_var(name);
            if self.stream.eat(":") {
                let value = self.parse_expression()?;
                field = self.ast.app(head::FIELD, vec![field, value]);
            }
            fields.push(field);
            if !self.stream.eat(",") {
                break;
            }
        }
        self.stream.expect("}")?;
        Ok(self.ast.app(head::OBJECT, fields))
    }

    /// `#` followed by adjacent digits and letters, read as base 16
    fn parse_hex(&mut self) -> Result<TermId> {
        let hash = self.stream.advance();
        let mut digits = String::new();
        let mut end = hash.position + 1;
        loop {
            let token = self.stream.peek();
            let adjacent = token.position == end && !token.is_end();
            if !adjacent || !is_type_like(token.kind) {
                break;
            }
            digits.push_str(&token.text);
            end += token.text.chars().count();
            self.stream.advance();
        }

        let text = format!("#{}", digits);
        if digits.is_empty() {
            return Err(ParseError::invalid_number(text, hash));
        }
        let value =
            i64::from_str_radix(&digits, 16).map_err(|_| ParseError::invalid_number(&text, hash))?;
        Ok(self.ast.leaf(TermKind::ConstNum { value }))
    }
}

fn prepend(first: TermId, rest: Vec<TermId>) -> Vec<TermId> {
    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    all
}

#[cfg(test)]
mod tests {
    use crate::ast::{Ast, TermId, TermKind};
    use crate::config::ParserConfig;
    use crate::parser::parse_expression;
    use prism_shader::{ParseError, Session, tokenize};

    fn parse(source: &str) -> (Ast, TermId) {
        let tokens = tokenize(source);
        parse_expression(&tokens, &mut Session::new(), &ParserConfig::default())
            .unwrap_or_else(|e| panic!("{source:?}: {e}"))
    }

    fn render(source: &str) -> String {
        let (ast, root) = parse(source);
        ast.render_term(root)
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = tokenize(source);
        parse_expression(&tokens, &mut Session::new(), &ParserConfig::default()).unwrap_err()
    }

    #[test]
    fn test_additive_chain_negates_operand() {
        let (ast, root) = parse("a + b - c");
        assert_eq!(ast.head_name(root), Some("+"));
        let args = ast.args(root);
        assert_eq!(args.len(), 3);
        assert!(ast.term(args[0]).coefficient.is_one());
        assert!(ast.term(args[2]).coefficient.is_minus_one());
        assert_eq!(ast.render_term(root), "(+ a b -c)");
    }

    #[test]
    fn test_relational_chain_flattens() {
        let (ast, root) = parse("1 < 2 < 3");
        assert_eq!(ast.head_name(root), Some("<"));
        assert_eq!(ast.args(root).len(), 3);
    }

    #[test]
    fn test_different_operator_same_level_nests() {
        assert_eq!(render("a < b > c"), "(> (< a b) c)");
        assert_eq!(render("a / b % c"), "(% (/ a b) c)");
    }

    #[test]
    fn test_precedence_levels() {
        assert_eq!(render("a + b * c"), "(+ a (* b c))");
        assert_eq!(render("a * b + c"), "(+ (* a b) c)");
        assert_eq!(render("a - b * c"), "(+ a -(* b c))");
        assert_eq!(render("a * b / c"), "(* a (/ b c))");
        assert_eq!(render("a || b && c || d"), "(|| a (&& b c) d)");
        assert_eq!(render("x in s && y notin s"), "(&& (in x s) (notin y s))");
        assert_eq!(render("a - b < c * d - e"), "(< (+ a -b) (+ (* c d) -e))");
    }

    #[test]
    fn test_logical_is_not_chained() {
        assert_eq!(render("a => b => c"), "(=> (=> a b) c)");
        assert_eq!(render("p ⇔ q"), "(⇔ p q)");
    }

    #[test]
    fn test_unary_minus_folds() {
        assert_eq!(render("-x"), "-x");
        assert_eq!(render("--x"), "x");
        assert_eq!(render("a - -b"), "(+ a b)");
        assert_eq!(render("-(a + b)"), "-(+ a b)");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(render("a ^ b ^ c"), "(^ a (^ b c))");
        assert_eq!(render("2 * a ^ 2"), "(* 2 (^ a 2))");
        assert_eq!(render("a ^ -b"), "(^ a -b)");
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(render("f(x, 1)"), "(() f x 1)");
        assert_eq!(render("a.b[0].c"), "(. ([] (. a b) 0) c)");
        assert_eq!(render("g()(y)"), "(() (() g) y)");
    }

    #[test]
    fn test_generic_after_type_name() {
        assert_eq!(render("vec3<f32>(1, 2, 3)"), "(() (<> vec3 f32) 1 2 3)");
        assert_eq!(render("array<vec4<f32>, 4>"), "(<> array (<> vec4 f32) 4)");
    }

    #[test]
    fn test_generic_after_identifier_needs_call() {
        assert_eq!(render("bitcast<u32>(x)"), "(() (<> bitcast u32) x)");
        assert_eq!(render("a < b"), "(< a b)");
        assert_eq!(render("a < b > (c)"), "(() (<> a b) c)");
        assert_eq!(render("a < b + 1"), "(< a (+ b 1))");
    }

    #[test]
    fn test_literals() {
        assert_eq!(render("#ff"), "255");
        assert_eq!(render("#1a2b"), "6699");
        assert_eq!(render("\"text\""), "\"text\"");
        assert_eq!(render("[1, 2, 3]"), "(array 1 2 3)");
        assert_eq!(render("{ x, y: 2 }"), "(object x (: y 2))");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(parse_err("#zz"), ParseError::InvalidNumber { .. }));
        assert!(matches!(parse_err("# 1"), ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_parenthesized_forms() {
        assert_eq!(render("(a + b) * c"), "(* (+ a b) c)");
        assert_eq!(render("(a, b)"), "(tuple a b)");
        assert_eq!(render("(a,)"), "(tuple a)");
        assert_eq!(render("()"), "(tuple)");
    }

    #[test]
    fn test_arrow_function_is_placeholder() {
        let (ast, root) = parse("(x, y) => x + y");
        assert!(matches!(&ast.term(root).kind, TermKind::RefVar { name } if name == "<lambda>"));
        assert_eq!(render("map(xs, (x) => { return x * 2; })"), "(() map xs <lambda>)");
    }

    #[test]
    fn test_owner_references() {
        let (ast, root) = parse("f(a) + b");
        assert_eq!(ast.term(root).owner, None);
        for &arg in ast.args(root) {
            assert_eq!(ast.term(arg).owner, Some(root));
        }
        let call = ast.args(root)[0];
        let TermKind::App { head, ref args } = ast.term(call).kind else {
            panic!("expected a call");
        };
        assert_eq!(ast.term(head).owner, Some(call));
        assert!(args.iter().all(|&a| ast.term(a).owner == Some(call)));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_err("a +"), ParseError::Expected { .. }));
        assert!(matches!(parse_err("f(a"), ParseError::Expected { .. }));
        assert!(parse_err("a b").to_string().contains("expected end of text"));
        assert!(matches!(parse_err("99999999999999999999"), ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let config = ParserConfig::with_max_depth(16);
        let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        let tokens = tokenize(&source);
        let err = parse_expression(&tokens, &mut Session::new(), &config).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { limit: 16, .. }));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let tokens = tokenize(&shallow);
        assert!(parse_expression(&tokens, &mut Session::new(), &config).is_ok());
    }

    #[test]
    fn test_long_flat_chain_does_not_recurse() {
        let source = vec!["x"; 5000].join(" + ");
        let (ast, root) = parse(&source);
        assert_eq!(ast.args(root).len(), 5000);
    }

    #[test]
    fn test_alternating_chain_renders_without_recursion() {
        let mut source = String::from("a");
        for i in 1..=100_000 {
            source.push_str(if i % 2 == 1 { " < a" } else { " > a" });
        }
        let (ast, root) = parse(&source);
        assert_eq!(ast.terms().len(), 300_001);

        let rendered = ast.render_term(root);
        assert!(rendered.starts_with("(> (< (> "));
        assert!(rendered.ends_with(" a) a) a)"));
        assert_eq!(rendered.matches('(').count(), 100_000);
    }

    #[test]
    fn test_long_postfix_chain_renders() {
        let source = format!("a{}", ".b".repeat(50_000));
        let rendered = render(&source);
        assert!(rendered.starts_with("(. (. "));
        assert_eq!(rendered.matches('(').count(), 50_000);

        let source = format!("f{}", "()".repeat(50_000));
        let rendered = render(&source);
        assert!(rendered.starts_with("(() (() "));
        assert!(rendered.ends_with("f)))"));
    }

    #[test]
    fn test_generic_type_followed_by_equals() {
        assert_eq!(render("vec3<f32>= v"), "(= (<> vec3 f32) v)");
        assert_eq!(render("a >= b"), "(>= a b)");
    }
}
