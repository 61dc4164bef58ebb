//! Arena AST for the scripting dialect
//!
//! Every expression node is a [`Term`] stored in [`Ast::terms`]; statements
//! live in [`Ast::statements`]. Children are referenced by handle and each
//! term records the application that owns it, so there are no reference
//! cycles to manage.

use crate::arena::{Arena, Handle};
use prism_shader::{Function, Modifier, Struct, Type};
use serde::Serialize;
use std::fmt;

pub type TermId = Handle<Term>;
pub type StmtId = Handle<Statement>;

/// Operator heads used for non-arithmetic applications
pub mod head {
    pub const CALL: &str = "()";
    pub const INDEX: &str = "[]";
    pub const MEMBER: &str = ".";
    pub const GENERIC: &str = "<>";
    pub const TUPLE: &str = "tuple";
    pub const ARRAY: &str = "array";
    pub const OBJECT: &str = "object";
    /// Annotated object-literal field, `name: value`
    pub const FIELD: &str = ":";
    /// Stands in for an arrow-function literal; its body is not kept
    pub const LAMBDA: &str = "<lambda>";
}

/// Coefficient carried by every term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    #[must_use]
    pub fn negated(self) -> Self {
        Self::new(-self.numerator, self.denominator)
    }

    pub fn is_one(self) -> bool {
        self.numerator == self.denominator
    }

    pub fn is_minus_one(self) -> bool {
        self.numerator == -self.denominator
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TermKind {
    RefVar { name: String },
    ConstNum { value: i64 },
    Str { text: String },
    App { head: TermId, args: Vec<TermId> },
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    #[serde(flatten)]
    pub kind: TermKind,
    pub coefficient: Rational,
    /// The application this term is the head or an argument of
    pub owner: Option<TermId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Var,
    Const,
    Let,
}

impl DeclKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "var" => Some(Self::Var),
            "const" => Some(Self::Const),
            "let" => Some(Self::Let),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Const => "const",
            Self::Let => "let",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "statement", rename_all = "kebab-case")]
pub enum Statement {
    VariableDeclaration {
        kind: DeclKind,
        #[serde(skip_serializing_if = "Modifier::is_empty")]
        modifier: Modifier,
        name: String,
        /// [`Type::inferred`] when no annotation was written
        #[serde(rename = "type")]
        ty: Type,
        initializer: Option<TermId>,
    },
    Return {
        value: Option<TermId>,
    },
    Block {
        statements: Vec<StmtId>,
    },
    If {
        condition: TermId,
        then_block: StmtId,
        /// A nested `If` statement
        else_if: Option<StmtId>,
        else_block: Option<StmtId>,
    },
    While {
        condition: TermId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        condition: Option<TermId>,
        update: Option<StmtId>,
        body: StmtId,
    },
    /// Blocks meant to run concurrently; purely a syntactic grouping
    Parallel {
        blocks: Vec<StmtId>,
    },
    /// Assignment or call
    Expression {
        term: TermId,
    },
}

/// Top-level declaration of a source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "declaration", rename_all = "kebab-case")]
pub enum Declaration {
    Variable { statement: StmtId },
    Function { signature: Function, body: StmtId },
}

/// Storage for all terms and statements produced by one parse
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    terms: Arena<Term>,
    statements: Arena<Statement>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id]
    }

    pub fn statement(&self, id: StmtId) -> &Statement {
        &self.statements[id]
    }

    pub fn terms(&self) -> &Arena<Term> {
        &self.terms
    }

    pub fn statements(&self) -> &Arena<Statement> {
        &self.statements
    }

    /// Head name of an application whose head is a plain reference
    pub fn head_name(&self, id: TermId) -> Option<&str> {
        match &self.term(id).kind {
            TermKind::App { head, .. } => match &self.term(*head).kind {
                TermKind::RefVar { name } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Arguments of an application; empty for leaves
    pub fn args(&self, id: TermId) -> &[TermId] {
        match &self.term(id).kind {
            TermKind::App { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_call(&self, id: TermId) -> bool {
        self.head_name(id) == Some(head::CALL)
    }

    pub(crate) fn leaf(&mut self, kind: TermKind) -> TermId {
        self.terms.append(Term {
            kind,
            coefficient: Rational::ONE,
            owner: None,
        })
    }

    pub(crate) fn ref_var(&mut self, name: impl Into<String>) -> TermId {
        self.leaf(TermKind::RefVar { name: name.into() })
    }

    /// New application of `op`; head and arguments get their owner set
    pub(crate) fn app(&mut self, op: &str, args: Vec<TermId>) -> TermId {
        let head = self.ref_var(op);
        let id = self.terms.append(Term {
            kind: TermKind::App {
                head,
                args: Vec::new(),
            },
            coefficient: Rational::ONE,
            owner: None,
        });
        self.set_owner(head, id);
        for arg in args {
            self.push_arg(id, arg);
        }
        id
    }

    pub(crate) fn push_arg(&mut self, app: TermId, arg: TermId) {
        self.set_owner(arg, app);
        if let Some(Term {
            kind: TermKind::App { args, .. },
            ..
        }) = self.terms.get_mut(app)
        {
            args.push(arg);
        }
    }

    pub(crate) fn negate(&mut self, id: TermId) {
        if let Some(term) = self.terms.get_mut(id) {
            term.coefficient = term.coefficient.negated();
        }
    }

    pub(crate) fn add_statement(&mut self, statement: Statement) -> StmtId {
        self.statements.append(statement)
    }

    fn set_owner(&mut self, id: TermId, owner: TermId) {
        if let Some(term) = self.terms.get_mut(id) {
            term.owner = Some(owner);
        }
    }
}

/// Everything `parse_source` produces for one source unit
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceUnit {
    pub structs: Vec<Struct>,
    pub declarations: Vec<Declaration>,
    pub ast: Ast,
}

impl SourceUnit {
    pub fn function(&self, name: &str) -> Option<(&Function, StmtId)> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Function { signature, body } if signature.name == name => {
                Some((signature, *body))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_sets_owners() {
        let mut ast = Ast::new();
        let a = ast.ref_var("a");
        let b = ast.ref_var("b");
        let sum = ast.app("+", vec![a, b]);

        assert_eq!(ast.term(a).owner, Some(sum));
        assert_eq!(ast.term(b).owner, Some(sum));
        let TermKind::App { head, .. } = ast.term(sum).kind else {
            panic!("expected an application");
        };
        assert_eq!(ast.term(head).owner, Some(sum));
        assert_eq!(ast.head_name(sum), Some("+"));
        assert_eq!(ast.args(sum), &[a, b]);
        assert_eq!(ast.term(sum).owner, None);
    }

    #[test]
    fn test_negate_flips_coefficient() {
        let mut ast = Ast::new();
        let x = ast.ref_var("x");
        ast.negate(x);
        assert!(ast.term(x).coefficient.is_minus_one());
        ast.negate(x);
        assert!(ast.term(x).coefficient.is_one());
    }

    #[test]
    fn test_rational_display() {
        assert_eq!(Rational::ONE.to_string(), "1");
        assert_eq!(Rational::new(-3, 4).to_string(), "-3/4");
    }

    #[test]
    fn test_term_serializes_with_kind_tag() {
        let mut ast = Ast::new();
        let n = ast.leaf(TermKind::ConstNum { value: 7 });
        let json = serde_json::to_value(ast.term(n)).unwrap();
        assert_eq!(json["kind"], "const-num");
        assert_eq!(json["value"], 7);
        assert_eq!(json["coefficient"]["numerator"], 1);
    }
}
