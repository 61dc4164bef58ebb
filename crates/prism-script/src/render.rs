//! Compact S-expression rendering of the AST
//!
//! Applications print as `(head arg ...)`. A coefficient of `-1` prints as a
//! leading `-`; any other non-unit coefficient prints as `n/d*`.
//!
//! Rendering walks an explicit work stack, so trees the parser builds without
//! recursion (long alternating operator chains, postfix chains) render without
//! recursion too.

use crate::ast::{Ast, Rational, Statement, StmtId, TermId, TermKind};
use std::fmt::Write;

/// Pending output, popped in order
enum Step {
    Term(TermId),
    Statement(StmtId),
    Text(&'static str),
}

impl Ast {
    pub fn render_term(&self, id: TermId) -> String {
        self.render(Step::Term(id))
    }

    pub fn render_statement(&self, id: StmtId) -> String {
        self.render(Step::Statement(id))
    }

    fn render(&self, root: Step) -> String {
        let mut out = String::new();
        let mut work = vec![root];
        while let Some(step) = work.pop() {
            match step {
                Step::Term(id) => self.write_term(&mut out, &mut work, id),
                Step::Statement(id) => self.write_statement(&mut out, &mut work, id),
                Step::Text(text) => out.push_str(text),
            }
        }
        out
    }

    fn write_term(&self, out: &mut String, work: &mut Vec<Step>, id: TermId) {
        let term = self.term(id);
        write_coefficient(out, term.coefficient);
        match &term.kind {
            TermKind::RefVar { name } => out.push_str(name),
            TermKind::ConstNum { value } => {
                let _ = write!(out, "{}", value);
            }
            TermKind::Str { text } => {
                let _ = write!(out, "{:?}", text);
            }
            TermKind::App { head, args } => {
                out.push('(');
                work.push(Step::Text(")"));
                for arg in args.iter().rev() {
                    work.push(Step::Term(*arg));
                    work.push(Step::Text(" "));
                }
                work.push(Step::Term(*head));
            }
        }
    }

    fn write_statement(&self, out: &mut String, work: &mut Vec<Step>, id: StmtId) {
        match self.statement(id) {
            Statement::VariableDeclaration {
                kind,
                name,
                ty,
                initializer,
                ..
            } => {
                let _ = write!(out, "({} {}: {}", kind.as_str(), name, ty);
                work.push(Step::Text(")"));
                if let Some(init) = initializer {
                    work.push(Step::Term(*init));
                    work.push(Step::Text(" "));
                }
            }
            Statement::Return { value } => {
                out.push_str("(return");
                work.push(Step::Text(")"));
                if let Some(value) = value {
                    work.push(Step::Term(*value));
                    work.push(Step::Text(" "));
                }
            }
            Statement::Block { statements } => {
                out.push_str("(block");
                push_statements(work, statements);
            }
            Statement::If {
                condition,
                then_block,
                else_if,
                else_block,
            } => {
                out.push_str("(if ");
                work.push(Step::Text(")"));
                if let Some(next) = else_if.or(*else_block) {
                    work.push(Step::Statement(next));
                    work.push(Step::Text(" "));
                }
                work.push(Step::Statement(*then_block));
                work.push(Step::Text(" "));
                work.push(Step::Term(*condition));
            }
            Statement::While { condition, body } => {
                out.push_str("(while ");
                work.push(Step::Text(")"));
                work.push(Step::Statement(*body));
                work.push(Step::Text(" "));
                work.push(Step::Term(*condition));
            }
            Statement::For {
                init,
                condition,
                update,
                body,
            } => {
                out.push_str("(for ");
                work.push(Step::Text(")"));
                work.push(Step::Statement(*body));
                work.push(Step::Text(" "));
                work.push(update.map_or(Step::Text("()"), Step::Statement));
                work.push(Step::Text(" "));
                work.push(condition.map_or(Step::Text("()"), Step::Term));
                work.push(Step::Text(" "));
                work.push(init.map_or(Step::Text("()"), Step::Statement));
            }
            Statement::Parallel { blocks } => {
                out.push_str("(parallel");
                push_statements(work, blocks);
            }
            Statement::Expression { term } => work.push(Step::Term(*term)),
        }
    }
}

/// Queue ` s1 s2 ...)` after an already written opening
fn push_statements(work: &mut Vec<Step>, statements: &[StmtId]) {
    work.push(Step::Text(")"));
    for s in statements.iter().rev() {
        work.push(Step::Statement(*s));
        work.push(Step::Text(" "));
    }
}

fn write_coefficient(out: &mut String, coefficient: Rational) {
    if coefficient.is_one() {
        return;
    }
    if coefficient.is_minus_one() {
        out.push('-');
    } else {
        let _ = write!(out, "{}*", coefficient);
    }
}
