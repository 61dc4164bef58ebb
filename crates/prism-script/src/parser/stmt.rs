//! Statement grammar
//!
//! Dispatch is on the leading keyword; anything else must be an assignment
//! or a call, terminated by `;`.

use super::Parser;
use crate::ast::{DeclKind, Statement, StmtId, TermId};
use prism_shader::decl::{parse_type, skip_var_qualifiers};
use prism_shader::{Modifier, ParseError, Result, TokenKind, Type};

const ASSIGNMENT_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self) -> Result<StmtId> {
        let token = self.stream.peek();
        if token.kind == TokenKind::Reserved {
            match token.text.as_str() {
                "var" | "const" | "let" => {
                    return self.parse_variable_declaration(Modifier::default());
                }
                "return" => return self.parse_return(),
                "if" => return self.parse_if(),
                "while" => return self.parse_while(),
                "for" => return self.parse_for(),
                "parallel" => return self.parse_parallel(),
                _ => {}
            }
        }
        if self.stream.check("{") {
            return self.parse_block();
        }
        self.parse_expression_statement()
    }

    /// `{ statement* }`
    pub(super) fn parse_block(&mut self) -> Result<StmtId> {
        self.nested(|p| {
            p.stream.expect("{")?;
            let mut statements = Vec::new();
            while !p.stream.check("}") {
                if p.stream.at_end() {
                    return Err(p.stream.error("`}`"));
                }
                statements.push(p.parse_statement()?);
            }
            p.stream.expect("}")?;
            Ok(p.ast.add_statement(Statement::Block { statements }))
        })
    }

    /// `var|const|let [<qualifiers>] name [: Type] [= expr];`
    pub(super) fn parse_variable_declaration(&mut self, modifier: Modifier) -> Result<StmtId> {
        let keyword = self.stream.advance();
        let kind = DeclKind::from_keyword(&keyword.text)
            .ok_or_else(|| ParseError::expected("`var`, `const` or `let`", keyword))?;
        if kind == DeclKind::Var {
            skip_var_qualifiers(&mut self.stream)?;
        }

        let name = self.stream.expect_name()?.to_string();
        let ty = if self.stream.eat(":") {
            parse_type(&mut self.stream)?
        } else {
            Type::inferred()
        };
        let initializer = if self.stream.eat("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.stream.expect(";")?;

        tracing::trace!(name = %name, kind = kind.as_str(), "parsed variable declaration");
        Ok(self.ast.add_statement(Statement::VariableDeclaration {
            kind,
            modifier,
            name,
            ty,
            initializer,
        }))
    }

    fn parse_return(&mut self) -> Result<StmtId> {
        self.stream.expect("return")?;
        let value = if self.stream.check(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.stream.expect(";")?;
        Ok(self.ast.add_statement(Statement::Return { value }))
    }

    fn parse_condition(&mut self) -> Result<TermId> {
        self.stream.expect("(")?;
        let condition = self.parse_expression()?;
        self.stream.expect(")")?;
        Ok(condition)
    }

    /// `if (cond) block [else if ... | else block]`
    fn parse_if(&mut self) -> Result<StmtId> {
        self.stream.expect("if")?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let mut else_if = None;
        let mut else_block = None;
        if self.check_keyword("else") {
            self.stream.advance();
            if self.check_keyword("if") {
                else_if = Some(self.nested(|p| p.parse_if())?);
            } else {
                else_block = Some(self.parse_block()?);
            }
        }

        Ok(self.ast.add_statement(Statement::If {
            condition,
            then_block,
            else_if,
            else_block,
        }))
    }

    fn parse_while(&mut self) -> Result<StmtId> {
        self.stream.expect("while")?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(self.ast.add_statement(Statement::While { condition, body }))
    }

    /// `for ([init]; [cond]; [update]) block`
    fn parse_for(&mut self) -> Result<StmtId> {
        self.stream.expect("for")?;
        self.stream.expect("(")?;

        let init = if self.stream.eat(";") {
            None
        } else if self.stream.kind() == TokenKind::Reserved
            && self.stream.check_any(&["var", "const", "let"])
        {
            Some(self.parse_variable_declaration(Modifier::default())?)
        } else {
            Some(self.parse_expression_statement()?)
        };

        let condition = if self.stream.check(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.stream.expect(";")?;

        let update = if self.stream.check(")") {
            None
        } else {
            let term = self.parse_assignment_or_call()?;
            Some(self.ast.add_statement(Statement::Expression { term }))
        };
        self.stream.expect(")")?;

        let body = self.parse_block()?;
        Ok(self.ast.add_statement(Statement::For {
            init,
            condition,
            update,
            body,
        }))
    }

    /// `parallel { block block ... }`
    fn parse_parallel(&mut self) -> Result<StmtId> {
        self.stream.expect("parallel")?;
        self.stream.expect("{")?;
        let mut blocks = Vec::new();
        while !self.stream.check("}") {
            if !self.stream.check("{") {
                return Err(self.stream.error("a block"));
            }
            blocks.push(self.parse_block()?);
        }
        self.stream.expect("}")?;
        Ok(self.ast.add_statement(Statement::Parallel { blocks }))
    }

    fn parse_expression_statement(&mut self) -> Result<StmtId> {
        let term = self.parse_assignment_or_call()?;
        self.stream.expect(";")?;
        Ok(self.ast.add_statement(Statement::Expression { term }))
    }

    /// `target op= value`, or a bare call
    fn parse_assignment_or_call(&mut self) -> Result<TermId> {
        let start = self.stream.peek();
        let target = self.parse_primary()?;

        if self.stream.kind() == TokenKind::Symbol && self.stream.check_any(ASSIGNMENT_OPS) {
            let op = self.stream.advance();
            let value = self.parse_expression()?;
            return Ok(self.ast.app(&op.text, vec![target, value]));
        }
        if self.ast.is_call(target) {
            Ok(target)
        } else {
            Err(ParseError::not_a_statement(start))
        }
    }
}
