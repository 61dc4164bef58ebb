//! Convenience front door: tokenize and parse in a fresh session

use crate::ast::{Ast, SourceUnit, StmtId, TermId};
use crate::config::ParserConfig;
use crate::error::ScriptError;
use crate::parser;
use prism_shader::{Diagnostic, Lexer, Result, Session};
use serde::Serialize;
use std::path::Path;

/// A parsed standalone expression
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionTree {
    pub ast: Ast,
    pub root: TermId,
}

impl ExpressionTree {
    pub fn render(&self) -> String {
        self.ast.render_term(self.root)
    }
}

/// A parsed run of statements
#[derive(Debug, Clone, Serialize)]
pub struct StatementList {
    pub ast: Ast,
    pub statements: Vec<StmtId>,
}

impl StatementList {
    /// One rendered line per statement
    pub fn render(&self) -> Vec<String> {
        self.statements
            .iter()
            .map(|&s| self.ast.render_statement(s))
            .collect()
    }
}

/// Parser front end carrying a [`ParserConfig`]
///
/// Every call gets its own [`Session`], so no state leaks between sources.
#[derive(Debug, Clone, Default)]
pub struct ScriptParser {
    config: ParserConfig,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a whole source unit
    pub fn parse(&self, source: &str) -> Result<SourceUnit> {
        self.parse_with_diagnostics(source).0
    }

    /// Parse a whole source unit and also return the session's diagnostics
    pub fn parse_with_diagnostics(&self, source: &str) -> (Result<SourceUnit>, Vec<Diagnostic>) {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize(source);
        let result = parser::parse_source_with(&tokens, &mut session, &self.config);
        (result, session.diagnostics().to_vec())
    }

    pub fn parse_file(&self, path: &Path) -> std::result::Result<SourceUnit, ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&source).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_expression(&self, source: &str) -> Result<ExpressionTree> {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize(source);
        let (ast, root) = parser::parse_expression(&tokens, &mut session, &self.config)?;
        Ok(ExpressionTree { ast, root })
    }

    pub fn parse_statements(&self, source: &str) -> Result<StatementList> {
        let mut session = Session::new();
        let tokens = Lexer::new(&mut session).tokenize(source);
        let (ast, statements) = parser::parse_statements(&tokens, &mut session, &self.config)?;
        Ok(StatementList { ast, statements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_expression_render() {
        let tree = ScriptParser::new().parse_expression("a + b - c").unwrap();
        assert_eq!(tree.render(), "(+ a b -c)");
    }

    #[test]
    fn test_sessions_are_independent() {
        let parser = ScriptParser::new();
        let (_, first) = parser.parse_with_diagnostics("fn f() { x = 1 ~ 2; }");
        let (_, second) = parser.parse_with_diagnostics("fn g() { y = 2 ~ 3; }");
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_parse_file_reports_path() {
        let path = std::env::temp_dir().join("prism_script_engine_test.prism");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "fn main() {{").unwrap();
        drop(file);

        let err = ScriptParser::new().parse_file(&path).unwrap_err();
        assert!(err.parse_error().is_some());
        assert!(err.to_string().contains("prism_script_engine_test.prism"));
        let _ = std::fs::remove_file(&path);

        let missing = ScriptParser::new()
            .parse_file(Path::new("/nonexistent/prism/source.prism"))
            .unwrap_err();
        assert!(matches!(missing, ScriptError::Io { .. }));
    }
}
