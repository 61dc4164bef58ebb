//! Batch checking of shader sources

use crate::config::Settings;
use clap::ValueEnum;
use prism_script::parse_source_with;
use prism_shader::{Diagnostic, Lexer, Session, parse_module};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Which parser a check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Declarations and signatures only; function bodies are skipped
    #[default]
    Module,
    /// Full parse including function bodies
    Script,
}

/// Outcome of checking one file
#[derive(Debug)]
pub struct CheckReport {
    pub path: PathBuf,
    /// Short summary on success, the error message on failure
    pub outcome: Result<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn check_source(
    source: &str,
    mode: Mode,
    settings: &Settings,
) -> (Result<String, String>, Vec<Diagnostic>) {
    let mut session = Session::new();
    let tokens = Lexer::new(&mut session).tokenize(source);
    tracing::trace!(tokens = tokens.len(), "tokenized");

    let outcome = match mode {
        Mode::Module => parse_module(&tokens, &mut session)
            .map(|m| {
                format!(
                    "{} structs, {} vars, {} fns",
                    m.structs.len(),
                    m.vars.len(),
                    m.fns.len()
                )
            })
            .map_err(|e| e.to_string()),
        Mode::Script => parse_source_with(&tokens, &mut session, &settings.parser)
            .map(|u| {
                format!(
                    "{} structs, {} declarations, {} terms",
                    u.structs.len(),
                    u.declarations.len(),
                    u.ast.terms().len()
                )
            })
            .map_err(|e| e.to_string()),
    };
    (outcome, session.diagnostics().to_vec())
}

pub fn check_file(path: &Path, mode: Mode, settings: &Settings) -> CheckReport {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            let (outcome, diagnostics) = check_source(&source, mode, settings);
            CheckReport {
                path: path.to_path_buf(),
                outcome,
                diagnostics,
            }
        }
        Err(e) => CheckReport {
            path: path.to_path_buf(),
            outcome: Err(format!("Failed to read: {}", e)),
            diagnostics: Vec::new(),
        },
    }
}

/// Check every file in parallel; reports keep the input order
pub fn check_files(paths: &[PathBuf], mode: Mode, settings: &Settings) -> Vec<CheckReport> {
    paths
        .par_iter()
        .map(|path| check_file(path, mode, settings))
        .collect()
}

pub fn print_report(report: &CheckReport) {
    match &report.outcome {
        Ok(summary) => println!("ok    {} ({})", report.path.display(), summary),
        Err(message) => eprintln!("error {}: {}", report.path.display(), message),
    }
    for d in &report.diagnostics {
        eprintln!("      line {}: {}", d.line, d.message);
    }
}
