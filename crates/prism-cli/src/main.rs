//! Prism CLI - inspect WGSL-like shader sources from the command line

mod check;
mod config;
mod repl;
mod report;
mod watch;

use anyhow::{Context, Result};
use check::Mode;
use clap::{Parser, Subcommand};
use config::Settings;
use prism_script::parse_source_with;
use prism_shader::{Lexer, Session, parse_module};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Shader source front end: tokens, declarations, vertex layouts and ASTs", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ./prism.toml, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token list of a source file
    Tokens {
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print structs, global variables and function signatures
    Module {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Compute vertex buffer layouts for an entry point
    Layout {
        file: PathBuf,

        /// Entry point name
        #[arg(short, long)]
        function: String,

        /// Argument or member names that step per instance (repeatable)
        #[arg(short, long)]
        instance: Vec<String>,

        /// Print the layouts in WebGPU's JSON shape
        #[arg(long)]
        json: bool,
    },

    /// Parse function bodies and print the AST
    Ast {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Parse many files in parallel and report failures
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parser to run
        #[arg(short, long, value_enum, default_value_t = Mode::Module)]
        mode: Mode,
    },

    /// Re-check files or directories whenever they change
    Watch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Mode::Module)]
        mode: Mode,

        /// Debounce interval in milliseconds
        #[arg(long, default_value = "100")]
        debounce_ms: u64,
    },

    /// Interactive expression and statement REPL
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = config::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Tokens { file, json } => run_tokens(&file, json)?,
        Commands::Module { file, json } => run_module(&file, json)?,
        Commands::Layout {
            file,
            function,
            instance,
            json,
        } => {
            let mut settings = settings;
            settings.extend_instance_attributes(&instance);
            run_layout(&file, &function, &settings, json)?;
        }
        Commands::Ast { file, json } => run_ast(&file, &settings, json)?,
        Commands::Check { files, mode } => run_check(&files, mode, &settings)?,
        Commands::Watch {
            paths,
            mode,
            debounce_ms,
        } => watch::run_watch(&paths, mode, &settings, Duration::from_millis(debounce_ms))?,
        Commands::Repl => repl::run_repl(settings.parser)?,
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn run_tokens(file: &Path, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let mut session = Session::new();
    let tokens = Lexer::new(&mut session).tokenize(&source);

    if json {
        print_json(&tokens)?;
    } else {
        print!("{}", report::tokens_text(&tokens));
    }
    eprint!("{}", report::diagnostics_text(session.diagnostics()));
    Ok(())
}

fn run_module(file: &Path, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let mut session = Session::new();
    let tokens = Lexer::new(&mut session).tokenize(&source);
    let module = parse_module(&tokens, &mut session)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if json {
        print_json(&module)?;
    } else {
        print!("{}", report::module_text(&module));
    }
    Ok(())
}

fn run_layout(file: &Path, function: &str, settings: &Settings, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let module = prism_shader::Module::parse(&source)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let layouts = module
        .vertex_buffer_layouts(function, &settings.layout)
        .with_context(|| format!("Cannot compute layouts for `{}`", function))?;

    if json {
        print_json(&layouts)?;
    } else {
        print!("{}", report::layouts_text(&layouts));
    }
    Ok(())
}

fn run_ast(file: &Path, settings: &Settings, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let mut session = Session::new();
    let tokens = Lexer::new(&mut session).tokenize(&source);
    let unit = parse_source_with(&tokens, &mut session, &settings.parser)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if json {
        print_json(&unit)?;
    } else {
        print!("{}", report::unit_text(&unit));
    }
    Ok(())
}

fn run_check(files: &[PathBuf], mode: Mode, settings: &Settings) -> Result<()> {
    let reports = check::check_files(files, mode, settings);
    for report in &reports {
        check::print_report(report);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, reports.len());
    }
    Ok(())
}
