//! Interactive REPL for the scripting dialect
//!
//! Lines ending in `;` or `}` are parsed as statements, anything else as a
//! single expression. Output is the rendered AST, or JSON after `:json`.

use crate::report::{tokens_text, unit_text};
use anyhow::Result;
use prism_script::{ExpressionTree, ParserConfig, ScriptParser, StatementList};
use prism_shader::{ParseError, tokenize};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};
use std::path::PathBuf;

pub struct Repl {
    parser: ScriptParser,
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
    json: bool,
}

impl Repl {
    pub fn new(config: ParserConfig) -> Result<Self> {
        let editor_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(editor_config)?;

        let history_path = history_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            parser: ScriptParser::with_config(config),
            editor,
            history_path,
            json: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", WELCOME_MESSAGE);

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { "prism> " } else { "   ... " };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if buffer.is_empty() && trimmed.starts_with(':') {
                        match self.handle_command(trimmed) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                            CommandResult::Error(e) => {
                                eprintln!("Error: {}", e);
                                continue;
                            }
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    // Keep reading until brackets close
                    if !is_balanced(&buffer) {
                        continue;
                    }

                    let input = std::mem::take(&mut buffer);
                    if input.trim().is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(input.trim_end());
                    self.eval_and_print(&input);
                }
                Err(ReadlineError::Interrupted) => {
                    if buffer.is_empty() {
                        println!("Use :quit or Ctrl+D to exit");
                    } else {
                        println!("^C - input cancelled");
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Eof) => {
                    println!("\nGoodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    fn eval_and_print(&self, input: &str) {
        match evaluate(&self.parser, input) {
            Ok(parsed) if self.json => match parsed.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            },
            Ok(parsed) => {
                for line in parsed.render() {
                    println!("=> {}", line);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (command, args) = match cmd.split_once(' ') {
            Some((command, args)) => (command, Some(args.trim())),
            None => (cmd, None),
        };

        match command {
            ":help" | ":h" | ":?" => {
                println!("{}", HELP_MESSAGE);
                CommandResult::Continue
            }
            ":quit" | ":q" | ":exit" => CommandResult::Exit,
            ":json" | ":j" => {
                self.json = !self.json;
                println!("JSON output {}", if self.json { "on" } else { "off" });
                CommandResult::Continue
            }
            ":tokens" | ":t" => match args {
                Some(source) => {
                    print!("{}", tokens_text(&tokenize(source)));
                    CommandResult::Continue
                }
                None => CommandResult::Error("Usage: :tokens <source>".into()),
            },
            ":depth" => match args.map(str::parse::<usize>) {
                Some(Ok(max_depth)) => {
                    self.parser = ScriptParser::with_config(ParserConfig::with_max_depth(max_depth));
                    println!("Maximum depth set to {}", max_depth);
                    CommandResult::Continue
                }
                Some(Err(e)) => CommandResult::Error(format!("Invalid depth: {}", e)),
                None => {
                    println!("Maximum depth is {}", self.parser.config().max_depth);
                    CommandResult::Continue
                }
            },
            ":load" | ":l" => match args {
                Some(path) => self.load_source(path),
                None => CommandResult::Error("Usage: :load <file>".into()),
            },
            _ => CommandResult::Error(format!(
                "Unknown command: {}. Type :help for available commands.",
                command
            )),
        }
    }

    /// Parse a whole source file and print its declarations
    fn load_source(&self, path: &str) -> CommandResult {
        match self.parser.parse_file(std::path::Path::new(path)) {
            Ok(unit) => {
                print!("{}", unit_text(&unit));
                CommandResult::Continue
            }
            Err(e) => CommandResult::Error(e.to_string()),
        }
    }
}

enum CommandResult {
    Continue,
    Exit,
    Error(String),
}

/// What one REPL input parsed to
enum Parsed {
    Expression(ExpressionTree),
    Statements(StatementList),
}

impl Parsed {
    fn render(&self) -> Vec<String> {
        match self {
            Parsed::Expression(tree) => vec![tree.render()],
            Parsed::Statements(list) => list.render(),
        }
    }

    fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Parsed::Expression(tree) => serde_json::to_string_pretty(tree),
            Parsed::Statements(list) => serde_json::to_string_pretty(list),
        }
    }
}

fn evaluate(parser: &ScriptParser, input: &str) -> Result<Parsed, ParseError> {
    let trimmed = input.trim_end();
    if trimmed.ends_with(';') {
        return parser.parse_statements(input).map(Parsed::Statements);
    }
    if trimmed.ends_with('}') {
        // A block, or an object literal
        if let Ok(list) = parser.parse_statements(input) {
            return Ok(Parsed::Statements(list));
        }
    }
    parser.parse_expression(input).map(Parsed::Expression)
}

/// Check if braces/brackets/parens are balanced
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut prev_char = '\0';

    for c in input.chars() {
        if c == '"' && prev_char != '\\' {
            in_string = !in_string;
        }

        if !in_string {
            match c {
                '(' | '{' | '[' => depth += 1,
                ')' | '}' | ']' => depth -= 1,
                _ => {}
            }
        }

        prev_char = c;
    }

    depth <= 0
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("prism").join("repl_history"))
}

const WELCOME_MESSAGE: &str = r#"
Prism REPL - type an expression or statements to see their AST.
Type :help for commands.
"#;

const HELP_MESSAGE: &str = r#"
Commands:
  :help, :h, :?     - Show this help message
  :quit, :q, :exit  - Exit the REPL
  :json, :j         - Toggle JSON output
  :tokens <source>  - Show the token list for <source>
  :depth [n]        - Show or set the maximum nesting depth
  :load <file>      - Parse a whole source file

Input:
  a + b - c                  expression     => (+ a b -c)
  var y = 1 + 2;             statement      => (var y: _ (+ 1 2))
  if (a < b) { f(a); }       control flow
  Unclosed brackets continue on the next line.
"#;

pub fn run_repl(config: ParserConfig) -> Result<()> {
    let mut repl = Repl::new(config)?;
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("f(a, [1, 2])"));
        assert!(!is_balanced("if (a) {"));
        assert!(is_balanced("x = \"(\";"));
    }

    #[test]
    fn test_evaluate_dispatch() {
        let parser = ScriptParser::new();

        let Ok(Parsed::Expression(tree)) = evaluate(&parser, "a + b - c\n") else {
            panic!("expected an expression");
        };
        assert_eq!(tree.render(), "(+ a b -c)");

        let Ok(Parsed::Statements(list)) = evaluate(&parser, "var y = 1 + 2;\n") else {
            panic!("expected statements");
        };
        assert_eq!(list.render(), vec!["(var y: _ (+ 1 2))"]);

        let Ok(Parsed::Expression(tree)) = evaluate(&parser, "{ x, y: 1 }") else {
            panic!("expected an object literal");
        };
        assert_eq!(tree.render(), "(object x (: y 1))");

        assert!(evaluate(&parser, "x;").is_err());
    }
}
