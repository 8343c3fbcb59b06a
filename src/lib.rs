//! Mini Script is a small embedded scripting language realised as a
//! tree-walking interpreter. It is dynamically typed, lexically scoped, and
//! has first-class functions with closures. Everything runs in a single
//! thread; a script executes to completion, to a runtime error, or to the
//! end of a REPL line.
//!
//! ## Scanning
//! The first step is scanning: turning the source text into a flat list of
//! tokens in one pass. A token carries its kind, the exact lexeme, an
//! optional decoded literal payload (integer, number, string, char, boolean
//! or nil) and the line it came from. The scanner is implemented in the
//! [`scanner`](scanner) module over a peekable character iterator. The
//! string `1 + 2` becomes:
//! ```text
//! [Number(1), Plus, Number(2), EOF]
//! ```
//! Lexical problems like an unterminated string or a lone `&` are reported
//! as a [`LexError`](error::LexError) and abort the current run.
//!
//! ## Parsing
//! The second step is parsing: a hand-written recursive descent parser with
//! one token of lookahead, implemented in the [`parser`](parser) module. It
//! produces [`expressions`](expr::Expr), which evaluate to an
//! [`Object`](object::Object), and [`statements`](stmt::Stmt), which are run
//! for their effect. The string `print 1 + 2;` becomes:
//! ```text
//! Print {
//!     Binary {
//!         left: Number(1),
//!         operator: Plus,
//!         right: Number(2),
//!     }
//! }
//! ```
//! Syntax errors are reported as a [`ParseError`](error::ParseError) and
//! abort the current run before anything executes.
//!
//! ## Interpreting
//! The final step walks the tree. The [`interpreter`](interpreter) module
//! executes statements and evaluates expressions against a chain of
//! [`environments`](environment::Environment), one per lexical scope.
//! Function values capture the environment of their declaration site, so
//! closures keep seeing the bindings they closed over after the enclosing
//! call has returned. `import` feeds a module file through the same pipeline
//! against the same interpreter state, so a module's top-level definitions
//! land in the caller's globals. Failures at this stage are runtime errors:
//! undefined variables, type mismatches, arity mismatches, division by
//! zero, indexes out of range, failed assertions.
//!
//! Diagnostics from all three stages print as one line each:
//! ```text
//! <Phase> Error in <file> at line <N>: <message>
//! ```

use std::fs;
use std::io::Write;

pub mod error;
pub mod token;
pub mod literal;
pub mod scanner;
pub mod expr;
pub mod stmt;
pub mod ast;
pub mod parser;
pub mod object;
pub mod environment;
pub mod function;
pub mod builtins;
pub mod file;
pub mod interpreter;

use error::ScriptError;
use interpreter::Interpreter;
use parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use scanner::Scanner;

/// The interpreter driver: owns the persistent interpreter state and feeds
/// it whole files or single REPL lines. Printed output goes to the injected
/// writer; diagnostics go to stderr.
pub struct MiniScript<'a> {
    interpreter: Interpreter<'a>,
}

impl<'a> MiniScript<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        MiniScript {
            interpreter: Interpreter::new(output),
        }
    }

    /// Runs a script file and returns the process exit code.
    pub fn run_file(&mut self, path: &str) -> i32 {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("Cannot read script '{path}': {error}");
                return 1;
            },
        };

        match self.run_source(&source, path) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("{error}");
                1
            },
        }
    }

    /// Runs a source buffer through the full pipeline against the persistent
    /// interpreter state.
    pub fn run_source(&mut self, source: &str, file: &str) -> Result<(), ScriptError> {
        let tokens = Scanner::new(source)
            .scan_tokens()
            .map_err(|error| error.in_file(file))?;

        let statements = Parser::new(tokens)
            .parse()
            .map_err(|error| error.in_file(file))?;

        self.interpreter.set_source_name(file);
        self.interpreter.interpret(&statements)
    }

    /// The read-eval-print loop. Runs until end of input or the literal
    /// line `exit`; an error only ends the current line.
    pub fn run_prompt(&mut self) {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("Cannot start the prompt: {error}");
                return;
            },
        };

        let history = home::home_dir().map(|dir| dir.join(".miniscript_history"));
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "exit" {
                        break;
                    }

                    let _ = editor.add_history_entry(line);

                    if let Err(error) = self.run_source(line, "<stdin>") {
                        eprintln!("{error}");
                    }
                },
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("{error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }
}
