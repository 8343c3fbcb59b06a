use std::fmt::{self, Display};

use crate::object::Object;
use crate::token::{Token, Type};

/// The pipeline stage a diagnostic originated from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
    Lex,
    Parse,
    Runtime,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lex => write!(f, "Lex"),
            Phase::Parse => write!(f, "Parse"),
            Phase::Runtime => write!(f, "Runtime"),
        }
    }
}

/// A diagnostic bound to the source file it was raised in. This is what the
/// drivers print, one line per error.
#[derive(Debug, PartialEq, Clone)]
pub struct ScriptError {
    pub phase: Phase,
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{phase} Error in {file} at line {line}: {message}",
            phase = self.phase,
            file = self.file,
            line = self.line,
            message = self.message,
        )
    }
}

impl std::error::Error for ScriptError {}

/// Represents an error that occurs during scanning.
#[derive(Debug, Clone)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

impl LexError {
    /// Binds the error to the file being scanned.
    pub fn in_file(self, file: &str) -> ScriptError {
        ScriptError {
            phase: Phase::Lex,
            file: file.to_string(),
            line: self.line,
            message: self.message,
        }
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    /// Binds the error to the file being parsed.
    pub fn in_file(self, file: &str) -> ScriptError {
        let message = if self.token.r#type == Type::EOF {
            format!("{} (at end)", self.message)
        } else {
            format!("{} (at '{}')", self.message, self.token.lexeme)
        };

        ScriptError {
            phase: Phase::Parse,
            file: file.to_string(),
            line: self.token.line,
            message,
        }
    }
}

/// Represents an error that occurs during evaluation, before it has been
/// attributed to a file by the interpreter.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

/// Signals that unwind the evaluator.
///
/// `Return` is not an error: it is raised by a `return` statement and caught
/// by the function-call machinery, which turns it back into a plain value.
/// Only the `Error` variant ever reaches the user.
#[derive(Debug)]
pub enum Interrupt {
    Error(ScriptError),
    Return { value: Object, line: usize },
}

impl From<ScriptError> for Interrupt {
    fn from(error: ScriptError) -> Self {
        Interrupt::Error(error)
    }
}
