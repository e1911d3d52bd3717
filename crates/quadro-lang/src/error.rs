use thiserror::Error as ThisError;

use crate::runtime::maze::MazeError;
use crate::runtime::value::ValueError;

/// Error codes prefixed by phase: L = lexer, P = parser, S = semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // illegal character
    L002, // integer literal out of range

    // Parser
    P001, // unexpected token
    P002, // missing expected token / unexpected end of input

    // Semantic
    S001, // undeclared identifier
    S002, // type mismatch
    S003, // redeclaration in same scope
    S004, // assignment to a constant
    S005, // wrong argument count
    S006, // not callable
    S007, // not an array
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::S001 => "S001",
            Self::S002 => "S002",
            Self::S003 => "S003",
            Self::S004 => "S004",
            Self::S005 => "S005",
            Self::S006 => "S006",
            Self::S007 => "S007",
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::L001 | Self::L002)
    }

    pub fn is_syntactic(&self) -> bool {
        matches!(self, Self::P001 | Self::P002)
    }

    pub fn is_semantic(&self) -> bool {
        !self.is_lexical() && !self.is_syntactic()
    }
}

/// A fatal compile-time error. Lexing, parsing and checking each stop at the
/// first one.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("[{}] {line}:{column}: {message}", code.as_str())]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("[runtime] {line}: {message}")]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }

    pub(crate) fn from_value(line: usize, err: ValueError) -> Self {
        Self::new(line, err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Any failure of a full `run`: compile error, runtime error, or a bad maze.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum QuadroError {
    #[error(transparent)]
    Compile(#[from] Error),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),
}
