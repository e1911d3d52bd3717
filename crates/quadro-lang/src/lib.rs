pub mod syntax;
pub mod types;
pub mod runtime;
pub mod analysis;
pub mod error;

pub use error::{Error, ErrorCode, QuadroError, RuntimeError};
pub use runtime::maze::{Maze, MazeError};
pub use runtime::robot::{Direction, Robot};
pub use runtime::value::{Cell, Value, ValueError};
pub use syntax::token::{Token, TokenKind};

use tracing::debug;

use crate::runtime::env::Env;
use crate::runtime::interpreter::Interpreter;
use crate::syntax::ast::Program as AstProgram;

// ─── Public API types ─────────────────────────────────────────────────────────

/// A lexed, parsed and checked Quadro program. Produced by `compile`.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) ast: AstProgram,
}

/// Top-level bindings left behind by a finished run.
#[derive(Debug, Clone)]
pub struct Globals(Env);

impl Globals {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name)
    }

    /// All globals, sorted by name.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.0.local_bindings()
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex, parse and check source text. Stops at the first error of any phase.
pub fn compile(source: &str) -> Result<Program, Error> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    debug!(tokens = tokens.len(), "lexed");
    let ast = syntax::parser::Parser::new(tokens).parse()?;
    debug!(items = ast.items.len(), "parsed");
    analysis::check(&ast)?;
    debug!("checked");
    Ok(Program { ast })
}

/// Run a compiled program against `robot`. The robot keeps its final
/// position and crash state afterwards.
pub fn execute(program: &Program, robot: &mut Robot) -> Result<Globals, RuntimeError> {
    let globals = Interpreter::new(robot).run(&program.ast)?;
    debug!(position = %robot.coords(), crashed = robot.is_crashed(), "run finished");
    Ok(Globals(globals))
}

/// `compile` followed by `execute`.
pub fn run(source: &str, robot: &mut Robot) -> Result<Globals, QuadroError> {
    let program = compile(source)?;
    Ok(execute(&program, robot)?)
}
