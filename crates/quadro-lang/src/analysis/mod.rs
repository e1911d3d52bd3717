pub mod symbols;
pub mod checker;

#[cfg(test)]
mod tests;

use crate::error::Error;
use crate::syntax::ast;
use checker::Checker;
pub use symbols::SymbolTable;

/// Checks a parsed program. Nothing may execute until this returns `Ok`.
pub fn check(program: &ast::Program) -> Result<(), Error> {
    Checker::new().run(program)
}
