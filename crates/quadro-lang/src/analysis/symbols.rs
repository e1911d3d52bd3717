use std::collections::HashMap;

use crate::syntax::ast::{Span, Type};

// ─── Symbol ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    /// Declared from an int or bool literal; never reassigned.
    Const,
    Param,
    LoopVar,
    Function,
}

impl SymbolKind {
    pub fn is_assignable(self) -> bool {
        !matches!(self, Self::Const | Self::Function)
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
    pub span: Span,
    /// Parameter types, for functions only.
    pub params: Vec<Type>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, kind: SymbolKind, span: Span) -> Self {
        Self { name: name.into(), ty, kind, span, params: Vec::new() }
    }

    pub fn function(name: impl Into<String>, params: Vec<Type>, span: Span) -> Self {
        Self { name: name.into(), ty: Type::Function, kind: SymbolKind::Function, span, params }
    }
}

// ─── Scope ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
}

impl Scope {

    /// Returns `false` if a symbol with the same name already exists in this scope.
    pub fn declare(&mut self, sym: Symbol) -> bool {
        if self.symbols.contains_key(&sym.name) {
            return false;
        }
        self.symbols.insert(sym.name.clone(), sym);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

// ─── SymbolTable ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare a symbol in the current (innermost) scope.
    /// Returns `false` on redeclaration.
    pub fn declare(&mut self, sym: Symbol) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.declare(sym),
            None => false,
        }
    }

    /// Innermost scope to outermost.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, ty: Type) -> Symbol {
        Symbol::new(name, ty, SymbolKind::Variable, Span::new(1, 1))
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        assert!(table.declare(sym("a", Type::Int)));
        assert!(!table.declare(sym("a", Type::Bool)));
    }

    #[test]
    fn nested_scope_shadows() {
        let mut table = SymbolTable::new();
        table.declare(sym("a", Type::Int));
        table.push_scope();
        assert!(table.declare(sym("a", Type::Bool)));
        assert_eq!(table.lookup("a").map(|s| s.ty), Some(Type::Bool));
        table.pop_scope();
        assert_eq!(table.lookup("a").map(|s| s.ty), Some(Type::Int));
    }

    #[test]
    fn global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        assert!(table.declare(sym("a", Type::Int)));
        table.pop_scope();
        assert!(table.lookup("a").is_some());
        assert!(!table.declare(sym("a", Type::Bool)));
    }
}
