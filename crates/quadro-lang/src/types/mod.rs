//! Static typing rules shared by the checker and the interpreter.
//!
//! The checker uses them against its symbol table; the interpreter uses the
//! same function against the declared types of live bindings to answer
//! `ruikei` without evaluating its operands.

use crate::syntax::ast::{BinOp, CellField, Expr, Type, TypeOperand};

/// Static type of `expr`. Identifiers are resolved through `lookup`; the
/// result is `None` only when an identifier reached that way is unbound.
pub fn static_type(expr: &Expr, lookup: &dyn Fn(&str) -> Option<Type>) -> Option<Type> {
    let ty = match expr {
        Expr::Int(..)     => Type::Int,
        Expr::Bool(..)    => Type::Bool,
        Expr::Ident(n, _) => return lookup(n),
        Expr::Cell { .. } => Type::Cell,
        Expr::Array(..)   => Type::Array,
        // Elements are ints for every array the language can declare with
        // dimensions; Sequence elements are checked when projected.
        Expr::Index { .. } => Type::Int,
        Expr::BinOp { op, .. } => binop_type(*op),
        Expr::Not { .. }    => Type::Bool,
        Expr::TypeEq { .. } => Type::Bool,
        Expr::Field { field, .. } => field_type(*field),
        Expr::Dims(..)      => Type::Array,
        Expr::Move(..)      => Type::Int,
        Expr::Measure(..)   => Type::Int,
        Expr::Where(_)      => Type::Cell,
        Expr::Sequence(_)   => Type::Array,
        Expr::Call { .. }   => Type::Int,
    };
    Some(ty)
}

pub fn operand_type(operand: &TypeOperand, lookup: &dyn Fn(&str) -> Option<Type>) -> Option<Type> {
    match operand {
        TypeOperand::Type(ty, _) => Some(*ty),
        TypeOperand::Expr(e)     => static_type(e, lookup),
    }
}

pub fn binop_type(op: BinOp) -> Type {
    if op.is_arithmetic() { Type::Int } else { Type::Bool }
}

/// Operand type a binary operator requires on both sides.
pub fn binop_operand_type(op: BinOp) -> Type {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Lt | BinOp::Gt => Type::Int,
        BinOp::And | BinOp::Or => Type::Bool,
    }
}

pub fn field_type(field: CellField) -> Type {
    match field {
        CellField::X | CellField::Y | CellField::Z => Type::Int,
        CellField::Busy => Type::Bool,
    }
}

/// Identical types, or an int stored into a bool. Never the reverse.
pub fn assignable(target: Type, source: Type) -> bool {
    target == source || (target == Type::Bool && source == Type::Int)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::Span;
    use crate::runtime::robot::Direction;

    fn none(_: &str) -> Option<Type> {
        None
    }

    #[test]
    fn assignability_is_asymmetric() {
        assert!(assignable(Type::Bool, Type::Int));
        assert!(!assignable(Type::Int, Type::Bool));
        assert!(assignable(Type::Cell, Type::Cell));
        assert!(!assignable(Type::Array, Type::Cell));
    }

    #[test]
    fn fixed_types() {
        let s = Span::new(1, 1);
        assert_eq!(static_type(&Expr::Measure(Direction::Up, s), &none), Some(Type::Int));
        assert_eq!(static_type(&Expr::Where(s), &none), Some(Type::Cell));
        assert_eq!(static_type(&Expr::Dims("a".into(), s), &none), Some(Type::Array));
    }

    #[test]
    fn identifiers_use_lookup() {
        let s = Span::new(1, 1);
        let lookup = |n: &str| (n == "flag").then_some(Type::Bool);
        assert_eq!(static_type(&Expr::Ident("flag".into(), s), &lookup), Some(Type::Bool));
        assert_eq!(static_type(&Expr::Ident("other".into(), s), &lookup), None);
    }
}
