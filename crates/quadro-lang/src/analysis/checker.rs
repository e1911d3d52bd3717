//! Scope-threaded semantic pass.
//!
//! Walks the program once, declaring names as it meets them, and stops at the
//! first violation. Expression types come from [`crate::types::static_type`]
//! once their operands have been validated.

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::*;
use crate::types::{assignable, binop_operand_type, static_type};
use super::symbols::{Symbol, SymbolKind, SymbolTable};

type CheckResult<T = ()> = Result<T, Error>;

#[derive(Default)]
pub struct Checker {
    table: SymbolTable,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, program: &Program) -> CheckResult {
        for item in &program.items {
            match item {
                Item::VarDecl(v) => self.check_var_decl(v)?,
                Item::FnDef(f)   => self.check_fn(f)?,
                Item::Block(b)   => self.check_block(b)?,
            }
        }
        Ok(())
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    fn check_var_decl(&mut self, v: &VarDecl) -> CheckResult {
        match &v.init {
            None => {}
            Some(Initializer::Expr(e)) => {
                let found = self.check_expr(e)?;
                if !assignable(v.ty, found) {
                    return Err(mismatch(e.span(), format!(
                        "cannot initialise `{}` variable `{}` with a `{found}` value", v.ty, v.name
                    )));
                }
            }
            Some(Initializer::Dims(dims)) => {
                for d in dims {
                    self.expect_type(d, Type::Int, "array dimension")?;
                }
            }
        }

        let kind = if v.is_const() { SymbolKind::Const } else { SymbolKind::Variable };
        self.declare(Symbol::new(&v.name, v.ty, kind, v.span))
    }

    fn check_fn(&mut self, f: &FnDef) -> CheckResult {
        let params = f.params.iter().map(|p| p.ty).collect();
        // Declared before the body so the function can call itself.
        self.declare(Symbol::function(&f.name, params, f.span))?;

        self.table.push_scope();
        let result = self.check_fn_body(f);
        self.table.pop_scope();
        result
    }

    fn check_fn_body(&mut self, f: &FnDef) -> CheckResult {
        for p in &f.params {
            self.declare(Symbol::new(&p.name, p.ty, SymbolKind::Param, p.span))?;
        }
        for stmt in &f.body.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    // ── Statements ────────────────────────────────────────────────────────────

    fn check_block(&mut self, block: &Block) -> CheckResult {
        self.table.push_scope();
        let result = block.stmts.iter().try_for_each(|s| self.check_stmt(s));
        self.table.pop_scope();
        result
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> CheckResult {
        match stmt {
            Stmt::VarDecl(v) => self.check_var_decl(v),
            Stmt::Assign(a)  => self.check_assign(a),
            Stmt::If(i) => {
                self.expect_type(&i.condition, Type::Bool, "`sorenara` condition")?;
                self.check_block(&i.body)
            }
            Stmt::For(f)     => self.check_for(f),
            Stmt::Block(b)   => self.check_block(b),
            Stmt::FnDef(f)   => self.check_fn(f),
            Stmt::StopIf(_)  => Ok(()),
            Stmt::Expr(e)    => self.check_expr(e).map(|_| ()),
        }
    }

    fn check_assign(&mut self, a: &Assign) -> CheckResult {
        let sym = self.resolve(&a.target, a.span)?;
        let (target_ty, kind) = (sym.ty, sym.kind);

        if !kind.is_assignable() {
            let what = if kind == SymbolKind::Function { "function" } else { "constant" };
            return Err(Error::new(ErrorCode::S004, a.span.line, a.span.column,
                format!("cannot assign to {what} `{}`", a.target)));
        }

        if a.indices.is_empty() {
            let found = self.check_expr(&a.value)?;
            if !assignable(target_ty, found) {
                return Err(mismatch(a.value.span(), format!(
                    "cannot assign a `{found}` value to `{target_ty}` variable `{}`", a.target
                )));
            }
            return Ok(());
        }

        if target_ty != Type::Array {
            return Err(not_an_array(&a.target, target_ty, a.span));
        }
        for index in &a.indices {
            self.expect_type(index, Type::Int, "array index")?;
        }
        self.expect_type(&a.value, Type::Int, "array element")
    }

    fn check_for(&mut self, f: &ForStmt) -> CheckResult {
        self.expect_type(&f.start, Type::Int, "`shuki` start")?;
        self.expect_type(&f.end, Type::Int, "`shuki` end")?;

        self.table.push_scope();
        let result = self
            .declare(Symbol::new(&f.var, Type::Int, SymbolKind::LoopVar, f.span))
            .and_then(|()| self.check_block(&f.body));
        self.table.pop_scope();
        result
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    /// Validates `expr` and returns its static type.
    fn check_expr(&mut self, expr: &Expr) -> CheckResult<Type> {
        match expr {
            Expr::Int(..) | Expr::Bool(..)
            | Expr::Move(..) | Expr::Measure(..) | Expr::Where(_) | Expr::Sequence(_) => {}

            Expr::Ident(name, span) => {
                self.resolve(name, *span)?;
            }

            Expr::Cell { x, y, z, busy, .. } => {
                for coord in [x, y, z] {
                    self.expect_type(coord, Type::Int, "cell coordinate")?;
                }
                let found = self.check_expr(busy)?;
                if !assignable(Type::Bool, found) {
                    return Err(mismatch(busy.span(), format!(
                        "cell occupancy must be `ronri`, found `{found}`"
                    )));
                }
            }

            Expr::Array(items, _) => {
                for item in items {
                    self.check_expr(item)?;
                }
            }

            Expr::Index { name, indices, span } => {
                self.expect_array(name, *span)?;
                for index in indices {
                    self.expect_type(index, Type::Int, "array index")?;
                }
            }

            Expr::BinOp { left, op, right, .. } => {
                let operand = binop_operand_type(*op);
                let context = format!("operand of `{}`", op.symbol());
                self.expect_type(left, operand, &context)?;
                self.expect_type(right, operand, &context)?;
            }

            Expr::Not { operand, .. } => {
                self.expect_type(operand, Type::Bool, "operand of `~`")?;
            }

            Expr::TypeEq { left, right, .. } => {
                for operand in [left, right] {
                    if let TypeOperand::Expr(e) = &**operand {
                        self.check_expr(e)?;
                    }
                }
            }

            Expr::Field { target, span, .. } => {
                let found = self.check_expr(target)?;
                // Elements are only known to be cells at runtime.
                let indexed = matches!(**target, Expr::Index { .. });
                if found != Type::Cell && !indexed {
                    return Err(mismatch(*span, format!(
                        "field access needs a `rippotai` value, found `{found}`"
                    )));
                }
            }

            Expr::Dims(name, span) => {
                self.expect_array(name, *span)?;
            }

            Expr::Call { callee, args, span } => self.check_call(callee, args, *span)?,
        }

        let table = &self.table;
        static_type(expr, &|n: &str| table.lookup(n).map(|s| s.ty))
            .ok_or_else(|| undeclared_at(expr))
    }

    fn check_call(&mut self, callee: &str, args: &[Expr], span: Span) -> CheckResult {
        let sym = self.resolve(callee, span)?;
        if sym.kind != SymbolKind::Function {
            return Err(Error::new(ErrorCode::S006, span.line, span.column,
                format!("`{callee}` is a `{}`, not a function", sym.ty)));
        }
        let params = sym.params.clone();

        if params.len() != args.len() {
            return Err(Error::new(ErrorCode::S005, span.line, span.column, format!(
                "`{callee}` takes {} argument(s), {} given", params.len(), args.len()
            )));
        }
        for (i, (arg, param_ty)) in args.iter().zip(params).enumerate() {
            let found = self.check_expr(arg)?;
            if !assignable(param_ty, found) {
                return Err(mismatch(arg.span(), format!(
                    "argument {} of `{callee}` expects `{param_ty}`, found `{found}`", i + 1
                )));
            }
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn declare(&mut self, sym: Symbol) -> CheckResult {
        let (name, span) = (sym.name.clone(), sym.span);
        if self.table.declare(sym) {
            Ok(())
        } else {
            Err(Error::new(ErrorCode::S003, span.line, span.column,
                format!("`{name}` is already declared in this scope")))
        }
    }

    fn resolve(&self, name: &str, span: Span) -> CheckResult<&Symbol> {
        self.table
            .lookup(name)
            .ok_or_else(|| undeclared(name, span))
    }

    fn expect_array(&self, name: &str, span: Span) -> CheckResult {
        let ty = self.resolve(name, span)?.ty;
        if ty == Type::Array { Ok(()) } else { Err(not_an_array(name, ty, span)) }
    }

    fn expect_type(&mut self, expr: &Expr, expected: Type, context: &str) -> CheckResult {
        let found = self.check_expr(expr)?;
        if found == expected {
            Ok(())
        } else {
            Err(mismatch(expr.span(), format!("{context} must be `{expected}`, found `{found}`")))
        }
    }
}

fn mismatch(span: Span, message: String) -> Error {
    Error::new(ErrorCode::S002, span.line, span.column, message)
}

fn undeclared(name: &str, span: Span) -> Error {
    Error::new(ErrorCode::S001, span.line, span.column, format!("undeclared identifier `{name}`"))
}

fn undeclared_at(expr: &Expr) -> Error {
    let name = match expr {
        Expr::Ident(n, _) => n.as_str(),
        _ => "?",
    };
    undeclared(name, expr.span())
}

fn not_an_array(name: &str, ty: Type, span: Span) -> Error {
    Error::new(ErrorCode::S007, span.line, span.column,
        format!("`{name}` is a `{ty}`, not a `hairetsu`"))
}
