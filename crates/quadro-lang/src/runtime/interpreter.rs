//! Tree-walking interpreter. Runs a checked program against a robot.
//!
//! Scopes are `Env` handles passed down explicitly; the robot and the last
//! measurement live on the interpreter for the duration of one run.

use std::collections::HashMap;
use std::rc::Rc;

use glam::IVec3;
use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::runtime::env::Env;
use crate::runtime::robot::{Direction, Robot};
use crate::runtime::value::{Cell, Closure, Value, ValueError};
use crate::syntax::ast::*;
use crate::types::operand_type;

type RunResult<T> = Result<T, RuntimeError>;

/// What a statement asks of its enclosing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    /// `>_<` fired: abandon the rest of the innermost block.
    Stop,
}

pub struct Interpreter<'r> {
    robot: &'r mut Robot,
    globals: Env,
    last_measure: Option<i64>,
}

impl<'r> Interpreter<'r> {
    pub fn new(robot: &'r mut Robot) -> Self {
        Self { robot, globals: Env::new(), last_measure: None }
    }

    // ─── Entry point ──────────────────────────────────────────────────────────

    /// Runs every top-level item in order and returns the global scope.
    pub fn run(mut self, program: &Program) -> RunResult<Env> {
        let globals = self.globals.clone();
        for item in &program.items {
            match item {
                Item::VarDecl(v) => self.declare(v, &globals)?,
                Item::FnDef(f)   => self.define(f, &globals)?,
                Item::Block(b)   => self.exec_block(b, &globals)?,
            }
        }
        Ok(globals)
    }

    // ─── Statements ───────────────────────────────────────────────────────────

    fn exec_block(&mut self, block: &Block, env: &Env) -> RunResult<()> {
        self.exec_stmts(&block.stmts, &env.child())
    }

    /// Runs `stmts` in `env` until one of them asks to stop.
    fn exec_stmts(&mut self, stmts: &[Stmt], env: &Env) -> RunResult<()> {
        for stmt in stmts {
            if self.exec_stmt(stmt, env)? == Flow::Stop {
                break;
            }
        }
        Ok(())
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> RunResult<Flow> {
        match stmt {
            Stmt::VarDecl(v) => self.declare(v, env)?,

            Stmt::Assign(a) => self.assign(a, env)?,

            Stmt::If(i) => {
                let cond = self.eval_expr(&i.condition, env)?;
                if cond.as_bool().map_err(at(i.span))? {
                    self.exec_block(&i.body, env)?;
                }
            }

            Stmt::For(f) => {
                let start = self.eval_expr(&f.start, env)?.as_int().map_err(at(f.start.span()))?;
                let end = self.eval_expr(&f.end, env)?.as_int().map_err(at(f.end.span()))?;
                for i in start..=end {
                    // Fresh binding per iteration, so closures keep their own `i`.
                    let iteration = env.child();
                    iteration.declare(&f.var, Value::Int(i), Type::Int).map_err(at(f.span))?;
                    self.exec_block(&f.body, &iteration)?;
                }
            }

            Stmt::Block(b) => self.exec_block(b, env)?,

            Stmt::FnDef(f) => self.define(f, env)?,

            Stmt::StopIf(_) => {
                if self.last_measure == Some(1) {
                    trace!("stop-if fired outside a sequence");
                    return Ok(Flow::Stop);
                }
            }

            Stmt::Expr(e) => { self.eval_expr(e, env)?; }
        }
        Ok(Flow::Next)
    }

    fn declare(&mut self, v: &VarDecl, env: &Env) -> RunResult<()> {
        let value = match &v.init {
            None => default_value(v.ty),
            Some(Initializer::Expr(e)) => self.eval_expr(e, env)?,
            Some(Initializer::Dims(dims)) => {
                let sizes = dims
                    .iter()
                    .map(|d| self.eval_expr(d, env)?.as_int().map_err(at(d.span())))
                    .collect::<RunResult<Vec<_>>>()?;
                return env.declare_array(&v.name, sizes).map_err(at(v.span));
            }
        };
        env.declare(&v.name, value, v.ty).map_err(at(v.span))
    }

    fn define(&mut self, f: &FnDef, env: &Env) -> RunResult<()> {
        let closure = Closure {
            name: f.name.clone(),
            params: f.params.clone(),
            body: Rc::clone(&f.body),
            env: env.clone(),
        };
        env.declare(&f.name, Value::Function(Rc::new(closure)), Type::Function)
            .map_err(at(f.span))
    }

    fn assign(&mut self, a: &Assign, env: &Env) -> RunResult<()> {
        let value = self.eval_expr(&a.value, env)?;

        if a.indices.is_empty() {
            return match env.set(&a.target, value).map_err(at(a.span))? {
                true => Ok(()),
                false => Err(undefined(&a.target, a.span)),
            };
        }

        let indices = self.eval_indices(&a.indices, env)?;
        env.with_value_mut(&a.target, |target| {
            target.get_mut(&indices).map(|slot| *slot = value)
        })
        .ok_or_else(|| undefined(&a.target, a.span))?
        .map_err(at(a.span))
    }

    // ─── Expressions ──────────────────────────────────────────────────────────

    pub fn eval_expr(&mut self, expr: &Expr, env: &Env) -> RunResult<Value> {
        match expr {
            Expr::Int(n, _)  => Ok(Value::Int(*n)),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),

            Expr::Ident(name, span) => env.get(name).ok_or_else(|| undefined(name, *span)),

            Expr::Cell { x, y, z, busy, span } => {
                let x = self.eval_coord(x, env)?;
                let y = self.eval_coord(y, env)?;
                let z = self.eval_coord(z, env)?;
                let busy = self.eval_expr(busy, env)?.as_bool().map_err(at(*span))?;
                Ok(Value::Cell(Cell::new(IVec3::new(x, y, z), busy)))
            }

            Expr::Array(items, _) => items
                .iter()
                .map(|item| self.eval_expr(item, env))
                .collect::<RunResult<Vec<_>>>()
                .map(Value::Array),

            Expr::Index { name, indices, span } => {
                let indices = self.eval_indices(indices, env)?;
                let array = env.get(name).ok_or_else(|| undefined(name, *span))?;
                array.as_array().map_err(at(*span))?;
                array.get(&indices).cloned().map_err(at(*span))
            }

            Expr::BinOp { left, op, right, span } => {
                let l = self.eval_expr(left, env)?;
                let r = self.eval_expr(right, env)?;
                eval_binop(*op, &l, &r, *span)
            }

            Expr::Not { operand, span } => {
                let v = self.eval_expr(operand, env)?;
                Ok(Value::Bool(!v.as_bool().map_err(at(*span))?))
            }

            // Answered from declared types; neither operand is evaluated.
            Expr::TypeEq { left, right, span } => {
                let lookup = |n: &str| env.type_of(n);
                let l = operand_type(left, &lookup);
                let r = operand_type(right, &lookup);
                match (l, r) {
                    (Some(l), Some(r)) => Ok(Value::Bool(l == r)),
                    _ => Err(RuntimeError::new(span.line, "`ruikei` operand names an undefined variable")),
                }
            }

            Expr::Field { target, field, span } => {
                let cell = self.eval_expr(target, env)?.as_cell().map_err(at(*span))?;
                Ok(cell.field(*field))
            }

            Expr::Dims(name, span) => {
                let dims = env
                    .dims(name)
                    .ok_or_else(|| undefined(name, *span))?
                    .map_err(at(*span))?;
                Ok(Value::Array(dims.into_iter().map(Value::Int).collect()))
            }

            Expr::Move(dir, _) => {
                self.robot.step(*dir);
                Ok(Value::Int(0))
            }

            Expr::Measure(dir, _) => Ok(Value::Int(self.measure(*dir))),

            Expr::Where(_) => Ok(Value::Cell(self.robot.position())),

            Expr::Sequence(seq) => Ok(self.eval_sequence(seq)),

            Expr::Call { callee, args, span } => self.call(callee, args, *span, env),
        }
    }

    fn eval_coord(&mut self, expr: &Expr, env: &Env) -> RunResult<i32> {
        let n = self.eval_expr(expr, env)?.as_int().map_err(at(expr.span()))?;
        i32::try_from(n)
            .map_err(|_| RuntimeError::new(expr.span().line, format!("cell coordinate {n} is out of range")))
    }

    fn eval_indices(&mut self, indices: &[Expr], env: &Env) -> RunResult<Vec<i64>> {
        indices
            .iter()
            .map(|i| self.eval_expr(i, env)?.as_int().map_err(at(i.span())))
            .collect()
    }

    fn measure(&mut self, dir: Direction) -> i64 {
        let distance = self.robot.measure(dir);
        self.last_measure = Some(distance);
        distance
    }

    // ─── Calls ────────────────────────────────────────────────────────────────

    fn call(&mut self, callee: &str, args: &[Expr], span: Span, env: &Env) -> RunResult<Value> {
        let closure = match env.get(callee) {
            Some(Value::Function(c)) => c,
            Some(other) => {
                return Err(RuntimeError::new(span.line, format!(
                    "`{callee}` is a `{}`, not a function", other.ty()
                )));
            }
            None => return Err(undefined(callee, span)),
        };

        if closure.params.len() != args.len() {
            return Err(RuntimeError::new(span.line, format!(
                "`{callee}` takes {} argument(s), {} given", closure.params.len(), args.len()
            )));
        }

        let values = args
            .iter()
            .map(|a| self.eval_expr(a, env))
            .collect::<RunResult<Vec<_>>>()?;

        debug!(function = %callee, args = values.len(), "calling function");

        let frame = closure.env.child();
        for (param, value) in closure.params.iter().zip(values) {
            frame.declare(&param.name, value, param.ty).map_err(at(param.span))?;
        }
        self.exec_stmts(&closure.body.stmts, &frame)?;

        // There is no `return`; every call evaluates to zero.
        Ok(Value::Int(0))
    }

    // ─── Sequence ─────────────────────────────────────────────────────────────

    /// Runs the commands of a Sequence and returns the cells its measurements
    /// saw, as a `z → y → x` grid relative to where the robot ends up.
    fn eval_sequence(&mut self, seq: &Sequence) -> Value {
        let mut seen: HashMap<IVec3, bool> = HashMap::new();
        let mut stopped = false;

        for cmd in &seq.commands {
            match *cmd {
                SeqCommand::Move(dir, _) => self.robot.step(dir),
                SeqCommand::Measure(dir, _) => {
                    let from = self.robot.coords();
                    let distance = self.measure(dir);
                    for k in 1..=distance {
                        let pos = from + dir.offset() * k as i32;
                        let busy = k == distance;
                        trace!(%pos, busy, "cell recorded");
                        seen.insert(pos, busy);
                    }
                }
                SeqCommand::StopIf(_) => {
                    if self.last_measure == Some(1) {
                        stopped = true;
                        break;
                    }
                }
            }
        }

        debug!(cells = seen.len(), stopped, "sequence finished");

        if seen.is_empty() {
            return Value::Array(Vec::new());
        }

        let origin = self.robot.coords();
        let relative: HashMap<IVec3, bool> = seen
            .into_iter()
            .map(|(pos, busy)| (pos - origin, busy))
            .collect();

        // The origin is part of the box, so a lone measurement still spans
        // from the robot to the wall.
        let (lo, hi) = relative
            .keys()
            .fold((IVec3::ZERO, IVec3::ZERO), |(lo, hi), p| (lo.min(*p), hi.max(*p)));

        let layers = (lo.z..=hi.z)
            .map(|z| {
                let rows = (lo.y..=hi.y)
                    .map(|y| {
                        let cells = (lo.x..=hi.x)
                            .map(|x| {
                                let pos = IVec3::new(x, y, z);
                                let busy = relative.get(&pos).copied().unwrap_or(false);
                                Value::Cell(Cell::new(pos, busy))
                            })
                            .collect();
                        Value::Array(cells)
                    })
                    .collect();
                Value::Array(rows)
            })
            .collect();
        Value::Array(layers)
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn default_value(ty: Type) -> Value {
    match ty {
        Type::Int      => Value::Int(0),
        Type::Bool     => Value::Bool(false),
        Type::Cell     => Value::Cell(Cell::new(IVec3::ZERO, false)),
        Type::Array    => Value::Array(Vec::new()),
        Type::Function => Value::Int(0),
    }
}

fn at(span: Span) -> impl Fn(ValueError) -> RuntimeError {
    move |e| RuntimeError::from_value(span.line, e)
}

fn undefined(name: &str, span: Span) -> RuntimeError {
    RuntimeError::new(span.line, format!("undefined variable `{name}`"))
}

fn eval_binop(op: BinOp, l: &Value, r: &Value, span: Span) -> RunResult<Value> {
    let overflow = || RuntimeError::new(span.line, format!("integer overflow in `{}`", op.symbol()));
    let int = |v: &Value| v.as_int().map_err(at(span));
    let boolean = |v: &Value| v.as_bool().map_err(at(span));

    let value = match op {
        BinOp::Add => Value::Int(int(l)?.checked_add(int(r)?).ok_or_else(overflow)?),
        BinOp::Sub => Value::Int(int(l)?.checked_sub(int(r)?).ok_or_else(overflow)?),
        BinOp::Mul => Value::Int(int(l)?.checked_mul(int(r)?).ok_or_else(overflow)?),
        BinOp::Lt  => Value::Bool(int(l)? < int(r)?),
        BinOp::Gt  => Value::Bool(int(l)? > int(r)?),
        BinOp::And => Value::Bool(boolean(l)? && boolean(r)?),
        BinOp::Or  => Value::Bool(boolean(l)? || boolean(r)?),
    };
    Ok(value)
}
