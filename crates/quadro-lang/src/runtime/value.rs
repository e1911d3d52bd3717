use std::fmt;
use std::rc::Rc;

use glam::IVec3;
use thiserror::Error;

use crate::runtime::env::Env;
use crate::syntax::ast::{Block, CellField, Param, Type};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("cannot convert {from} to {to}")]
    Conversion { from: Type, to: Type },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("too many indices for an array of depth {depth}")]
    TooManyIndices { depth: usize },
    #[error("array dimension must not be negative, got {0}")]
    NegativeDimension(i64),
    #[error("array of dimensions {0:?} is too large")]
    TooLarge(Vec<i64>),
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// One grid cell: a position and whether it is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub pos: IVec3,
    pub busy: bool,
}

impl Cell {
    pub fn new(pos: IVec3, busy: bool) -> Self {
        Self { pos, busy }
    }

    pub fn field(&self, field: CellField) -> Value {
        match field {
            CellField::X    => Value::Int(self.pos.x.into()),
            CellField::Y    => Value::Int(self.pos.y.into()),
            CellField::Z    => Value::Int(self.pos.z.into()),
            CellField::Busy => Value::Bool(self.busy),
        }
    }
}

// ─── Closure ─────────────────────────────────────────────────────────────────

/// A function value. Calls run `body` in a child of `env`, the scope the
/// function was defined in.
pub struct Closure {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Rc<Block>,
    pub env: Env,
}

impl fmt::Debug for Closure {
    // The captured scope usually contains the closure itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("arity", &self.params.len())
            .finish_non_exhaustive()
    }
}

// ─── Value ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Cell(Cell),
    Array(Vec<Value>),
    Function(Rc<Closure>),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_)      => Type::Int,
            Value::Bool(_)     => Type::Bool,
            Value::Cell(_)     => Type::Cell,
            Value::Array(_)    => Type::Array,
            Value::Function(_) => Type::Function,
        }
    }

    fn conversion(&self, to: Type) -> ValueError {
        ValueError::Conversion { from: self.ty(), to }
    }

    pub fn as_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(n)  => Ok(*n),
            Value::Bool(b) => Ok(i64::from(*b)),
            _ => Err(self.conversion(Type::Int)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(n)  => Ok(*n != 0),
            _ => Err(self.conversion(Type::Bool)),
        }
    }

    pub fn as_cell(&self) -> Result<Cell, ValueError> {
        match self {
            Value::Cell(c) => Ok(*c),
            _ => Err(self.conversion(Type::Cell)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::Array(items) => Ok(items),
            _ => Err(self.conversion(Type::Array)),
        }
    }

    /// Converts to the representation a binding of type `ty` stores. Only
    /// int → bool narrowing changes the value; any other mismatch fails.
    pub fn coerce_to(self, ty: Type) -> Result<Value, ValueError> {
        match (ty, &self) {
            (Type::Bool, Value::Int(_)) => Ok(Value::Bool(self.as_bool()?)),
            _ if self.ty() == ty => Ok(self),
            _ => Err(self.conversion(ty)),
        }
    }

    /// A nested array of the given dimensions with every leaf `Int(0)`.
    pub fn zeros(dims: &[i64]) -> Result<Value, ValueError> {
        let mut leaves: usize = 1;
        for &d in dims {
            let len = usize::try_from(d).map_err(|_| ValueError::NegativeDimension(d))?;
            leaves = leaves
                .checked_mul(len)
                .ok_or_else(|| ValueError::TooLarge(dims.to_vec()))?;
        }
        fill(dims, dims)
    }

    /// Length of the array followed by the shape of its first element.
    /// Scalars have an empty shape. Declared arrays keep their dimensions on
    /// the binding instead, see `Env::dims`.
    pub fn shape(&self) -> Vec<i64> {
        let mut shape = Vec::new();
        let mut current = self;
        while let Value::Array(items) = current {
            shape.push(items.len() as i64);
            match items.first() {
                Some(first) => current = first,
                None => break,
            }
        }
        shape
    }

    pub fn get(&self, indices: &[i64]) -> Result<&Value, ValueError> {
        let mut current = self;
        for (depth, &index) in indices.iter().enumerate() {
            let items = match current {
                Value::Array(items) => items,
                _ => return Err(ValueError::TooManyIndices { depth }),
            };
            current = element(items, index)?;
        }
        Ok(current)
    }

    pub fn get_mut(&mut self, indices: &[i64]) -> Result<&mut Value, ValueError> {
        let mut current = self;
        for (depth, &index) in indices.iter().enumerate() {
            let items = match current {
                Value::Array(items) => items,
                _ => return Err(ValueError::TooManyIndices { depth }),
            };
            let len = items.len();
            current = usize::try_from(index)
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or(ValueError::IndexOutOfRange { index, len })?;
        }
        Ok(current)
    }
}

fn fill(dims: &[i64], all: &[i64]) -> Result<Value, ValueError> {
    let Some((&first, rest)) = dims.split_first() else {
        return Ok(Value::Int(0));
    };
    let len = usize::try_from(first).map_err(|_| ValueError::NegativeDimension(first))?;
    if len == 0 {
        return Ok(Value::Array(Vec::new()));
    }
    let inner = fill(rest, all)?;
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|_| ValueError::TooLarge(all.to_vec()))?;
    items.resize(len, inner);
    Ok(Value::Array(items))
}

fn element(items: &[Value], index: i64) -> Result<&Value, ValueError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or(ValueError::IndexOutOfRange { index, len: items.len() })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b))           => a == b,
            (Value::Bool(a), Value::Bool(b))         => a == b,
            (Value::Cell(a), Value::Cell(b))         => a == b,
            (Value::Array(a), Value::Array(b))       => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Cell> for Value {
    fn from(c: Cell) -> Self {
        Value::Cell(c)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n)      => write!(f, "{n}"),
            Value::Bool(true)  => f.write_str("shinri"),
            Value::Bool(false) => f.write_str("uso"),
            Value::Cell(c)     => write!(f, "{{{}, {}, {}, {}}}", c.pos.x, c.pos.y, c.pos.z, Value::Bool(c.busy)),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            Value::Function(c) => write!(f, "kansu {}", c.name),
        }
    }
}
