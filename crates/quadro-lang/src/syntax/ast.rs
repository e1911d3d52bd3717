use std::fmt;
use std::rc::Rc;

use crate::runtime::robot::Direction;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level items: declarations, function definitions and bare blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    VarDecl(VarDecl),
    FnDef(FnDef),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ─── Declarations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub init: Option<Initializer>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    /// `= expr`
    Expr(Expr),
    /// `hairetsu a = { 3, 4 }`: dimension sizes. Every leaf starts at zero.
    Dims(Vec<Expr>),
}

impl VarDecl {
    /// Declarations initialised straight from an integer or boolean literal
    /// are compile-time constants.
    pub fn is_const(&self) -> bool {
        matches!(self.init, Some(Initializer::Expr(Expr::Int(..) | Expr::Bool(..))))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    /// Documentation only: every call evaluates to zero.
    pub return_ty: Type,
    pub params: Vec<Param>,
    pub body: Rc<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `seisu n = 3;`
    VarDecl(VarDecl),
    /// `n = n + 1;` or `grid[i, j] = 0;`
    Assign(Assign),
    /// `sorenara cond kido ... shushi`
    If(IfStmt),
    /// `shuki i = a : b kido ... shushi`
    For(ForStmt),
    /// `{ ... }`
    Block(Block),
    /// A nested `kansu` definition.
    FnDef(FnDef),
    /// `>_<`
    StopIf(Span),
    /// Calls, robot commands, position queries and Sequences used for effect.
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: String,
    /// Empty for a plain variable.
    pub indices: Vec<Expr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var: String,
    pub start: Expr,
    pub end: Expr,
    pub body: Block,
    pub span: Span,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64, Span),
    Bool(bool, Span),
    Ident(String, Span),

    /// `{ x, y, z, busy }` in a `rippotai` declaration.
    Cell {
        x: Box<Expr>,
        y: Box<Expr>,
        z: Box<Expr>,
        busy: Box<Expr>,
        span: Span,
    },

    /// `{ 1, 2, 3 }`
    Array(Vec<Expr>, Span),

    /// `grid[i, j]`
    Index {
        name: String,
        indices: Vec<Expr>,
        span: Span,
    },

    /// `a + b`, `a < b`, `p ^ q`, …
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `~ p`
    Not {
        operand: Box<Expr>,
        span: Span,
    },

    /// `ruikei { a, seisu }`
    TypeEq {
        left: Box<TypeOperand>,
        right: Box<TypeOperand>,
        span: Span,
    },

    /// `c => x`
    Field {
        target: Box<Expr>,
        field: CellField,
        span: Span,
    },

    /// `jigen grid`
    Dims(String, Span),

    Move(Direction, Span),
    Measure(Direction, Span),
    /// `*_*`
    Where(Span),
    Sequence(Sequence),

    /// `name(args)`
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, s)             => *s,
            Expr::Bool(_, s)            => *s,
            Expr::Ident(_, s)           => *s,
            Expr::Cell { span, .. }     => *span,
            Expr::Array(_, s)           => *s,
            Expr::Index { span, .. }    => *span,
            Expr::BinOp { span, .. }    => *span,
            Expr::Not { span, .. }      => *span,
            Expr::TypeEq { span, .. }   => *span,
            Expr::Field { span, .. }    => *span,
            Expr::Dims(_, s)            => *s,
            Expr::Move(_, s)            => *s,
            Expr::Measure(_, s)         => *s,
            Expr::Where(s)              => *s,
            Expr::Sequence(seq)         => seq.span,
            Expr::Call { span, .. }     => *span,
        }
    }
}

/// Operand of `ruikei`: an expression, or a bare type keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeOperand {
    Expr(Expr),
    Type(Type, Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub commands: Vec<SeqCommand>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeqCommand {
    Move(Direction, Span),
    Measure(Direction, Span),
    StopIf(Span),
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul,
    Lt, Gt,
    And, Or,
}

impl BinOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::Lt | Self::Gt)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Lt  => "<",
            Self::Gt  => ">",
            Self::And => "^",
            Self::Or  => "v",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellField {
    X,
    Y,
    Z,
    Busy,
}

impl CellField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x"    => Some(Self::X),
            "y"    => Some(Self::Y),
            "z"    => Some(Self::Z),
            "busy" => Some(Self::Busy),
            _      => None,
        }
    }
}

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Cell,
    Array,
    Function,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Int      => "seisu",
            Type::Bool     => "ronri",
            Type::Cell     => "rippotai",
            Type::Array    => "hairetsu",
            Type::Function => "kansu",
        })
    }
}
