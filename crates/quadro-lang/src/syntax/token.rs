use std::fmt;

use crate::runtime::robot::Direction;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Bool(bool),
    Ident(String),

    // Keywords
    If,       // sorenara
    Then,     // kido
    End,      // shushi
    For,      // shuki
    Function, // kansu
    Dims,     // jigen
    TypeEq,   // ruikei

    // Type keywords
    TInt,   // seisu
    TBool,  // ronri
    TCell,  // rippotai
    TArray, // hairetsu

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Tilde,    // ~
    Caret,    // ^
    Vee,      // v
    Lt,       // <
    Gt,       // >
    Eq,       // =
    FatArrow, // =>

    // Punctuation
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]

    // Robot commands
    Move(Direction),
    Measure(Direction),
    StopIf, // >_<
    Where,  // *_*

    Eof,
}

impl TokenKind {
    pub fn is_type_keyword(&self) -> bool {
        matches!(self, Self::TInt | Self::TBool | Self::TCell | Self::TArray)
    }

    /// Commands allowed inside a Sequence block.
    pub fn is_sequence_command(&self) -> bool {
        matches!(self, Self::Move(_) | Self::Measure(_) | Self::StopIf)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v)       => write!(f, "integer `{v}`"),
            Self::Bool(true)   => f.write_str("`shinri`"),
            Self::Bool(false)  => f.write_str("`uso`"),
            Self::Ident(s)     => write!(f, "identifier `{s}`"),
            Self::Move(d)      => write!(f, "`{}`", d.move_symbol()),
            Self::Measure(d)   => write!(f, "`{}`", d.measure_symbol()),
            Self::Eof          => f.write_str("end of input"),
            other              => write!(f, "`{}`", other.symbol()),
        }
    }
}

impl TokenKind {
    fn symbol(&self) -> &'static str {
        match self {
            Self::If        => "sorenara",
            Self::Then      => "kido",
            Self::End       => "shushi",
            Self::For       => "shuki",
            Self::Function  => "kansu",
            Self::Dims      => "jigen",
            Self::TypeEq    => "ruikei",
            Self::TInt      => "seisu",
            Self::TBool     => "ronri",
            Self::TCell     => "rippotai",
            Self::TArray    => "hairetsu",
            Self::Plus      => "+",
            Self::Minus     => "-",
            Self::Star      => "*",
            Self::Tilde     => "~",
            Self::Caret     => "^",
            Self::Vee       => "v",
            Self::Lt        => "<",
            Self::Gt        => ">",
            Self::Eq        => "=",
            Self::FatArrow  => "=>",
            Self::Comma     => ",",
            Self::Semicolon => ";",
            Self::Colon     => ":",
            Self::LParen    => "(",
            Self::RParen    => ")",
            Self::LBrace    => "{",
            Self::RBrace    => "}",
            Self::LBracket  => "[",
            Self::RBracket  => "]",
            Self::StopIf    => ">_<",
            Self::Where     => "*_*",
            Self::Int(_) | Self::Bool(_) | Self::Ident(_)
            | Self::Move(_) | Self::Measure(_) | Self::Eof => "",
        }
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "sorenara" => TokenKind::If,
        "kido"     => TokenKind::Then,
        "shushi"   => TokenKind::End,
        "shuki"    => TokenKind::For,
        "kansu"    => TokenKind::Function,
        "jigen"    => TokenKind::Dims,
        "ruikei"   => TokenKind::TypeEq,
        "seisu"    => TokenKind::TInt,
        "ronri"    => TokenKind::TBool,
        "rippotai" => TokenKind::TCell,
        "hairetsu" => TokenKind::TArray,
        "shinri"   => TokenKind::Bool(true),
        "uso"      => TokenKind::Bool(false),
        "v"        => TokenKind::Vee,
        _          => TokenKind::Ident(s),
    }
}

/// The fourteen three-character robot symbols, in the order the lexer tries them.
pub const COMMAND_SYMBOLS: [(&str, TokenKind); 14] = [
    ("^_^", TokenKind::Move(Direction::Up)),
    ("v_v", TokenKind::Move(Direction::Down)),
    ("<_<", TokenKind::Move(Direction::Left)),
    (">_>", TokenKind::Move(Direction::Right)),
    ("o_o", TokenKind::Move(Direction::Forward)),
    ("~_~", TokenKind::Move(Direction::Back)),
    ("^_0", TokenKind::Measure(Direction::Up)),
    ("v_0", TokenKind::Measure(Direction::Down)),
    ("<_0", TokenKind::Measure(Direction::Left)),
    (">_0", TokenKind::Measure(Direction::Right)),
    ("o_0", TokenKind::Measure(Direction::Forward)),
    ("~_0", TokenKind::Measure(Direction::Back)),
    (">_<", TokenKind::StopIf),
    ("*_*", TokenKind::Where),
];

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
