use crate::error::{Error, ErrorCode};
use crate::syntax::token::{COMMAND_SYMBOLS, Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    text: &'a str,
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { text: source, source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Lexing is all-or-nothing: the first illegal character aborts.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        let line = self.line;
        let col = self.column;

        // Robot commands share their first character with operators and
        // identifiers, so they are matched before anything else.
        if let Some(kind) = self.match_command() {
            return Ok(Token::new(kind, line, col));
        }

        let ch = self.advance();
        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'~' => TokenKind::Tilde,
            b'^' => TokenKind::Caret,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'=' => {
                if self.peek() == b'>' { self.advance(); TokenKind::FatArrow }
                else { TokenKind::Eq }
            }

            b'0'..=b'9' => TokenKind::Int(self.read_decimal(ch, line, col)?),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let word = self.read_ident(ch);
                match hex_digits(&word) {
                    Some(digits) => TokenKind::Int(parse_int(digits, 16, line, col)?),
                    None => keyword_or_ident(word),
                }
            }

            other => {
                let found = self
                    .text
                    .get(self.pos - 1..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::from(other));
                return Err(Error::new(ErrorCode::L001, line, col,
                    format!("illegal character `{found}`")));
            }
        };

        Ok(Token::new(kind, line, col))
    }

    fn match_command(&mut self) -> Option<TokenKind> {
        let rest = &self.source[self.pos..];
        for (symbol, kind) in COMMAND_SYMBOLS.iter() {
            let bytes = symbol.as_bytes();
            if !rest.starts_with(bytes) {
                continue;
            }
            // `o_o`, `v_0`, … must not swallow the head of a longer identifier.
            let word_like = bytes[0].is_ascii_alphabetic();
            if word_like && rest.get(bytes.len()).is_some_and(|&b| is_ident_byte(b)) {
                continue;
            }
            for _ in 0..bytes.len() { self.advance(); }
            return Some(kind.clone());
        }
        None
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                b'#' => {
                    while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
                }
                _ => break,
            }
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_decimal(&mut self, first: u8, line: usize, col: usize) -> Result<i64, Error> {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance() as char);
        }
        parse_int(&s, 10, line, col)
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && is_ident_byte(self.peek()) {
            s.push(self.advance() as char);
        }
        s
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `xFF` → `Some("FF")`. Only upper-case hex digits count.
fn hex_digits(word: &str) -> Option<&str> {
    let digits = word.strip_prefix('x')?;
    let is_hex = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));
    is_hex.then_some(digits)
}

fn parse_int(digits: &str, radix: u32, line: usize, col: usize) -> Result<i64, Error> {
    i64::from_str_radix(digits, radix).map_err(|_| {
        Error::new(ErrorCode::L002, line, col,
            format!("integer literal `{digits}` does not fit in 64 bits"))
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
