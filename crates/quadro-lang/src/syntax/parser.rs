use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::*;
use crate::syntax::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program. There is no error recovery: the first syntax
    /// error is returned.
    pub fn parse(mut self) -> Result<Program, Error> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            match self.peek_kind() {
                kind if kind.is_type_keyword() => {
                    if self.peek_next_is(TokenKind::Function) {
                        items.push(Item::FnDef(self.parse_fn_def()?));
                        self.matches(TokenKind::Semicolon);
                    } else {
                        items.push(Item::VarDecl(self.parse_var_decl()?));
                        self.expect(TokenKind::Semicolon)?;
                    }
                }
                TokenKind::LBrace => {
                    items.push(Item::Block(self.parse_block()?));
                    self.matches(TokenKind::Semicolon);
                }
                _ => return Err(self.unexpected("a declaration, a function or a block")),
            }
        }

        Ok(Program { items })
    }

    // ─── Declarations ────────────────────────────────────────────────────────

    fn parse_var_decl(&mut self) -> Result<VarDecl, Error> {
        let span = self.span();
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        let init = match ty {
            Type::Int | Type::Bool => {
                if self.matches(TokenKind::Eq) {
                    Some(Initializer::Expr(self.parse_expr()?))
                } else {
                    None
                }
            }
            Type::Cell => {
                self.expect(TokenKind::Eq)?;
                if self.check(TokenKind::LBrace) && !self.is_sequence_start() {
                    Some(Initializer::Expr(self.parse_cell_literal()?))
                } else {
                    Some(Initializer::Expr(self.parse_expr()?))
                }
            }
            Type::Array => {
                self.expect(TokenKind::Eq)?;
                if self.check(TokenKind::LBrace) && !self.is_sequence_start() {
                    self.advance();
                    let dims = self.parse_expr_list(TokenKind::RBrace)?;
                    if dims.is_empty() {
                        return Err(self.unexpected("at least one array dimension"));
                    }
                    self.expect(TokenKind::RBrace)?;
                    Some(Initializer::Dims(dims))
                } else {
                    Some(Initializer::Expr(self.parse_expr()?))
                }
            }
            Type::Function => return Err(self.unexpected("a variable type")),
        };

        Ok(VarDecl { name, ty, init, span })
    }

    /// `{ x, y, z, busy }`
    fn parse_cell_literal(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        self.expect(TokenKind::LBrace)?;
        let x = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let y = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let z = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let busy = self.parse_expr()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::Cell {
            x: Box::new(x),
            y: Box::new(y),
            z: Box::new(z),
            busy: Box::new(busy),
            span,
        })
    }

    /// `seisu kansu name(seisu a, ronri b) kido ... shushi`
    fn parse_fn_def(&mut self) -> Result<FnDef, Error> {
        let span = self.span();
        let return_ty = self.parse_type()?;
        self.expect(TokenKind::Function)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_kido_block()?;
        Ok(FnDef { name, return_ty, params, body: Rc::new(body), span })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, Error> {
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let span = self.span();
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            params.push(Param { name, ty, span });
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(params)
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Block, Error> {
        let span = self.span();
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmts_until(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace)?;
        Ok(Block { stmts, span })
    }

    /// `kido stmt* shushi`
    fn parse_kido_block(&mut self) -> Result<Block, Error> {
        let span = self.span();
        self.expect(TokenKind::Then)?;
        let stmts = self.parse_stmts_until(TokenKind::End)?;
        self.expect(TokenKind::End)?;
        Ok(Block { stmts, span })
    }

    fn parse_stmts_until(&mut self, terminator: TokenKind) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        while !self.check(terminator.clone()) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        let stmt = match self.peek_kind() {
            kind if kind.is_type_keyword() => {
                if self.peek_next_is(TokenKind::Function) {
                    let f = self.parse_fn_def()?;
                    self.matches(TokenKind::Semicolon);
                    Stmt::FnDef(f)
                } else {
                    let decl = self.parse_var_decl()?;
                    self.expect(TokenKind::Semicolon)?;
                    Stmt::VarDecl(decl)
                }
            }

            TokenKind::If => {
                let s = self.parse_if()?;
                self.matches(TokenKind::Semicolon);
                s
            }

            TokenKind::For => {
                let s = self.parse_for()?;
                self.matches(TokenKind::Semicolon);
                s
            }

            // A brace holding nothing but robot commands is a Sequence.
            TokenKind::LBrace => {
                let s = if self.is_sequence_block() {
                    Stmt::Expr(Expr::Sequence(self.parse_sequence()?))
                } else {
                    Stmt::Block(self.parse_block()?)
                };
                self.matches(TokenKind::Semicolon);
                s
            }

            TokenKind::StopIf => {
                let span = self.span();
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                Stmt::StopIf(span)
            }

            TokenKind::Move(_) | TokenKind::Measure(_) | TokenKind::Where => {
                let expr = self.parse_primary()?;
                self.expect(TokenKind::Semicolon)?;
                Stmt::Expr(expr)
            }

            TokenKind::Ident(_) => {
                if self.peek_next_is(TokenKind::LParen) {
                    let call = self.parse_call_or_ident()?;
                    self.expect(TokenKind::Semicolon)?;
                    Stmt::Expr(call)
                } else {
                    self.parse_assign()?
                }
            }

            _ => return Err(self.unexpected("a statement")),
        };
        Ok(stmt)
    }

    fn parse_assign(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        let target = self.expect_ident()?;
        let indices = if self.matches(TokenKind::LBracket) {
            let indices = self.parse_index_list()?;
            self.expect(TokenKind::RBracket)?;
            indices
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assign(Assign { target, indices, value, span }))
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let body = self.parse_kido_block()?;
        Ok(Stmt::If(IfStmt { condition, body, span }))
    }

    /// `shuki i = start : end kido ... shushi`: inclusive range.
    fn parse_for(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let end = self.parse_expr()?;
        let body = self.parse_kido_block()?;
        Ok(Stmt::For(ForStmt { var, start, end, body, span }))
    }

    fn parse_sequence(&mut self) -> Result<Sequence, Error> {
        let span = self.span();
        self.expect(TokenKind::LBrace)?;
        let mut commands = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let cmd_span = self.span();
            let cmd = match self.peek_kind() {
                TokenKind::Move(d)    => SeqCommand::Move(d, cmd_span),
                TokenKind::Measure(d) => SeqCommand::Measure(d, cmd_span),
                TokenKind::StopIf     => SeqCommand::StopIf(cmd_span),
                _ => return Err(self.unexpected("a move, measure or `>_<` command")),
            };
            self.advance();
            self.expect(TokenKind::Semicolon)?;
            commands.push(cmd);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Sequence { commands, span })
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Vee) {
            let span = left.span();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_not()?;
        while self.check(TokenKind::Caret) {
            let span = left.span();
            self.advance();
            let right = self.parse_not()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        if self.matches(TokenKind::Tilde) {
            let operand = self.parse_not()?;
            return Ok(Expr::Not { operand: Box::new(operand), span });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_postfix()?;
        while self.check(TokenKind::Star) {
            let span = left.span();
            self.advance();
            let right = self.parse_postfix()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::Mul, right: Box::new(right), span };
        }
        Ok(left)
    }

    /// Cell-field projection: `expr => x`.
    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;
        while self.check(TokenKind::FatArrow) {
            let span = expr.span();
            self.advance();
            let tok = self.advance();
            let field = match &tok.kind {
                TokenKind::Ident(name) => CellField::from_name(name),
                _ => None,
            };
            let Some(field) = field else {
                return Err(self.error_at(&tok, "expected a cell field (`x`, `y`, `z` or `busy`)"));
            };
            expr = Expr::Field { target: Box::new(expr), field, span };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Int(v)  => { self.advance(); Ok(Expr::Int(v, span)) }
            TokenKind::Bool(v) => { self.advance(); Ok(Expr::Bool(v, span)) }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            // Sequence or array literal
            TokenKind::LBrace => {
                if self.is_sequence_start() {
                    return Ok(Expr::Sequence(self.parse_sequence()?));
                }
                self.advance();
                let items = self.parse_expr_list(TokenKind::RBrace)?;
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::Array(items, span))
            }

            TokenKind::Dims => {
                self.advance();
                let name = self.expect_ident()?;
                Ok(Expr::Dims(name, span))
            }

            TokenKind::TypeEq => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                let left = self.parse_type_operand()?;
                self.expect(TokenKind::Comma)?;
                let right = self.parse_type_operand()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::TypeEq { left: Box::new(left), right: Box::new(right), span })
            }

            TokenKind::Move(d)    => { self.advance(); Ok(Expr::Move(d, span)) }
            TokenKind::Measure(d) => { self.advance(); Ok(Expr::Measure(d, span)) }
            TokenKind::Where      => { self.advance(); Ok(Expr::Where(span)) }

            TokenKind::Ident(_) => self.parse_call_or_ident(),

            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_call_or_ident(&mut self) -> Result<Expr, Error> {
        let tok = self.advance();
        let span = Span::new(tok.line, tok.column);
        let name = match tok.kind {
            TokenKind::Ident(s) => s,
            _ => return Err(self.error_at(&tok, "expected identifier")),
        };

        if self.matches(TokenKind::LParen) {
            let args = self.parse_expr_list(TokenKind::RParen)?;
            self.expect(TokenKind::RParen)?;
            Ok(Expr::Call { callee: name, args, span })
        } else if self.matches(TokenKind::LBracket) {
            let indices = self.parse_index_list()?;
            self.expect(TokenKind::RBracket)?;
            Ok(Expr::Index { name, indices, span })
        } else {
            Ok(Expr::Ident(name, span))
        }
    }

    fn parse_type_operand(&mut self) -> Result<TypeOperand, Error> {
        if self.peek_kind().is_type_keyword() {
            let span = self.span();
            let ty = self.parse_type()?;
            Ok(TypeOperand::Type(ty, span))
        } else {
            Ok(TypeOperand::Expr(self.parse_expr()?))
        }
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, Error> {
        let mut items = Vec::new();
        while !self.check(close.clone()) && !self.is_at_end() {
            items.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(items)
    }

    fn parse_index_list(&mut self) -> Result<Vec<Expr>, Error> {
        let indices = self.parse_expr_list(TokenKind::RBracket)?;
        if indices.is_empty() {
            return Err(self.unexpected("an index expression"));
        }
        Ok(indices)
    }

    // ─── Types ───────────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> Result<Type, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::TInt   => Ok(Type::Int),
            TokenKind::TBool  => Ok(Type::Bool),
            TokenKind::TCell  => Ok(Type::Cell),
            TokenKind::TArray => Ok(Type::Array),
            _ => Err(self.error_at(&tok, "expected a type (`seisu`, `ronri`, `rippotai` or `hairetsu`)")),
        }
    }

    // ─── Lookahead ───────────────────────────────────────────────────────────

    /// Expression position: `{` followed by a robot command and `;`.
    fn is_sequence_start(&self) -> bool {
        self.kind_at(self.pos + 1).is_some_and(TokenKind::is_sequence_command)
            && self.kind_at(self.pos + 2) == Some(&TokenKind::Semicolon)
    }

    /// Statement position: every token up to the closing `}` is a robot
    /// command or `;`, and there is at least one command.
    fn is_sequence_block(&self) -> bool {
        let mut seen_command = false;
        let mut i = self.pos + 1;
        while let Some(kind) = self.kind_at(i) {
            match kind {
                TokenKind::RBrace => return seen_command,
                TokenKind::Semicolon => {}
                k if k.is_sequence_command() => seen_command = true,
                _ => return false,
            }
            i += 1;
        }
        false
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn kind_at(&self, index: usize) -> Option<&TokenKind> {
        self.tokens.get(index).map(|t| &t.kind)
    }

    fn peek_next_is(&self, kind: TokenKind) -> bool {
        self.kind_at(self.pos + 1) == Some(&kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            let found = if tok.kind == TokenKind::Eof {
                "unexpected end of input".to_string()
            } else {
                format!("found {}", tok.kind)
            };
            Err(Error::new(
                ErrorCode::P002,
                tok.line,
                tok.column,
                format!("expected {kind}, {found}"),
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(s) => Ok(s),
            _ => Err(self.error_at(&tok, "expected identifier")),
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            return Error::new(ErrorCode::P002, tok.line, tok.column,
                format!("unexpected end of input, expected {expected}"));
        }
        Error::new(
            ErrorCode::P001,
            tok.line,
            tok.column,
            format!("unexpected {}, expected {}", tok.kind, expected),
        )
    }

    fn error_at(&self, tok: &Token, msg: &str) -> Error {
        let code = if tok.kind == TokenKind::Eof { ErrorCode::P002 } else { ErrorCode::P001 };
        Error::new(code, tok.line, tok.column, format!("{msg}, found {}", tok.kind))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
