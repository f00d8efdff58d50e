//! Expression parsing.
//!
//! Binary operators are parsed level by level into n-ary chains; everything
//! tighter than multiplication is handled by recursive descent.

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::{BinaryOp, ChainLevel, UnaryOp};
use crate::lexer::TokenKind;
use bumpalo::collections::Vec as BVec;
use monkey_core::{ParseError, ParseErrorKind, Span};

impl<'ast> Parser<'ast> {
    /// Parse a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr<'ast>, ParseError> {
        self.parse_chain(ChainLevel::Comparison)
    }

    /// Parse one chain level: `operand (op operand)*` where every `op`
    /// belongs to `level`. A single operand is returned unwrapped.
    fn parse_chain(&mut self, level: ChainLevel) -> Result<Expr<'ast>, ParseError> {
        let first = self.parse_chain_operand(level)?;

        let Some(op) = self.peek_chain_op(level) else {
            return Ok(first);
        };

        let mut operands = BVec::new_in(self.arena);
        let mut ops = BVec::new_in(self.arena);
        operands.push(first);

        let mut next = Some(op);
        while let Some(op) = next {
            self.advance();
            ops.push(op);
            operands.push(self.parse_chain_operand(level)?);
            next = self.peek_chain_op(level);
        }

        let span = first.span().merge(self.previous_span());
        Ok(Expr::Chain(self.arena.alloc(ChainExpr {
            operands: operands.into_bump_slice(),
            ops: ops.into_bump_slice(),
            level,
            span,
        })))
    }

    fn parse_chain_operand(&mut self, level: ChainLevel) -> Result<Expr<'ast>, ParseError> {
        match level.tighter() {
            Some(tighter) => self.parse_chain(tighter),
            None => self.parse_unary(),
        }
    }

    fn peek_chain_op(&self, level: ChainLevel) -> Option<BinaryOp> {
        BinaryOp::from_token(self.peek().kind).filter(|op| op.level() == level)
    }

    /// Parse a prefix unary expression.
    fn parse_unary(&mut self) -> Result<Expr<'ast>, ParseError> {
        if let Some(op) = UnaryOp::from_token(self.peek().kind) {
            let op_span = self.advance().span;
            let operand = self.parse_unary()?;
            let span = op_span.merge(operand.span());
            return Ok(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span })));
        }

        self.parse_postfix()
    }

    /// Parse a primary expression followed by calls and index operations.
    fn parse_postfix(&mut self) -> Result<Expr<'ast>, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.eat(TokenKind::LeftParen).is_some() {
                let args = self.parse_expr_list(TokenKind::RightParen)?;
                let span = expr.span().merge(self.previous_span());
                expr = Expr::Call(self.arena.alloc(CallExpr {
                    callee: expr,
                    args,
                    span,
                }));
            } else if self.eat(TokenKind::LeftBracket).is_some() {
                let index = self.parse_expr()?;
                let end = self.expect(TokenKind::RightBracket)?.span;
                let span = expr.span().merge(end);
                expr = Expr::Index(self.arena.alloc(IndexExpr {
                    object: expr,
                    index,
                    span,
                }));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("integer literal {} is out of range", token.lexeme),
                    )
                })?;
                Ok(Expr::Literal(LiteralExpr {
                    kind: LiteralKind::Int(value),
                    span: token.span,
                }))
            }

            TokenKind::StringLiteral => {
                self.advance();
                let value = self.decode_string(token.lexeme, token.span)?;
                Ok(Expr::Literal(LiteralExpr {
                    kind: LiteralKind::String(value),
                    span: token.span,
                }))
            }

            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    kind: LiteralKind::Bool(token.kind == TokenKind::True),
                    span: token.span,
                }))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Ident(Ident::new(token.lexeme, token.span)))
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr()?;
                let end = self.expect(TokenKind::RightParen)?.span;
                Ok(Expr::Paren(self.arena.alloc(ParenExpr {
                    expr,
                    span: token.span.merge(end),
                })))
            }

            TokenKind::LeftBracket => {
                self.advance();
                let elements = self.parse_expr_list(TokenKind::RightBracket)?;
                let span = token.span.merge(self.previous_span());
                Ok(Expr::Array(self.arena.alloc(ArrayLiteral { elements, span })))
            }

            TokenKind::LeftBrace => self.parse_hash(),
            TokenKind::Fn => self.parse_function(),
            TokenKind::If => self.parse_if(),

            TokenKind::Eof => Err(ParseError::new(
                ParseErrorKind::UnexpectedEof,
                token.span,
                "expected expression, found end of file",
            )),

            _ => Err(ParseError::expected_expression(
                token.span,
                token.kind.description(),
            )),
        }
    }

    /// Parse a comma-separated expression list after its opening delimiter,
    /// consuming the closing delimiter.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<&'ast [Expr<'ast>], ParseError> {
        let mut items = BVec::new_in(self.arena);

        if self.eat(close).is_none() {
            loop {
                items.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(close)?;
        }

        Ok(items.into_bump_slice())
    }

    /// Parse a hash literal: `{ key: value, ... }`.
    fn parse_hash(&mut self) -> Result<Expr<'ast>, ParseError> {
        let open_brace = self.expect(TokenKind::LeftBrace)?.span;
        let mut pairs = BVec::new_in(self.arena);

        if self.eat(TokenKind::RightBrace).is_none() {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_expr()?;
                pairs.push(HashPair { key, value });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightBrace)?;
        }

        let span = open_brace.merge(self.previous_span());
        Ok(Expr::Hash(self.arena.alloc(HashLiteral {
            pairs: pairs.into_bump_slice(),
            open_brace,
            span,
        })))
    }

    /// Parse a function literal: `fn(a, b) { ... }`.
    fn parse_function(&mut self) -> Result<Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::Fn)?.span;
        self.expect(TokenKind::LeftParen)?;

        let mut params = BVec::new_in(self.arena);
        if self.eat(TokenKind::RightParen).is_none() {
            loop {
                let token = *self.peek();
                if token.kind != TokenKind::Identifier {
                    return Err(ParseError::expected_identifier(
                        token.span,
                        token.kind.description(),
                    ));
                }
                self.advance();
                params.push(Ident::new(token.lexeme, token.span));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen)?;
        }

        let body = self.parse_block()?;
        Ok(Expr::Function(self.arena.alloc(FunctionLiteral {
            params: params.into_bump_slice(),
            body,
            span: start.merge(body.span),
        })))
    }

    /// Parse an if expression: `if (cond) { ... } else { ... }`.
    fn parse_if(&mut self) -> Result<Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen)?;

        let then_block = self.parse_block()?;
        let else_block = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = else_block.map_or(then_block.span, |block| block.span);
        Ok(Expr::If(self.arena.alloc(IfExpr {
            condition,
            then_block,
            else_block,
            span: start.merge(end),
        })))
    }

    /// Decode a quoted string lexeme into an arena string.
    fn decode_string(&mut self, lexeme: &str, span: Span) -> Result<&'ast str, ParseError> {
        let inner = lexeme
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(lexeme);

        if !inner.contains('\\') {
            return Ok(self.arena.alloc_str(inner));
        }

        let mut decoded = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                decoded.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => decoded.push('\n'),
                Some('t') => decoded.push('\t'),
                Some('r') => decoded.push('\r'),
                Some('0') => decoded.push('\0'),
                Some('"') => decoded.push('"'),
                Some('\\') => decoded.push('\\'),
                Some(other) => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        span,
                        format!("unknown escape sequence '\\{other}'"),
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        span,
                        "string ends with a lone backslash",
                    ));
                }
            }
        }

        Ok(self.arena.alloc_str(&decoded))
    }
}
