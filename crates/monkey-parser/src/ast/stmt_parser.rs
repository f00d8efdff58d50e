//! Statement parsing functions for Monkey.
//!
//! Statement terminators are optional: a `;` after a statement is consumed
//! when present.

use super::parser::Parser;
use crate::ast::expr::Ident;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;
use bumpalo::collections::Vec as BVec;
use monkey_core::ParseError;

impl<'ast> Parser<'ast> {
    /// Parse a statement.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// Parse a let statement.
    ///
    /// Grammar: `'let' IDENTIFIER '=' EXPR ';'?`
    fn parse_let(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Let)?.span;

        let token = *self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(ParseError::expected_identifier(
                token.span,
                token.kind.description(),
            ));
        }
        self.advance();
        let name = Ident::new(token.lexeme, token.span);

        self.expect(TokenKind::Equal)?;
        let value = self.parse_expr()?;
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::Let(LetStmt {
            name,
            value,
            span: start.merge(self.previous_span()),
        }))
    }

    /// Parse a return statement.
    ///
    /// Grammar: `'return' EXPR ';'?`
    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = self.parse_expr()?;
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start.merge(self.previous_span()),
        }))
    }

    /// Parse an expression statement.
    ///
    /// Grammar: `EXPR ';'?`
    fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expr()?;
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: expr.span().merge(self.previous_span()),
        }))
    }

    /// Parse a block.
    ///
    /// Grammar: `'{' STATEMENT* '}'`
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start = self.expect(TokenKind::LeftBrace)?.span;

        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    // Stay inside the block unless recovery already consumed
                    // its closing brace.
                    self.synchronize_in_block();
                    if self.is_eof() {
                        break;
                    }
                }
            }
        }

        let end = self.expect(TokenKind::RightBrace)?.span;

        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span: start.merge(end),
        })
    }

    /// Like [`synchronize`](Parser::synchronize) but stops in front of a `}`
    /// so the enclosing block can close normally.
    fn synchronize_in_block(&mut self) {
        let start_pos = self.position;

        while !self.is_eof() {
            match self.peek().kind {
                TokenKind::RightBrace if self.position > start_pos => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Let | TokenKind::Return if self.position > start_pos => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
