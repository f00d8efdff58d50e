//! Parser infrastructure for Monkey.
//!
//! Provides the main [`Parser`] struct with token navigation, error
//! recovery and the public parsing entry points.

use crate::ast::{Expr, Program};
use crate::lexer::{Lexer, Token, TokenKind};
use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use monkey_core::{ParseError, ParseErrorKind, ParseErrors, Span};

/// The main parser for Monkey source code.
///
/// The `'ast` lifetime refers to the arena where AST nodes and token
/// lexemes are allocated. The source string only needs to live during
/// the call to `new()`.
pub struct Parser<'ast> {
    /// Buffered tokens, always terminated by an `Eof` token
    pub(super) buffer: Vec<Token<'ast>>,
    /// Current position in the buffer
    pub(super) position: usize,
    /// Accumulated parse errors
    pub(super) errors: ParseErrors,
    /// Arena allocator for AST nodes
    pub(super) arena: &'ast Bump,
}

impl<'ast> Parser<'ast> {
    /// Create a new parser for the given source code.
    ///
    /// The whole source is tokenized up front. Lexer errors are converted to
    /// parse errors here and their placeholder tokens are dropped, so the
    /// grammar never sees them.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity(source.len() / 4 + 1);
        let mut errors = ParseErrors::new();

        loop {
            let token = lexer.next_token();

            if token.kind == TokenKind::Error {
                for lex_error in lexer.take_errors() {
                    errors.push(ParseError::new(
                        ParseErrorKind::InvalidSyntax,
                        lex_error.span(),
                        lex_error.to_string(),
                    ));
                }
                continue;
            }

            let is_eof = token.kind == TokenKind::Eof;
            buffer.push(token);
            if is_eof {
                break;
            }
        }

        Self {
            buffer,
            position: 0,
            errors,
            arena,
        }
    }

    /// Parse a complete program, failing if any syntax error was found.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let program = parser.parse_program();

        if parser.has_errors() {
            tracing::debug!(errors = parser.errors.len(), "parse failed");
            Err(parser.take_errors())
        } else {
            tracing::debug!(statements = program.stmts().len(), "parsed program");
            Ok(program)
        }
    }

    /// Parse a program leniently, returning the recovered AST together with
    /// every error encountered.
    pub fn parse_lenient(source: &str, arena: &'ast Bump) -> (Program<'ast>, ParseErrors) {
        let mut parser = Parser::new(source, arena);
        let program = parser.parse_program();
        (program, parser.take_errors())
    }

    /// Parse a single expression that must span the whole input.
    pub fn parse_expression(source: &str, arena: &'ast Bump) -> Result<Expr<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);

        let result = parser
            .parse_expr()
            .and_then(|expr| parser.expect(TokenKind::Eof).map(|_| expr));

        match result {
            Ok(expr) if !parser.has_errors() => Ok(expr),
            Ok(_) => Err(parser.take_errors()),
            Err(err) => {
                parser.errors.push(err);
                Err(parser.take_errors())
            }
        }
    }

    /// Parse statements until end of input, recovering after each error.
    pub(super) fn parse_program(&mut self) -> Program<'ast> {
        let start = self.peek().span;
        let mut stmts = BVec::new_in(self.arena);

        while !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        let end = self.peek().span;
        Program::new(stmts.into_bump_slice(), start.merge(end))
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take the errors, leaving an empty error collection.
    pub fn take_errors(&mut self) -> ParseErrors {
        std::mem::take(&mut self.errors)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead n tokens without consuming. Clamps to the final `Eof`.
    pub fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.buffer.len() - 1;
        &self.buffer[(self.position + n).min(last)]
    }

    /// Get the current token and advance to the next.
    ///
    /// Never moves past the final `Eof` token.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Check if the current token matches the given kind.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Check if the current token is EOF.
    pub fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// If the current token matches the given kind, consume it and return Some.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expect the current token to be of the given kind.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = *self.peek();
            let kind_of_error = if token.kind == TokenKind::Eof {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::ExpectedToken
            };
            Err(ParseError::new(
                kind_of_error,
                token.span,
                format!("expected {}, found {}", kind, token.kind),
            ))
        }
    }

    /// The span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .map(|i| self.buffer[i].span)
            .unwrap_or_else(|| self.peek().span)
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record a parse error.
    pub fn error(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError::new(kind, span, message));
    }

    /// Skip tokens until a statement boundary.
    ///
    /// Stops after a `;` or `}`, or before `let`/`return`. Always consumes at
    /// least one token.
    pub fn synchronize(&mut self) {
        let start_pos = self.position;

        while !self.is_eof() {
            match self.peek().kind {
                TokenKind::Semicolon | TokenKind::RightBrace => {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_stops_at_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena);
        assert_eq!(parser.advance().kind, TokenKind::Identifier);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
        assert!(parser.is_eof());
    }

    #[test]
    fn lexer_errors_become_parse_errors() {
        let arena = Bump::new();
        let parser = Parser::new("let x = 1 $ 2;", &arena);
        assert!(parser.has_errors());
        assert!(parser.buffer.iter().all(|t| t.kind != TokenKind::Error));
    }

    #[test]
    fn expect_reports_found_token() {
        let arena = Bump::new();
        let mut parser = Parser::new("]", &arena);
        let err = parser.expect(TokenKind::RightParen).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
        assert_eq!(err.message, "expected ')', found ']'");
    }

    #[test]
    fn expect_at_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new("", &arena);
        let err = parser.expect(TokenKind::Semicolon).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn synchronize_skips_past_semicolon() {
        let arena = Bump::new();
        let mut parser = Parser::new("= = ; let", &arena);
        parser.synchronize();
        assert!(parser.check(TokenKind::Let));
    }

    #[test]
    fn synchronize_always_advances() {
        let arena = Bump::new();
        let mut parser = Parser::new("let let", &arena);
        parser.synchronize();
        assert_eq!(parser.position, 1);
    }

    #[test]
    fn recovers_and_reports_every_error() {
        let arena = Bump::new();
        let (program, errors) = Parser::parse_lenient("let = 1;\nlet y = 2;\nlet z = ;", &arena);
        assert_eq!(errors.len(), 2);
        assert_eq!(program.stmts().len(), 1);
        let lines: Vec<u32> = errors.iter().map(|e| e.span.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn parse_expression_rejects_trailing_tokens() {
        let arena = Bump::new();
        assert!(Parser::parse_expression("1 + 2", &arena).is_ok());
        assert!(Parser::parse_expression("1 2", &arena).is_err());
    }
}
