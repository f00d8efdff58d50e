//! Main lexer implementation for Monkey.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character of each token. Lexemes are copied into the arena so
//! the source string may be freed after lexing completes.

use bumpalo::Bump;
use monkey_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for Monkey source code.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated (persists).
pub struct Lexer<'src, 'ast> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Arena for allocating token lexemes.
    arena: &'ast Bump,
    /// Accumulated errors.
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    ///
    /// Returns an [`TokenKind::Eof`] token forever once input is exhausted.
    pub fn next_token(&mut self) -> Token<'ast> {
        self.skip_trivia();

        if self.cursor.is_eof() {
            return self.make_eof();
        }

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        match self.cursor.peek() {
            Some('"') => self.scan_string(start_line, start_col, start_offset),
            Some(c) if c.is_ascii_digit() => {
                self.scan_number(start_line, start_col, start_offset)
            }
            Some(c) if is_ident_start(c) => {
                self.scan_identifier(start_line, start_col, start_offset)
            }
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    // =========================================
    // Internal helpers
    // =========================================

    /// Skip whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            if self.cursor.peek() == Some('/') && self.cursor.peek_nth(1) == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(start_line, start_col, len);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    /// Create an error token and record the error.
    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning
    // =========================================

    /// Scan a double-quoted string literal. Escapes are kept verbatim in the
    /// lexeme and decoded by the parser.
    fn scan_string(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance(); // opening quote

        loop {
            match self.cursor.peek() {
                None => {
                    let len = self.cursor.offset() - start_offset;
                    return self.make_error(LexError::UnterminatedString {
                        span: Span::new(start_line, start_col, len),
                    });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.make_token(
                        TokenKind::StringLiteral,
                        start_line,
                        start_col,
                        start_offset,
                    );
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        // `12abc` is neither a number nor an identifier
        if self.cursor.check(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            let len = self.cursor.offset() - start_offset;
            return self.make_error(LexError::InvalidNumber {
                span: Span::new(start_line, start_col, len),
                detail: "identifier characters directly after digits".to_string(),
            });
        }

        self.make_token(TokenKind::IntLiteral, start_line, start_col, start_offset)
    }

    fn scan_identifier(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            (',', _) => TokenKind::Comma,
            (':', _) => TokenKind::Colon,
            (';', _) => TokenKind::Semicolon,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', _) => TokenKind::Equal,
            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('!', _) => TokenKind::Bang,
            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', _) => TokenKind::Less,
            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', _) => TokenKind::Greater,

            _ => {
                let len = self.cursor.offset() - start_offset;
                return self.make_error(LexError::UnexpectedChar {
                    ch: c,
                    span: Span::new(start_line, start_col, len),
                });
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

/// Iterate over tokens up to (not including) end of file.
impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
