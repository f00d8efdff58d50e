//! Abstract Syntax Tree (AST) for Monkey.
//!
//! This module provides:
//! - AST node definitions for every Monkey construct
//! - Parser for transforming tokens into AST
//! - A serializable debug tree of a parsed program
//!
//! # Example
//!
//! ```
//! use monkey_parser::ast::{Parser, Stmt};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let program = Parser::parse("let x = 1; x + 2", &arena).unwrap();
//! assert!(matches!(program.stmts()[0], Stmt::Let(_)));
//! ```

pub mod expr;
pub mod ops;
pub mod stmt;
pub mod tree;

mod expr_parser;
mod parser;
mod stmt_parser;

pub use expr::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;
pub use tree::SyntaxTree;

use monkey_core::Span;

/// A parsed Monkey program.
///
/// The program borrows from an arena allocator. All AST nodes are allocated
/// in the arena and remain valid for the lifetime of the arena.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    stmts: &'ast [Stmt<'ast>],
    span: Span,
}

impl<'ast> Program<'ast> {
    /// Create a new program from parsed statements.
    pub(crate) fn new(stmts: &'ast [Stmt<'ast>], span: Span) -> Self {
        Self { stmts, span }
    }

    /// Get the top-level statements in this program.
    pub fn stmts(&self) -> &'ast [Stmt<'ast>] {
        self.stmts
    }

    /// Get the span of the entire program.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Check if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn empty_program() {
        let arena = Bump::new();
        let program = Parser::parse("// nothing here\n", &arena).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn program_statements() {
        let arena = Bump::new();
        let program = Parser::parse("let a = 1\nlet b = 2\na + b", &arena).unwrap();
        assert_eq!(program.stmts().len(), 3);
        assert_eq!(program.span().line, 1);
    }
}
