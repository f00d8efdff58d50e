//! Statement AST nodes for Monkey.

use crate::ast::{Expr, Ident};
use monkey_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `let name = value;`
    Let(LetStmt<'ast>),
    /// `return value;`
    Return(ReturnStmt<'ast>),
    /// Expression statement
    Expr(ExprStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Let(s) => s.span,
            Self::Return(s) => s.span,
            Self::Expr(s) => s.span,
        }
    }
}

/// A `let` binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetStmt<'ast> {
    /// Bound name
    pub name: Ident<'ast>,
    /// Bound value
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A `return` statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Returned value
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An expression evaluated for its value or effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A braced statement block (function body or `if` branch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> Block<'ast> {
    /// The trailing expression statement, if the block ends with one.
    pub fn tail_expr(&self) -> Option<&'ast ExprStmt<'ast>> {
        match self.stmts.last() {
            Some(Stmt::Expr(stmt)) => Some(stmt),
            _ => None,
        }
    }
}
