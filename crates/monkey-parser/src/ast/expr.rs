//! Expression AST nodes for Monkey.
//!
//! Provides nodes for all expression types including:
//! - Literals (integers, strings, booleans)
//! - Operator chains and unary operations
//! - Postfix operations (call, index)
//! - Composite literals (arrays, hashes, functions)
//! - `if` expressions
//!
//! # Expression Precedence
//!
//! From loosest to tightest:
//! 1. Comparison (<, >, <=, >=, ==, !=)
//! 2. Additive (+, -)
//! 3. Multiplicative (*, /)
//! 4. Prefix unary (-, !)
//! 5. Postfix (call, index)
//!
//! Binary levels are n-ary: `1 + 2 - 3` is one [`ChainExpr`] with three
//! operands and two operators.

use crate::ast::{BinaryOp, Block, ChainLevel, UnaryOp};
use monkey_core::Span;

/// An expression.
///
/// Composite nodes live in the arena; the enum itself is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(Ident<'ast>),
    /// N-ary left-associative operator chain
    Chain(&'ast ChainExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Array/hash indexing
    Index(&'ast IndexExpr<'ast>),
    /// Array literal
    Array(&'ast ArrayLiteral<'ast>),
    /// Hash literal
    Hash(&'ast HashLiteral<'ast>),
    /// Function literal
    Function(&'ast FunctionLiteral<'ast>),
    /// If expression
    If(&'ast IfExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Chain(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Index(e) => e.span,
            Self::Array(e) => e.span,
            Self::Hash(e) => e.span,
            Self::Function(e) => e.span,
            Self::If(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(self) -> Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = paren.expr;
        }
        expr
    }

    /// The function literal this expression denotes, ignoring parentheses.
    pub fn as_function(self) -> Option<&'ast FunctionLiteral<'ast>> {
        match self.unparen() {
            Expr::Function(func) => Some(func),
            _ => None,
        }
    }

    /// The identifier this expression denotes, ignoring parentheses.
    pub fn as_ident(self) -> Option<Ident<'ast>> {
        match self.unparen() {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

/// An identifier with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The identifier text.
    pub name: &'ast str,
    /// Source location
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i64),
    /// String literal with escapes already decoded
    String(&'ast str),
    /// Boolean literal
    Bool(bool),
}

/// An n-ary chain of binary operators of the same precedence level.
///
/// `operands.len() == ops.len() + 1`, and `ops[i]` combines the running
/// result with `operands[i + 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainExpr<'ast> {
    /// Operands, left to right
    pub operands: &'ast [Expr<'ast>],
    /// Operators between consecutive operands
    pub ops: &'ast [BinaryOp],
    /// Precedence level shared by every operator
    pub level: ChainLevel,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// Called expression
    pub callee: Expr<'ast>,
    /// Arguments
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// An index operation: `object[index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    /// Indexed container
    pub object: Expr<'ast>,
    /// Index value
    pub index: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An array literal: `[a, b, c]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayLiteral<'ast> {
    /// Elements
    pub elements: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A hash literal: `{k: v, ...}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashLiteral<'ast> {
    /// Key/value pairs in source order
    pub pairs: &'ast [HashPair<'ast>],
    /// Location of the opening brace
    pub open_brace: Span,
    /// Source location
    pub span: Span,
}

/// One `key: value` entry of a hash literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashPair<'ast> {
    pub key: Expr<'ast>,
    pub value: Expr<'ast>,
}

/// A function literal: `fn(a, b) { ... }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionLiteral<'ast> {
    /// Parameter names
    pub params: &'ast [Ident<'ast>],
    /// Function body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

/// An if expression: `if (cond) { ... } else { ... }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfExpr<'ast> {
    /// Condition
    pub condition: Expr<'ast>,
    /// Then branch
    pub then_block: Block<'ast>,
    /// Optional else branch
    pub else_block: Option<Block<'ast>>,
    /// Source location
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    /// Inner expression
    pub expr: Expr<'ast>,
    /// Source location
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparen_strips_nested_parens() {
        let arena = bumpalo::Bump::new();
        let ident = Expr::Ident(Ident::new("f", Span::new(1, 3, 1)));
        let inner = Expr::Paren(arena.alloc(ParenExpr {
            expr: ident,
            span: Span::new(1, 2, 3),
        }));
        let outer = Expr::Paren(arena.alloc(ParenExpr {
            expr: inner,
            span: Span::new(1, 1, 5),
        }));

        assert_eq!(outer.unparen(), ident);
        assert_eq!(outer.as_ident().map(|i| i.name), Some("f"));
        assert!(outer.as_function().is_none());
        assert_eq!(outer.span(), Span::new(1, 1, 5));
    }
}
