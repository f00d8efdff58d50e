//! Operator definitions for Monkey expressions.
//!
//! Binary operators are grouped into [`ChainLevel`]s. All operators of one
//! level are left-associative and collected into a single n-ary chain node.

use crate::lexer::TokenKind;
use std::fmt;

/// Precedence levels of binary operator chains, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainLevel {
    /// `<`, `>`, `<=`, `>=`, `==`, `!=`
    Comparison,
    /// `+`, `-`
    Addition,
    /// `*`, `/`
    Multiplication,
}

impl ChainLevel {
    /// The next tighter level, or `None` for the tightest (operands are unary
    /// expressions).
    pub fn tighter(self) -> Option<ChainLevel> {
        match self {
            ChainLevel::Comparison => Some(ChainLevel::Addition),
            ChainLevel::Addition => Some(ChainLevel::Multiplication),
            ChainLevel::Multiplication => None,
        }
    }
}

/// Binary operators in Monkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Comparison
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,

    // Addition
    /// `+`
    Add,
    /// `-`
    Sub,

    // Multiplication
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// The chain level this operator belongs to.
    pub fn level(&self) -> ChainLevel {
        use BinaryOp::*;
        match self {
            Less | Greater | LessEqual | GreaterEqual | Equal | NotEqual => {
                ChainLevel::Comparison
            }
            Add | Sub => ChainLevel::Addition,
            Mul | Div => ChainLevel::Multiplication,
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        Some(match token {
            TokenKind::Less => BinaryOp::Less,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::EqualEqual => BinaryOp::Equal,
            TokenKind::BangEqual => BinaryOp::NotEqual,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            _ => return None,
        })
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

impl UnaryOp {
    /// Try to convert a token kind to a unary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
