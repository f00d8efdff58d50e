//! Serializable debug tree of a parsed program.
//!
//! [`SyntaxTree`] is an owned, arena-independent rendering of the AST that
//! outlives the arena and can be handed back to callers (for example as the
//! `tree` field of a compile response).

use serde::Serialize;
use std::fmt;

use crate::ast::{Block, Expr, LiteralKind, Program, Stmt};

/// One labelled node of the debug tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    /// Node description, e.g. `Let x` or `Int 5`.
    pub label: String,
    /// Child nodes in source order.
    pub children: Vec<SyntaxTree>,
}

impl SyntaxTree {
    /// Create a leaf node.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn node(label: impl Into<String>, children: Vec<SyntaxTree>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Build the tree for a whole program.
    pub fn from_program(program: &Program<'_>) -> Self {
        Self::node(
            "Program",
            program.stmts().iter().map(Self::from_stmt).collect(),
        )
    }

    fn from_stmt(stmt: &Stmt<'_>) -> Self {
        match stmt {
            Stmt::Let(s) => Self::node(
                format!("Let {}", s.name.name),
                vec![Self::from_expr(&s.value)],
            ),
            Stmt::Return(s) => Self::node("Return", vec![Self::from_expr(&s.value)]),
            Stmt::Expr(s) => Self::node("ExprStmt", vec![Self::from_expr(&s.expr)]),
        }
    }

    fn from_block(label: &str, block: &Block<'_>) -> Self {
        Self::node(label, block.stmts.iter().map(Self::from_stmt).collect())
    }

    fn from_expr(expr: &Expr<'_>) -> Self {
        match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(value) => Self::leaf(format!("Int {value}")),
                LiteralKind::String(value) => Self::leaf(format!("String {value:?}")),
                LiteralKind::Bool(value) => Self::leaf(format!("Bool {value}")),
            },
            Expr::Ident(ident) => Self::leaf(format!("Ident {}", ident.name)),
            Expr::Chain(chain) => {
                let ops: Vec<&str> = chain.ops.iter().map(|op| op.as_str()).collect();
                Self::node(
                    format!("Chain {}", ops.join(" ")),
                    chain.operands.iter().map(Self::from_expr).collect(),
                )
            }
            Expr::Unary(unary) => {
                Self::node(format!("Unary {}", unary.op), vec![Self::from_expr(&unary.operand)])
            }
            Expr::Call(call) => {
                let mut children = vec![Self::from_expr(&call.callee)];
                children.extend(call.args.iter().map(Self::from_expr));
                Self::node("Call", children)
            }
            Expr::Index(index) => Self::node(
                "Index",
                vec![Self::from_expr(&index.object), Self::from_expr(&index.index)],
            ),
            Expr::Array(array) => {
                Self::node("Array", array.elements.iter().map(Self::from_expr).collect())
            }
            Expr::Hash(hash) => Self::node(
                "Hash",
                hash.pairs
                    .iter()
                    .map(|pair| {
                        Self::node(
                            "Pair",
                            vec![Self::from_expr(&pair.key), Self::from_expr(&pair.value)],
                        )
                    })
                    .collect(),
            ),
            Expr::Function(func) => {
                let params: Vec<&str> = func.params.iter().map(|p| p.name).collect();
                Self::node(
                    format!("Function({})", params.join(", ")),
                    vec![Self::from_block("Body", &func.body)],
                )
            }
            Expr::If(if_expr) => {
                let mut children = vec![
                    Self::from_expr(&if_expr.condition),
                    Self::from_block("Then", &if_expr.then_block),
                ];
                if let Some(else_block) = &if_expr.else_block {
                    children.push(Self::from_block("Else", else_block));
                }
                Self::node("If", children)
            }
            Expr::Paren(paren) => Self::node("Paren", vec![Self::from_expr(&paren.expr)]),
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl From<&Program<'_>> for SyntaxTree {
    fn from(program: &Program<'_>) -> Self {
        Self::from_program(program)
    }
}

/// Indented outline, two spaces per level.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
