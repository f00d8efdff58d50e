//! Contextual analysis.
//!
//! A single recursive walk over the AST that checks program meaning before
//! any code is generated:
//!
//! - every referenced name has a visible declaration
//! - no name is declared twice in the same scope
//! - calls to known functions pass the declared number of arguments
//! - hash and array bindings are never called
//! - every hash literal uses only integer keys or only string keys
//!
//! Errors are collected, never thrown, so one pass reports every problem it
//! can find. Declarations that are never referenced are reported at the end.

mod hash_tracker;

pub use hash_tracker::{HashFrame, HashType, HashTypeTracker};

use monkey_core::CompilationError;
use monkey_parser::Program;
use monkey_parser::ast::{
    Block, CallExpr, Expr, FunctionLiteral, HashLiteral, Ident, IfExpr, LetStmt, LiteralKind,
    Stmt, UnaryOp,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::identification::{AttributeData, AttributeKind, IdentificationTable};

/// Knobs for contextual analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Report unused declarations as errors instead of warnings.
    pub unused_as_error: bool,
}

/// Result of contextual analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Errors in source order, followed by unused declarations when those
    /// are treated as errors.
    pub errors: Vec<CompilationError>,
    /// Non-fatal findings.
    pub warnings: Vec<CompilationError>,
}

impl Analysis {
    /// Whether the program may proceed to code generation.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Walks a program once, validating it against an identification table and
/// a hash type tracker.
pub struct ContextualVisitor {
    options: AnalysisOptions,
    table: IdentificationTable,
    hashes: HashTypeTracker,
    errors: Vec<CompilationError>,
}

impl ContextualVisitor {
    /// Create a visitor with fresh per-compilation state.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            table: IdentificationTable::new(),
            hashes: HashTypeTracker::new(),
            errors: Vec::new(),
        }
    }

    /// Analyze a whole program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> Analysis {
        debug!(statements = program.stmts().len(), "contextual analysis started");

        for stmt in program.stmts() {
            self.visit_stmt(stmt);
        }

        let mut warnings = Vec::new();
        for attr in self.table.unused_declarations() {
            warn!(name = attr.name(), line = attr.span().line, "declared but never used");
            let unused = CompilationError::UnusedDeclaration {
                name: attr.name().to_string(),
                span: attr.span(),
            };
            if self.options.unused_as_error {
                self.errors.push(unused);
            } else {
                warnings.push(unused);
            }
        }

        debug!(
            errors = self.errors.len(),
            warnings = warnings.len(),
            "contextual analysis finished"
        );

        Analysis {
            errors: self.errors,
            warnings,
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Let(let_stmt) => self.visit_let(let_stmt),
            Stmt::Return(ret) => self.visit_expr(ret.value),
            Stmt::Expr(expr_stmt) => self.visit_expr(expr_stmt.expr),
        }
    }

    fn visit_let(&mut self, stmt: &LetStmt<'_>) {
        // Declared first so the body can call itself.
        if let Some(func) = stmt.value.as_function() {
            self.declare(
                stmt.name,
                AttributeData::Function {
                    arity: func.params.len(),
                },
            );
            self.visit_function(func);
            return;
        }

        let data = self.visit_bound_value(stmt.value);
        self.declare(stmt.name, data);
    }

    /// Visit the value of a `let` and work out what the name will be bound to.
    fn visit_bound_value(&mut self, value: Expr<'_>) -> AttributeData {
        match value.unparen() {
            Expr::Hash(hash) => AttributeData::Hash {
                key_type: self.visit_hash(hash),
            },
            Expr::Array(array) => {
                for element in array.elements {
                    self.visit_expr(*element);
                }
                AttributeData::Array {
                    len: array.elements.len(),
                }
            }
            Expr::Ident(ident) => {
                self.visit_ident(ident);
                match self.table.lookup(ident.name, ident.span) {
                    Ok(attr)
                        if matches!(
                            attr.kind(),
                            AttributeKind::Function | AttributeKind::Hash | AttributeKind::Array
                        ) =>
                    {
                        attr.data()
                    }
                    _ => AttributeData::Identifier,
                }
            }
            other => {
                self.visit_expr(other);
                AttributeData::Identifier
            }
        }
    }

    fn visit_block(&mut self, block: &Block<'_>) {
        self.table.open_scope();
        for stmt in block.stmts {
            self.visit_stmt(stmt);
        }
        self.table.close_scope();
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn visit_expr(&mut self, expr: Expr<'_>) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Ident(ident) => self.visit_ident(ident),
            Expr::Chain(chain) => {
                for operand in chain.operands {
                    self.visit_expr(*operand);
                }
            }
            Expr::Unary(unary) => self.visit_expr(unary.operand),
            Expr::Call(call) => self.visit_call(call),
            Expr::Index(index) => {
                self.visit_expr(index.object);
                self.visit_expr(index.index);
            }
            Expr::Array(array) => {
                for element in array.elements {
                    self.visit_expr(*element);
                }
            }
            Expr::Hash(hash) => {
                self.visit_hash(hash);
            }
            Expr::Function(func) => self.visit_function(func),
            Expr::If(if_expr) => self.visit_if(if_expr),
            Expr::Paren(paren) => self.visit_expr(paren.expr),
        }
    }

    fn visit_ident(&mut self, ident: Ident<'_>) {
        match self.table.lookup(ident.name, ident.span) {
            Ok(_) => self.table.mark_used(ident.name),
            Err(err) => self.errors.push(err),
        }
    }

    fn visit_call(&mut self, call: &CallExpr<'_>) {
        self.visit_expr(call.callee);

        if let Some(callee) = call.callee.as_ident()
            && let Ok(attr) = self.table.lookup(callee.name, callee.span)
        {
            match attr.data() {
                AttributeData::Function { arity } if arity != call.args.len() => {
                    self.errors.push(CompilationError::ArgumentCountMismatch {
                        name: callee.name.to_string(),
                        expected: arity,
                        found: call.args.len(),
                        span: call.span,
                    });
                }
                AttributeData::Hash { .. } | AttributeData::Array { .. } => {
                    self.errors.push(CompilationError::NotCallable {
                        name: callee.name.to_string(),
                        kind: attr.kind().describe(),
                        span: call.span,
                    });
                }
                _ => {}
            }
        }

        for arg in call.args {
            self.visit_expr(*arg);
        }
    }

    /// Visit a hash literal in its own inference frame and return its key type.
    fn visit_hash(&mut self, hash: &HashLiteral<'_>) -> HashType {
        self.hashes.open();
        self.hashes.record_key_token(hash.open_brace);

        for pair in hash.pairs {
            self.hashes.observe_key_type(key_type_of(pair.key));
            self.visit_expr(pair.key);
            self.visit_expr(pair.value);
        }

        let frame = self.hashes.close();
        if frame.key_type == HashType::Complex {
            self.errors.push(CompilationError::InconsistentHashKeyType {
                span: frame.anchor.unwrap_or(hash.span),
            });
        }
        frame.key_type
    }

    /// Parameters and body share one scope.
    fn visit_function(&mut self, func: &FunctionLiteral<'_>) {
        self.table.open_scope();
        for param in func.params {
            self.declare(*param, AttributeData::Neutral);
        }
        for stmt in func.body.stmts {
            self.visit_stmt(stmt);
        }
        self.table.close_scope();
    }

    fn visit_if(&mut self, if_expr: &IfExpr<'_>) {
        self.visit_expr(if_expr.condition);
        self.visit_block(&if_expr.then_block);
        if let Some(else_block) = &if_expr.else_block {
            self.visit_block(else_block);
        }
    }

    fn declare(&mut self, name: Ident<'_>, data: AttributeData) {
        if let Err(err) = self.table.declare(name.name, data, name.span) {
            self.errors.push(err);
        }
    }
}

/// Key type contributed by one hash key expression, ignoring parentheses.
fn key_type_of(key: Expr<'_>) -> HashType {
    match key.unparen() {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Int(_) => HashType::Integer,
            LiteralKind::String(_) => HashType::String,
            LiteralKind::Bool(_) => HashType::Complex,
        },
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => match unary.operand.unparen() {
            Expr::Literal(lit) if matches!(lit.kind, LiteralKind::Int(_)) => HashType::Integer,
            _ => HashType::Complex,
        },
        _ => HashType::Complex,
    }
}
