//! Monkey parser crate.
//!
//! This crate turns Monkey source text into an arena-allocated AST:
//! - Lexical analysis (tokenization)
//! - Abstract Syntax Tree (AST) definitions
//! - Recursive-descent parser with statement-level error recovery
//! - A debug tree dump of the AST
//!
//! # Example
//!
//! ```
//! use monkey_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = "let add = fn(a, b) { a + b }; add(1, 2);";
//!
//! match Parser::parse(source, &arena) {
//!     Ok(program) => println!("Parsed {} statements", program.stmts().len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Parser, Program, SyntaxTree};
pub use lexer::{Lexer, Token, TokenKind};
pub use monkey_core::Span;
