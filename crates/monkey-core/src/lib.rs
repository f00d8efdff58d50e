//! Monkey core crate.
//!
//! Types shared by every phase of the Monkey toolchain:
//!
//! - [`Span`] - source locations for tokens, nodes and diagnostics
//! - [`error`] - the error taxonomy (lexing, parsing, compilation)
//! - [`Diagnostics`] - index-aligned error messages and line numbers

pub mod diagnostics;
pub mod error;
mod span;

pub use diagnostics::Diagnostics;
pub use error::{CompilationError, LexError, ParseError, ParseErrorKind, ParseErrors};
pub use span::Span;
