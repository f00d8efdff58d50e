//! Unified error types for the Monkey toolchain.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LexError          - Lexer/tokenization errors
//! ParseErrors       - Parser errors (each a ParseError with ParseErrorKind)
//! CompilationError  - Contextual analysis and code generation errors
//! ```
//!
//! Syntax and contextual errors are collected and handed back as data; only
//! [`CompilationError::Internal`] signals a compiler bug.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string literal was not properly terminated.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A literal value could not be parsed.
    InvalidLiteral,
    /// Error reported by the lexer.
    InvalidSyntax,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::InvalidSyntax => "invalid syntax",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected expression" error.
    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }
}

/// A collection of parse errors.
///
/// Parsing recovers at statement boundaries, so several errors may be
/// reported for one source text.
#[derive(Debug, Clone, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that occur during contextual analysis and code generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A name was declared twice in the same scope.
    #[error("at {span}: '{name}' is already declared (first declared at {original_span})")]
    Redeclared {
        /// The redeclared name.
        name: String,
        /// Where the name was first declared.
        original_span: Span,
        /// Where the redeclaration occurred.
        span: Span,
    },

    /// A name was referenced without a visible declaration.
    #[error("at {span}: '{name}' is not declared")]
    Undeclared {
        /// The name that wasn't found.
        name: String,
        /// Where the name was referenced.
        span: Span,
    },

    /// A hash literal mixes key types, or uses keys that are neither
    /// integer nor string literals.
    #[error("at {span}: hash literal keys must all be integers or all be strings")]
    InconsistentHashKeyType {
        /// Location of the hash literal's opening brace.
        span: Span,
    },

    /// A declaration was never referenced.
    #[error("at {span}: '{name}' is declared but never used")]
    UnusedDeclaration {
        /// The unused name.
        name: String,
        /// Where the name was declared.
        span: Span,
    },

    /// A function was called with the wrong number of arguments.
    #[error("at {span}: '{name}' expects {expected} argument(s), found {found}")]
    ArgumentCountMismatch {
        /// The function name.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Arguments supplied at the call.
        found: usize,
        /// Location of the call.
        span: Span,
    },

    /// A name bound to a non-function value was called.
    #[error("at {span}: '{name}' is {kind} and cannot be called")]
    NotCallable {
        /// The called name.
        name: String,
        /// Description of what the name is bound to.
        kind: &'static str,
        /// Location of the call.
        span: Span,
    },

    /// Internal compiler error. Never the user's fault.
    #[error("internal compiler error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl CompilationError {
    /// Get the span where this error occurred, if it has a source location.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::Redeclared { span, .. }
            | CompilationError::Undeclared { span, .. }
            | CompilationError::InconsistentHashKeyType { span }
            | CompilationError::UnusedDeclaration { span, .. }
            | CompilationError::ArgumentCountMismatch { span, .. }
            | CompilationError::NotCallable { span, .. } => Some(*span),
            CompilationError::Internal { .. } => None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }
}
