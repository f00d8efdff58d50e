//! Diagnostics handed back to the caller of a compilation.
//!
//! The caller receives two index-aligned lists: human-readable messages and
//! the 1-based source line of each. Both are empty on success. Warnings are
//! kept apart and never make a compilation fail.

use serde::Serialize;

use crate::{CompilationError, ParseErrors};

/// Index-aligned error messages and line numbers, plus warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    errors: Vec<String>,
    lines: Vec<u32>,
    warnings: Vec<String>,
}

impl Diagnostics {
    /// Create an empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at the given 1-based line.
    pub fn error(&mut self, message: impl Into<String>, line: u32) {
        self.errors.push(message.into());
        self.lines.push(line);
    }

    /// Record an error that has no source location (e.g. an I/O failure).
    ///
    /// No line is recorded for it.
    pub fn unlocated_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a compilation error at its span's line, or unlocated when it
    /// has no span.
    pub fn push_compilation_error(&mut self, error: &CompilationError) {
        match error.span() {
            Some(span) => self.error(error.to_string(), span.line),
            None => self.unlocated_error(error.to_string()),
        }
    }

    /// Whether any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error messages in the order they were reported.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Source lines, aligned with [`errors`](Self::errors).
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Warnings in the order they were reported.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Split into `(errors, lines)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<u32>) {
        (self.errors, self.lines)
    }
}

impl From<&ParseErrors> for Diagnostics {
    fn from(errors: &ParseErrors) -> Self {
        let mut diagnostics = Diagnostics::new();
        for error in errors {
            diagnostics.error(error.to_string(), error.span.line);
        }
        diagnostics
    }
}

impl From<&[CompilationError]> for Diagnostics {
    fn from(errors: &[CompilationError]) -> Self {
        let mut diagnostics = Diagnostics::new();
        for error in errors {
            diagnostics.push_compilation_error(error);
        }
        diagnostics
    }
}
