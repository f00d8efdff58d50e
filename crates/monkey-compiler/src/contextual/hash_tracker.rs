//! Key-type inference for (possibly nested) hash literals.
//!
//! Every hash literal opens a frame on a stack. Keys observed while a frame
//! is on top refine its [`HashType`]:
//!
//! ```text
//! Unknown --Integer--> Integer --String--> Complex
//!         --String---> String  --Integer-> Complex
//!         --Complex--> Complex (sticky)
//! ```
//!
//! A literal nested inside another one gets its own frame, so the outer frame
//! only ever sees its own keys.

use monkey_core::Span;

/// Inferred key type of a hash literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashType {
    /// No key observed yet.
    #[default]
    Unknown,
    /// Every key is an integer literal.
    Integer,
    /// Every key is a string literal.
    String,
    /// Mixed or non-literal keys.
    Complex,
}

impl HashType {
    /// Combine the current type with one more observed key type.
    pub fn refine(self, observed: HashType) -> HashType {
        match (self, observed) {
            (HashType::Unknown, t) => t,
            (current, t) if current == t => current,
            _ => HashType::Complex,
        }
    }
}

/// One open hash literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HashFrame {
    /// Token the literal is reported at.
    pub anchor: Option<Span>,
    /// Key type inferred so far.
    pub key_type: HashType,
}

/// Stack of hash inference frames, innermost last.
#[derive(Debug, Default)]
pub struct HashTypeTracker {
    frames: Vec<HashFrame>,
}

impl HashTypeTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh frame for a hash literal being entered.
    pub fn open(&mut self) {
        self.frames.push(HashFrame::default());
    }

    /// Record the token the innermost literal is reported at.
    ///
    /// No-op when no literal is open.
    pub fn record_key_token(&mut self, span: Span) {
        if let Some(frame) = self.frames.last_mut() {
            frame.anchor = Some(span);
        }
    }

    /// The anchor of the innermost literal, if any.
    pub fn anchor(&self) -> Option<Span> {
        self.frames.last().and_then(|frame| frame.anchor)
    }

    /// Refine the innermost frame with an observed key type.
    ///
    /// No-op when no literal is open.
    pub fn observe_key_type(&mut self, observed: HashType) {
        if let Some(frame) = self.frames.last_mut() {
            frame.key_type = frame.key_type.refine(observed);
        }
    }

    /// Key type of the innermost literal; `Complex` when none is open.
    pub fn current_type(&self) -> HashType {
        self.frames
            .last()
            .map_or(HashType::Complex, |frame| frame.key_type)
    }

    /// Pop the innermost frame.
    ///
    /// # Panics
    ///
    /// Panics if no literal is open; every `close` must pair with an `open`.
    pub fn close(&mut self) -> HashFrame {
        self.frames
            .pop()
            .unwrap_or_else(|| panic!("HashTypeTracker::close called with no open hash literal"))
    }

    /// Number of open literals.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
