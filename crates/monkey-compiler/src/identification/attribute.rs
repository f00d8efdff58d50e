//! Attributes recorded for declared names.

use monkey_core::Span;

use crate::contextual::HashType;

/// What kind of value a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Function parameter; nothing is known about its value.
    Neutral,
    /// `let` binding of a value whose kind is not tracked.
    Identifier,
    /// Function literal or built-in.
    Function,
    /// Hash literal.
    Hash,
    /// Array literal.
    Array,
}

impl AttributeKind {
    /// Human-readable description with article, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            AttributeKind::Neutral => "a parameter",
            AttributeKind::Identifier => "a value",
            AttributeKind::Function => "a function",
            AttributeKind::Hash => "a hash",
            AttributeKind::Array => "an array",
        }
    }
}

/// Kind-specific data carried by an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeData {
    Neutral,
    Identifier,
    Function { arity: usize },
    Hash { key_type: HashType },
    Array { len: usize },
}

impl AttributeData {
    /// The kind tag of this data.
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeData::Neutral => AttributeKind::Neutral,
            AttributeData::Identifier => AttributeKind::Identifier,
            AttributeData::Function { .. } => AttributeKind::Function,
            AttributeData::Hash { .. } => AttributeKind::Hash,
            AttributeData::Array { .. } => AttributeKind::Array,
        }
    }
}

/// Everything the identification table knows about one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    data: AttributeData,
    span: Span,
    used: bool,
}

impl Attribute {
    /// Create an attribute for a fresh, not yet used declaration.
    pub fn new(name: impl Into<String>, data: AttributeData, span: Span) -> Self {
        Self {
            name: name.into(),
            data,
            span,
            used: false,
        }
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind-specific data.
    pub fn data(&self) -> AttributeData {
        self.data
    }

    /// The kind tag.
    pub fn kind(&self) -> AttributeKind {
        self.data.kind()
    }

    /// Location of the declaring token (default for built-ins).
    pub fn span(&self) -> Span {
        self.span
    }

    /// Whether the declaration has been referenced.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Mark the declaration as referenced. Never reset.
    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// Declared arity if this is a function.
    pub fn arity(&self) -> Option<usize> {
        match self.data {
            AttributeData::Function { arity } => Some(arity),
            _ => None,
        }
    }
}
