//! Scoped identification table.
//!
//! The table is a stack of scopes mapping names to [`Attribute`]s. The
//! outermost (global) scope starts out holding the built-in functions.
//! Every attribute ever declared is kept in declaration order, so unused
//! declarations of scopes that have already closed can still be reported.

use monkey_core::{CompilationError, Span};
use rustc_hash::FxHashMap;

use super::{Attribute, AttributeData};
use crate::builtins::BUILTINS;

/// Identification table for one compilation unit.
#[derive(Debug)]
pub struct IdentificationTable {
    /// Visible names per scope, innermost last. Values index `attributes`.
    scopes: Vec<FxHashMap<String, usize>>,
    /// Every declaration, in declaration order.
    attributes: Vec<Attribute>,
}

impl IdentificationTable {
    /// Create a table whose global scope holds the built-ins.
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![FxHashMap::default()],
            attributes: Vec::new(),
        };

        for builtin in BUILTINS {
            let mut attribute = Attribute::new(
                builtin.name,
                AttributeData::Function {
                    arity: builtin.arity,
                },
                Span::default(),
            );
            attribute.mark_used();
            table.insert(attribute);
        }

        table
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a new scope (function body or `if` branch).
    pub fn open_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Exit the innermost scope, making shadowed names visible again.
    ///
    /// # Panics
    ///
    /// Panics when called on the global scope.
    pub fn close_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot close the global scope");
        self.scopes.pop();
    }

    /// Number of open scopes, counting the global scope as 1.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    // ==========================================================================
    // Declaration and Lookup
    // ==========================================================================

    /// Declare a name in the innermost scope.
    ///
    /// Fails if the name is already declared in that same scope. Names of
    /// outer scopes may be shadowed.
    pub fn declare(
        &mut self,
        name: &str,
        data: AttributeData,
        span: Span,
    ) -> Result<&Attribute, CompilationError> {
        if let Some(&existing) = self.innermost().get(name) {
            return Err(CompilationError::Redeclared {
                name: name.to_string(),
                original_span: self.attributes[existing].span(),
                span,
            });
        }

        let index = self.insert(Attribute::new(name, data, span));
        Ok(&self.attributes[index])
    }

    /// Find the visible declaration of `name`, innermost scope first.
    pub fn lookup(&self, name: &str, span: Span) -> Result<&Attribute, CompilationError> {
        self.resolve_index(name)
            .map(|index| &self.attributes[index])
            .ok_or_else(|| CompilationError::Undeclared {
                name: name.to_string(),
                span,
            })
    }

    /// Mark the visible declaration of `name` as used.
    ///
    /// Idempotent; does nothing for unknown names.
    pub fn mark_used(&mut self, name: &str) {
        if let Some(index) = self.resolve_index(name) {
            self.attributes[index].mark_used();
        }
    }

    /// Declarations never referenced, in declaration order.
    pub fn unused_declarations(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| !attr.is_used())
    }

    fn resolve_index(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn innermost(&self) -> &FxHashMap<String, usize> {
        // The global scope is never popped, so the stack is never empty.
        &self.scopes[self.scopes.len() - 1]
    }

    fn insert(&mut self, attribute: Attribute) -> usize {
        let index = self.attributes.len();
        let depth = self.scopes.len() - 1;
        self.scopes[depth].insert(attribute.name().to_string(), index);
        self.attributes.push(attribute);
        index
    }
}

impl Default for IdentificationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identification::AttributeKind;

    fn span(line: u32, col: u32) -> Span {
        Span::new(line, col, 1)
    }

    #[test]
    fn builtins_are_declared_and_used() {
        let table = IdentificationTable::new();
        let len = table.lookup("len", span(1, 1)).unwrap();
        assert_eq!(len.kind(), AttributeKind::Function);
        assert_eq!(len.arity(), Some(1));
        assert_eq!(table.unused_declarations().count(), 0);
    }

    #[test]
    fn declare_and_lookup() {
        let mut table = IdentificationTable::new();
        table
            .declare("x", AttributeData::Identifier, span(1, 5))
            .unwrap();

        let attr = table.lookup("x", span(2, 1)).unwrap();
        assert_eq!(attr.span(), span(1, 5));
        assert!(!attr.is_used());
    }

    #[test]
    fn undeclared_lookup() {
        let table = IdentificationTable::new();
        let err = table.lookup("y", span(3, 7)).unwrap_err();
        assert_eq!(
            err,
            CompilationError::Undeclared {
                name: "y".into(),
                span: span(3, 7)
            }
        );
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut table = IdentificationTable::new();
        table.declare("a", AttributeData::Identifier, span(1, 5)).unwrap();
        let err = table
            .declare("a", AttributeData::Array { len: 0 }, span(2, 5))
            .unwrap_err();

        assert_eq!(
            err,
            CompilationError::Redeclared {
                name: "a".into(),
                original_span: span(1, 5),
                span: span(2, 5),
            }
        );
        // The original binding is untouched.
        assert_eq!(
            table.lookup("a", span(3, 1)).unwrap().kind(),
            AttributeKind::Identifier
        );
    }

    #[test]
    fn builtin_names_cannot_be_redeclared_globally() {
        let mut table = IdentificationTable::new();
        assert!(table.declare("len", AttributeData::Identifier, span(1, 5)).is_err());
    }

    #[test]
    fn shadowing_is_restored_on_close() {
        let mut table = IdentificationTable::new();
        table.declare("v", AttributeData::Identifier, span(1, 5)).unwrap();

        table.open_scope();
        table
            .declare(
                "v",
                AttributeData::Hash {
                    key_type: crate::contextual::HashType::Integer,
                },
                span(2, 9),
            )
            .unwrap();
        assert_eq!(table.lookup("v", span(3, 1)).unwrap().kind(), AttributeKind::Hash);
        table.close_scope();

        assert_eq!(
            table.lookup("v", span(4, 1)).unwrap().kind(),
            AttributeKind::Identifier
        );
    }

    #[test]
    fn scope_exit_removes_names() {
        let mut table = IdentificationTable::new();
        table.open_scope();
        table.declare("inner", AttributeData::Neutral, span(1, 4)).unwrap();
        assert_eq!(table.depth(), 2);
        table.close_scope();

        assert_eq!(table.depth(), 1);
        assert!(table.lookup("inner", span(2, 1)).is_err());
    }

    #[test]
    fn mark_used_targets_visible_binding() {
        let mut table = IdentificationTable::new();
        table.declare("v", AttributeData::Identifier, span(1, 5)).unwrap();
        table.open_scope();
        table.declare("v", AttributeData::Identifier, span(2, 5)).unwrap();
        table.mark_used("v");
        table.mark_used("v");
        table.close_scope();

        let unused: Vec<Span> = table.unused_declarations().map(|a| a.span()).collect();
        assert_eq!(unused, vec![span(1, 5)]);
    }

    #[test]
    fn unused_declarations_in_declaration_order() {
        let mut table = IdentificationTable::new();
        table.declare("b", AttributeData::Identifier, span(1, 5)).unwrap();
        table.open_scope();
        table.declare("a", AttributeData::Neutral, span(2, 5)).unwrap();
        table.close_scope();
        table.declare("c", AttributeData::Identifier, span(3, 5)).unwrap();

        let names: Vec<&str> = table.unused_declarations().map(|a| a.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    #[should_panic(expected = "cannot close the global scope")]
    fn closing_global_scope_panics() {
        IdentificationTable::new().close_scope();
    }
}
