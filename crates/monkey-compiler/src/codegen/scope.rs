//! Symbol resolution for code generation.
//!
//! This module provides `SymbolScope` for mapping names to storage during
//! emission. It handles:
//! - Global slots at the top level, local slots inside functions
//! - Nested block scopes (`if` branches) with shadowing restored on exit
//! - Free-variable capture for closures, through any number of levels
//! - A function's reference to itself from its own body

use rustc_hash::FxHashMap;

use crate::builtins::BUILTINS;

// ============================================================================
// Types
// ============================================================================

/// Where a symbol's value lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Program-wide slot (`GET_GLOBAL` / `SET_GLOBAL`)
    Global,
    /// Slot in the current call frame (`GET_LOCAL` / `SET_LOCAL`)
    Local,
    /// VM built-in function (`GET_BUILTIN`)
    Builtin,
    /// Value captured by the current closure (`GET_FREE`)
    Free,
    /// The closure currently executing (`CURRENT_CLOSURE`)
    Function,
}

/// A resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Name as written in the source
    pub name: String,
    /// Storage class
    pub kind: SymbolKind,
    /// Slot, built-in index or free index, depending on `kind`
    pub index: usize,
    /// Block depth where defined
    depth: u32,
}

// ============================================================================
// SymbolScope
// ============================================================================

/// Symbols of one function being compiled (or of the top level).
#[derive(Debug, Default)]
pub struct SymbolScope {
    /// Visible symbols by name
    symbols: FxHashMap<String, Symbol>,

    /// Current block depth (0 = function or top level)
    depth: u32,

    /// Stack of shadowed symbols (shadowing_depth, name, old_symbol)
    shadowed: Vec<(u32, String, Symbol)>,

    /// Next slot to hand out
    next_index: usize,

    /// Captured symbols, as they resolve in the enclosing scope
    free: Vec<Symbol>,

    /// Enclosing function's scope
    parent: Option<Box<SymbolScope>>,
}

impl SymbolScope {
    /// Create the top-level scope with the built-ins visible.
    pub fn global() -> Self {
        let mut scope = Self::default();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            scope.insert(Symbol {
                name: builtin.name.to_string(),
                kind: SymbolKind::Builtin,
                index,
                depth: 0,
            });
        }
        scope
    }

    /// Create the scope of a function nested in `parent`.
    pub fn enclosed(parent: SymbolScope) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            ..Self::default()
        }
    }

    /// Take the enclosing scope back when a function is finished.
    pub fn take_parent(&mut self) -> Option<SymbolScope> {
        self.parent.take().map(|parent| *parent)
    }

    /// Whether this is the top-level scope.
    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a block.
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Exit the current block, dropping its symbols.
    pub fn pop_scope(&mut self) {
        self.symbols.retain(|_, symbol| symbol.depth < self.depth);

        while let Some((shadowing_depth, _, _)) = self.shadowed.last() {
            if *shadowing_depth != self.depth {
                break;
            }
            if let Some((_, name, symbol)) = self.shadowed.pop() {
                self.symbols.insert(name, symbol);
            }
        }

        // Slots are not reused; the frame keeps room for every local.
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current block depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    // ==========================================================================
    // Definition
    // ==========================================================================

    /// Define a name in the current block with a fresh slot.
    ///
    /// Global at the top level, local inside a function.
    pub fn define(&mut self, name: &str) -> Symbol {
        let kind = if self.is_global() {
            SymbolKind::Global
        } else {
            SymbolKind::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            index: self.next_index,
            depth: self.depth,
        };
        self.next_index += 1;
        self.insert(symbol.clone());
        symbol
    }

    /// Make `name` refer to the function whose body this scope compiles.
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            index: 0,
            depth: self.depth,
        };
        self.insert(symbol.clone());
        symbol
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        let symbol = Symbol {
            name: original.name.clone(),
            kind: SymbolKind::Free,
            index: self.free.len(),
            // Captures live as long as the function.
            depth: 0,
        };
        self.free.push(original);
        self.symbols.insert(symbol.name.clone(), symbol.clone());
        symbol
    }

    fn insert(&mut self, symbol: Symbol) {
        if let Some(existing) = self.symbols.get(&symbol.name)
            && existing.depth < self.depth
        {
            self.shadowed
                .push((self.depth, symbol.name.clone(), existing.clone()));
        }
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    /// Resolve a name, capturing it from enclosing functions if needed.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.symbols.get(name) {
            return Some(symbol.clone());
        }

        let outer = self.parent.as_mut()?.resolve(name)?;
        match outer.kind {
            SymbolKind::Global | SymbolKind::Builtin => Some(outer),
            SymbolKind::Local | SymbolKind::Free | SymbolKind::Function => {
                Some(self.define_free(outer))
            }
        }
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    /// Number of slots handed out (locals of a function frame, or globals).
    pub fn num_definitions(&self) -> usize {
        self.next_index
    }

    /// Captured symbols in capture order, as they resolve in the parent.
    pub fn free_symbols(&self) -> &[Symbol] {
        &self.free
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_by_vm_index() {
        let mut scope = SymbolScope::global();
        let push = scope.resolve("push").unwrap();
        assert_eq!(push.kind, SymbolKind::Builtin);
        assert_eq!(push.index, 5);
    }

    #[test]
    fn top_level_definitions_are_globals() {
        let mut scope = SymbolScope::global();
        assert_eq!(scope.define("a").index, 0);
        let b = scope.define("b");
        assert_eq!((b.kind, b.index), (SymbolKind::Global, 1));
        assert_eq!(scope.num_definitions(), 2);
    }

    #[test]
    fn function_definitions_are_locals() {
        let mut scope = SymbolScope::enclosed(SymbolScope::global());
        let x = scope.define("x");
        assert_eq!((x.kind, x.index), (SymbolKind::Local, 0));
    }

    #[test]
    fn block_shadowing_is_restored() {
        let mut scope = SymbolScope::global();
        scope.define("v");

        scope.push_scope();
        let inner = scope.define("v");
        assert_eq!(scope.resolve("v").unwrap().index, inner.index);
        scope.define("only_inner");
        scope.pop_scope();

        assert_eq!(scope.resolve("v").unwrap().index, 0);
        assert!(scope.resolve("only_inner").is_none());
        assert_eq!(scope.num_definitions(), 3);
    }

    #[test]
    fn parent_locals_become_free() {
        let mut outer = SymbolScope::enclosed(SymbolScope::global());
        outer.define("x");

        let mut inner = SymbolScope::enclosed(outer);
        let x = inner.resolve("x").unwrap();
        assert_eq!((x.kind, x.index), (SymbolKind::Free, 0));
        assert_eq!(inner.free_symbols()[0].kind, SymbolKind::Local);

        // Resolving again reuses the capture.
        assert_eq!(inner.resolve("x").unwrap().index, 0);
        assert_eq!(inner.free_symbols().len(), 1);
    }

    #[test]
    fn globals_are_not_captured() {
        let mut global = SymbolScope::global();
        global.define("g");

        let mut inner = SymbolScope::enclosed(global);
        assert_eq!(inner.resolve("g").unwrap().kind, SymbolKind::Global);
        assert_eq!(inner.resolve("len").unwrap().kind, SymbolKind::Builtin);
        assert!(inner.free_symbols().is_empty());
    }

    #[test]
    fn capture_is_transitive() {
        let mut a = SymbolScope::enclosed(SymbolScope::global());
        a.define("x");
        let b = SymbolScope::enclosed(a);
        let mut c = SymbolScope::enclosed(b);

        assert_eq!(c.resolve("x").unwrap().kind, SymbolKind::Free);
        assert_eq!(c.free_symbols()[0].kind, SymbolKind::Free);

        let b = c.take_parent().unwrap();
        assert_eq!(b.free_symbols()[0].kind, SymbolKind::Local);
    }

    #[test]
    fn function_name_resolves_to_current_closure() {
        let mut scope = SymbolScope::enclosed(SymbolScope::global());
        scope.define_function_name("fact");
        assert_eq!(scope.resolve("fact").unwrap().kind, SymbolKind::Function);
    }

    #[test]
    fn parameter_overrides_function_name() {
        let mut scope = SymbolScope::enclosed(SymbolScope::global());
        scope.define_function_name("f");
        scope.define("f");
        assert_eq!(scope.resolve("f").unwrap().kind, SymbolKind::Local);
    }

    #[test]
    fn outer_function_name_is_captured() {
        let mut outer = SymbolScope::enclosed(SymbolScope::global());
        outer.define_function_name("walk");

        let mut inner = SymbolScope::enclosed(outer);
        assert_eq!(inner.resolve("walk").unwrap().kind, SymbolKind::Free);
        assert_eq!(inner.free_symbols()[0].kind, SymbolKind::Function);
    }

    #[test]
    fn capture_inside_block_survives_pop() {
        let mut outer = SymbolScope::enclosed(SymbolScope::global());
        outer.define("x");

        let mut inner = SymbolScope::enclosed(outer);
        inner.push_scope();
        inner.resolve("x");
        inner.pop_scope();
        assert_eq!(inner.resolve("x").unwrap().kind, SymbolKind::Free);
        assert_eq!(inner.free_symbols().len(), 1);
    }
}
