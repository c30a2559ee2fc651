//! Symbols and nested lexical scopes.
//!
//! The table is a stack of scopes. Index 0 is the global scope, which is
//! never popped; every function body and block pushes one more. The reserved
//! name [`FUNCTION_SYMBOL`] is bound in each function's parameter scope and
//! always resolves to the nearest enclosing function.

use rustc_hash::FxHashMap;
use til_core::{Qualifier, Type};

/// Reserved name of the function currently being defined.
pub const FUNCTION_SYMBOL: &str = "@";

/// Depth of the outermost function scope.
pub const FUNCTION_DEPTH: usize = 1;

// ============================================================================
// Symbol
// ============================================================================

/// A declared name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol<'ast> {
    /// Name, unique within its scope
    pub name: &'ast str,
    /// Resolved type
    pub ty: Type<'ast>,
    /// Linkage/visibility qualifier
    pub qualifier: Qualifier,
    /// Frame offset; 0 for global storage
    pub offset: i32,
    /// Whether this names the program's entry function
    pub is_main: bool,
}

impl<'ast> Symbol<'ast> {
    /// Create a symbol with global storage.
    pub fn new(name: &'ast str, ty: Type<'ast>, qualifier: Qualifier) -> Self {
        Self {
            name,
            ty,
            qualifier,
            offset: 0,
            is_main: false,
        }
    }

    /// The `@` binding for a function being defined.
    pub fn function(ty: Type<'ast>, is_main: bool) -> Self {
        Self {
            is_main,
            ..Self::new(FUNCTION_SYMBOL, ty, Qualifier::None)
        }
    }

    /// Whether the symbol lives in global storage rather than a frame.
    #[inline]
    pub fn is_global(&self) -> bool {
        self.offset == 0
    }

    /// Whether the symbol is supplied by the runtime or another unit.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.qualifier == Qualifier::External
    }
}

// ============================================================================
// SymbolTable
// ============================================================================

/// Stack of scopes mapping names to symbols.
#[derive(Debug)]
pub struct SymbolTable<'ast> {
    scopes: Vec<FxHashMap<&'ast str, Symbol<'ast>>>,
}

impl<'ast> SymbolTable<'ast> {
    /// A table holding only the (empty) global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Open a new innermost scope.
    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Discard the innermost scope and everything declared in it.
    ///
    /// The global scope stays.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Index of the innermost scope (0 = global).
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bind a symbol in the innermost scope.
    ///
    /// Returns `false`, leaving the table untouched, if the name is already
    /// bound in that scope.
    pub fn insert(&mut self, symbol: Symbol<'ast>) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(symbol.name) {
            return false;
        }
        scope.insert(symbol.name, symbol);
        true
    }

    /// Overwrite the innermost existing binding of `symbol.name`.
    ///
    /// Returns `false` if the name is not bound anywhere.
    pub fn replace(&mut self, symbol: Symbol<'ast>) -> bool {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(symbol.name))
        {
            Some(slot) => {
                *slot = symbol;
                true
            }
            None => false,
        }
    }

    /// Look a name up, innermost scope first.
    pub fn find(&self, name: &str) -> Option<Symbol<'ast>> {
        self.find_from(name, 0)
    }

    /// Look a name up in scopes at depth `min_depth` or deeper.
    pub fn find_from(&self, name: &str, min_depth: usize) -> Option<Symbol<'ast>> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .take_while(|(depth, _)| *depth >= min_depth)
            .find_map(|(_, scope)| scope.get(name).copied())
    }

    /// Look a name up in the innermost scope only.
    pub fn find_local(&self, name: &str) -> Option<Symbol<'ast>> {
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }

    /// The nearest enclosing function's `@` binding.
    pub fn enclosing_function(&self) -> Option<Symbol<'ast>> {
        self.find_from(FUNCTION_SYMBOL, FUNCTION_DEPTH)
    }
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(name: &str) -> Symbol<'_> {
        Symbol::new(name, Type::Int, Qualifier::None)
    }

    #[test]
    fn starts_at_global_scope() {
        let table = SymbolTable::new();
        assert_eq!(table.depth(), 0);
        assert!(table.find("x").is_none());
    }

    #[test]
    fn insert_rejects_duplicates_in_same_scope() {
        let mut table = SymbolTable::new();
        assert!(table.insert(int("x")));
        assert!(!table.insert(Symbol::new("x", Type::Double, Qualifier::None)));
        assert_eq!(table.find("x").map(|s| s.ty), Some(Type::Int));
    }

    #[test]
    fn shadowing_is_scoped() {
        let mut table = SymbolTable::new();
        table.insert(int("x"));
        table.push();
        assert!(table.insert(Symbol::new("x", Type::Double, Qualifier::None)));
        assert_eq!(table.find("x").map(|s| s.ty), Some(Type::Double));
        table.pop();
        assert_eq!(table.find("x").map(|s| s.ty), Some(Type::Int));
    }

    #[test]
    fn replace_targets_innermost_binding() {
        let mut table = SymbolTable::new();
        table.insert(int("x"));
        table.push();
        table.insert(int("x"));
        assert!(table.replace(Symbol::new("x", Type::String, Qualifier::None)));
        assert_eq!(table.find("x").map(|s| s.ty), Some(Type::String));
        table.pop();
        assert_eq!(table.find("x").map(|s| s.ty), Some(Type::Int));
        assert!(!table.replace(int("missing")));
    }

    #[test]
    fn find_from_skips_shallow_scopes() {
        let mut table = SymbolTable::new();
        table.insert(int("g"));
        table.push();
        table.insert(int("p"));
        assert!(table.find_from("g", 1).is_none());
        assert!(table.find_from("p", 1).is_some());
        assert!(table.find_local("g").is_none());
    }

    #[test]
    fn enclosing_function_is_innermost() {
        let mut table = SymbolTable::new();
        table.push();
        table.insert(Symbol::function(Type::Int, true));
        table.push();
        table.push();
        table.insert(Symbol::function(Type::Double, false));
        let at = table.enclosing_function().unwrap();
        assert_eq!(at.ty, Type::Double);
        assert!(!at.is_main);
        table.pop();
        let at = table.enclosing_function().unwrap();
        assert!(at.is_main);
    }

    #[test]
    fn global_scope_survives_pop() {
        let mut table = SymbolTable::new();
        table.insert(int("g"));
        table.pop();
        assert_eq!(table.depth(), 0);
        assert!(table.find("g").is_some());
    }

    #[test]
    fn globality_follows_offset() {
        let mut sym = int("x");
        assert!(sym.is_global());
        sym.offset = -4;
        assert!(!sym.is_global());
    }
}
