//! Resolved-type slots carried by expression nodes.

use std::cell::Cell;

use til_core::Type;

/// The type resolved for an expression node.
///
/// Starts as [`Type::Unspec`]. The type checker writes it; code generation
/// only reads it. Once a slot holds a concrete type it is treated as final
/// and re-checking the node is a no-op.
#[derive(Debug, Default, PartialEq)]
pub struct TypeSlot<'ast>(Cell<Type<'ast>>);

impl<'ast> TypeSlot<'ast> {
    /// A slot that has not been resolved yet.
    pub fn unresolved() -> Self {
        Self(Cell::new(Type::Unspec))
    }

    /// A slot born resolved, for nodes whose type is known at construction.
    pub fn resolved(ty: Type<'ast>) -> Self {
        Self(Cell::new(ty))
    }

    /// Current type.
    #[inline]
    pub fn get(&self) -> Type<'ast> {
        self.0.get()
    }

    /// Record a (re)resolved type.
    #[inline]
    pub fn set(&self, ty: Type<'ast>) {
        self.0.set(ty);
    }

    /// Whether a concrete type has been recorded.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        !self.get().is_unspec()
    }
}
