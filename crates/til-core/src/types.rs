//! Type - the value types of the language.
//!
//! Types are small `Copy` values. Compound types (pointers and functions)
//! borrow their components from an arena (or from `'static` data), so a
//! type can be stored in a node slot or a symbol without any allocation of
//! its own.
//!
//! # Example
//!
//! ```
//! use til_core::{FunctionType, Type};
//!
//! // int!
//! let ptr = Type::Pointer(&Type::Int);
//! assert_eq!(ptr.to_string(), "int!");
//!
//! // double<int>
//! let sig = FunctionType::new(&[Type::Int], Type::Double);
//! assert_eq!(Type::Function(&sig).to_string(), "double<int>");
//! ```

use std::fmt::{self, Display, Formatter};

/// Size in bytes of an integer value.
pub const INT_SIZE: u32 = 4;
/// Size in bytes of a double value.
pub const DOUBLE_SIZE: u32 = 8;
/// Size in bytes of any address (strings, pointers, functions).
pub const POINTER_SIZE: u32 = 4;

/// A value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type<'a> {
    /// 32-bit signed integer, also used for booleans.
    Int,
    /// 64-bit floating point.
    Double,
    /// Address of a read-only character sequence.
    String,
    /// No value.
    Void,
    /// Not resolved yet.
    #[default]
    Unspec,
    /// Address of a value of the referenced type.
    Pointer(&'a Type<'a>),
    /// Address of a function.
    Function(&'a FunctionType<'a>),
}

/// Signature of a function value: ordered inputs and a single output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionType<'a> {
    /// Parameter types, in declaration order.
    pub inputs: &'a [Type<'a>],
    /// Result type.
    pub output: Type<'a>,
}

impl<'a> FunctionType<'a> {
    /// Create a signature.
    pub const fn new(inputs: &'a [Type<'a>], output: Type<'a>) -> Self {
        Self { inputs, output }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Type of the parameter at `index`, if any.
    pub fn input(&self, index: usize) -> Option<Type<'a>> {
        self.inputs.get(index).copied()
    }
}

impl<'a> Type<'a> {
    /// Pointer to an unresolved type, the type of `null` and `objects`.
    pub const UNSPEC_POINTER: Type<'static> = Type::Pointer(&Type::Unspec);
    /// Pointer to int, the default refinement of an unresolved pointer.
    pub const INT_POINTER: Type<'static> = Type::Pointer(&Type::Int);

    /// Storage size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Type::Int => INT_SIZE,
            Type::Double => DOUBLE_SIZE,
            Type::String | Type::Pointer(_) | Type::Function(_) => POINTER_SIZE,
            Type::Void | Type::Unspec => 0,
        }
    }

    /// Whether this is the unresolved placeholder.
    #[inline]
    pub fn is_unspec(&self) -> bool {
        matches!(self, Type::Unspec)
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int)
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        matches!(self, Type::Double)
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    /// The referenced type of a pointer.
    pub fn referenced(&self) -> Option<Type<'a>> {
        match self {
            Type::Pointer(inner) => Some(**inner),
            _ => None,
        }
    }

    /// The signature of a function type.
    pub fn signature(&self) -> Option<&'a FunctionType<'a>> {
        match self {
            Type::Function(sig) => Some(*sig),
            _ => None,
        }
    }

    /// Whether this is a pointer whose referenced type is still open to
    /// refinement by context (`unspec!` or `void!`).
    pub fn is_generic_pointer(&self) -> bool {
        matches!(self.referenced(), Some(Type::Unspec | Type::Void))
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Unspec => write!(f, "unspec"),
            Type::Pointer(inner) => write!(f, "{}!", inner),
            Type::Function(sig) => write!(f, "{}", sig),
        }
    }
}

impl Display for FunctionType<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.output)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", input)?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_sizes() {
        assert_eq!(Type::Int.size(), 4);
        assert_eq!(Type::Double.size(), 8);
        assert_eq!(Type::String.size(), 4);
        assert_eq!(Type::Void.size(), 0);
        assert_eq!(Type::Unspec.size(), 0);
    }

    #[test]
    fn compound_sizes() {
        let sig = FunctionType::new(&[Type::Double, Type::Double], Type::Double);
        assert_eq!(Type::Pointer(&Type::Double).size(), 4);
        assert_eq!(Type::Function(&sig).size(), 4);
    }

    #[test]
    fn structural_equality() {
        let a = Type::Pointer(&Type::Int);
        let inner = Type::Int;
        let b = Type::Pointer(&inner);
        assert_eq!(a, b);
        assert_ne!(a, Type::Pointer(&Type::Double));
    }

    #[test]
    fn generic_pointers() {
        assert!(Type::UNSPEC_POINTER.is_generic_pointer());
        assert!(Type::Pointer(&Type::Void).is_generic_pointer());
        assert!(!Type::INT_POINTER.is_generic_pointer());
        assert!(!Type::Int.is_generic_pointer());
    }

    #[test]
    fn display_nested() {
        let sig = FunctionType::new(&[Type::Pointer(&Type::Int), Type::String], Type::Void);
        assert_eq!(Type::Function(&sig).to_string(), "void<int!,string>");
        assert_eq!(Type::Pointer(&Type::Pointer(&Type::Double)).to_string(), "double!!");
    }

    #[test]
    fn accessors() {
        let sig = FunctionType::new(&[Type::Int], Type::Double);
        let ty = Type::Function(&sig);
        assert_eq!(ty.signature().map(|s| s.arity()), Some(1));
        assert_eq!(sig.input(0), Some(Type::Int));
        assert_eq!(sig.input(1), None);
        assert_eq!(Type::INT_POINTER.referenced(), Some(Type::Int));
        assert_eq!(Type::Int.referenced(), None);
    }
}
