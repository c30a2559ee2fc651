//! Structural type compatibility.
//!
//! [`compatible`] decides every implicit coercion in both passes: assignment,
//! initialization, argument passing and returns. [`needs_wrapper`] decides,
//! for a compatible pair of function types, whether storing the source in a
//! target slot requires a conversion thunk.

use til_core::Type;

/// Whether a value of type `source` may be stored where `target` is expected.
///
/// - `Unspec` on either side is never compatible.
/// - Pointers compare their referenced types strictly, whatever `lax` says.
/// - Functions need equal arity; inputs and output are compared pairwise,
///   target against source, so a function over `int` fits a slot for a
///   function over `double`. A function-typed input or output must match
///   exactly: wrappers only convert scalars at the outer boundary.
/// - With `lax`, an `int` fits a `double` target.
/// - Anything else must be identical.
pub fn compatible(target: Type<'_>, source: Type<'_>, lax: bool) -> bool {
    match (target, source) {
        (Type::Unspec, _) | (_, Type::Unspec) => false,
        (Type::Function(t), Type::Function(s)) => {
            t.arity() == s.arity()
                && t.inputs
                    .iter()
                    .zip(s.inputs)
                    .all(|(ti, si)| component(*ti, *si, lax))
                && component(t.output, s.output, lax)
        }
        (Type::Function(_), _) | (_, Type::Function(_)) => false,
        (Type::Pointer(t), Type::Pointer(s)) => compatible(*t, *s, false),
        (Type::Pointer(_), _) | (_, Type::Pointer(_)) => false,
        (Type::Double, Type::Int) => lax,
        (t, s) => t == s,
    }
}

/// One position of a function signature.
fn component(target: Type<'_>, source: Type<'_>, lax: bool) -> bool {
    compatible(target, source, lax && !target.is_function())
}

/// Whether storing a `source` function in a `target` slot needs a wrapper
/// that converts between `int` and `double` at the boundary.
///
/// Only meaningful for function pairs already known to be [`compatible`].
pub fn needs_wrapper(target: Type<'_>, source: Type<'_>) -> bool {
    let (Some(t), Some(s)) = (target.signature(), source.signature()) else {
        return false;
    };
    if t.output.is_double() && s.output.is_int() {
        return true;
    }
    t.inputs
        .iter()
        .zip(s.inputs)
        .any(|(ti, si)| ti.is_double() && si.is_int())
}
