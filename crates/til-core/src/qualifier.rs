//! Declaration qualifiers.

use std::fmt::{self, Display, Formatter};

/// Linkage/visibility qualifier of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Qualifier {
    /// No qualifier: module-private storage.
    #[default]
    None,
    /// Exported symbol.
    Public,
    /// Explicitly private symbol.
    Private,
    /// Declared here, defined later in the same module.
    Forward,
    /// Foreign function supplied by the runtime or linker.
    External,
}

impl Qualifier {
    /// Whether the declaration only names a symbol that is defined elsewhere.
    pub fn is_declaration_only(&self) -> bool {
        matches!(self, Qualifier::Forward | Qualifier::External)
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::None => Ok(()),
            Qualifier::Public => write!(f, "public"),
            Qualifier::Private => write!(f, "private"),
            Qualifier::Forward => write!(f, "forward"),
            Qualifier::External => write!(f, "external"),
        }
    }
}
