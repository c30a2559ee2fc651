//! Code generation options.

/// Settings for a [`PostfixWriter`](crate::PostfixWriter).
///
/// # Example
///
/// ```
/// use til_compiler::CodegenOptions;
///
/// let options = CodegenOptions::default().with_entry_label("start");
/// assert_eq!(options.entry_label, "start");
/// assert_eq!(options.param_base, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Label of the program's entry function
    pub entry_label: String,
    /// Frame offset of the first parameter, past the saved frame pointer
    /// and return address
    pub param_base: i32,
    /// Name prefix of the hidden globals behind conversion wrappers
    pub wrapper_prefix: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            entry_label: "_main".to_string(),
            param_base: 8,
            wrapper_prefix: "_wrapper_target_".to_string(),
        }
    }
}

impl CodegenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }

    pub fn with_param_base(mut self, offset: i32) -> Self {
        self.param_base = offset;
        self
    }

    pub fn with_wrapper_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wrapper_prefix = prefix.into();
        self
    }
}
