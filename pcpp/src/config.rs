use std::path::PathBuf;

/// Configuration for the preprocessor.
#[derive(Clone, Debug, Default)]
pub struct PreprocessorConfig {
    /// Directories searched, in order, when resolving an `#include`.
    pub include_paths: Vec<PathBuf>,
    /// Emit directive-state trace output through the `log` facade.
    pub debug: bool,
    /// Mirror everything written to the output sink onto standard error.
    pub echo_to_stderr: bool,
}

impl PreprocessorConfig {
    /// Create an empty configuration: no include paths, tracing off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one directory to the include search path.
    #[must_use]
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Enable directive-state tracing.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Mirror emitted output onto standard error.
    #[must_use]
    pub const fn with_echo_to_stderr(mut self, echo: bool) -> Self {
        self.echo_to_stderr = echo;
        self
    }
}
