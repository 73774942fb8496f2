use std::fmt;

/// Errors that abort a preprocessing run.
///
/// Every variant raised while scanning input carries the logical filename
/// and line number of the offending token.
#[derive(Debug)]
pub enum PreprocessError {
    /// An `#endif`, `#else` or `#elif` popped an empty conditional stack.
    MismatchedConditional {
        /// Logical filename of the directive.
        file: String,
        /// Line number of the directive.
        line: usize,
    },
    /// A token outside the recognized grammar appeared where it is fatal.
    UnexpectedToken {
        /// Logical filename of the token.
        file: String,
        /// Line number of the token.
        line: usize,
        /// The offending token, rendered as text.
        token: String,
        /// What was being parsed when the token appeared.
        context: &'static str,
    },
    /// The input ended in the middle of a construct.
    UnexpectedEof {
        /// Logical filename at end of input.
        file: String,
        /// Line number at end of input.
        line: usize,
        /// What was being parsed when the input ended.
        context: &'static str,
    },
    /// A specific punctuation token was required but something else came.
    ExpectedToken {
        /// Logical filename of the mismatch.
        file: String,
        /// Line number of the mismatch.
        line: usize,
        /// The required character.
        expected: char,
        /// The token actually found, rendered as text.
        found: String,
    },
    /// A string or character literal ran into end-of-line or end-of-input.
    UnterminatedLiteral {
        /// Logical filename of the literal.
        file: String,
        /// Line number where the literal started.
        line: usize,
    },
    /// An `#include` target was not found on any include path.
    IncludeNotFound {
        /// Logical filename of the including file.
        file: String,
        /// Line number of the `#include`.
        line: usize,
        /// The requested header name.
        name: String,
    },
    /// An `#error` directive was reached while enabled.
    ErrorDirective {
        /// Logical filename of the directive.
        file: String,
        /// Line number of the directive.
        line: usize,
        /// The directive's message text.
        message: String,
    },
    /// A symbol already defined to a constant was redefined to a
    /// non-constant value.
    ConstantRedefined {
        /// Logical filename of the redefinition.
        file: String,
        /// Line number of the redefinition.
        line: usize,
        /// The symbol being redefined.
        name: String,
        /// The new, non-constant value.
        value: String,
    },
    /// A macro body referenced a parameter with no matching argument.
    MacroArgMismatch {
        /// Logical filename of the invocation.
        file: String,
        /// Line number of the invocation.
        line: usize,
        /// The macro being invoked.
        name: String,
    },
    /// I/O error reading an input or included file, or writing output.
    Io(std::io::Error),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::MismatchedConditional { file, line } => {
                write!(f, "{file}:{line}: mismatched #ifdef/#endif pairs")
            }
            PreprocessError::UnexpectedToken {
                file,
                line,
                token,
                context,
            } => {
                write!(f, "{file}:{line}: unexpected token '{token}' while parsing {context}")
            }
            PreprocessError::UnexpectedEof { file, line, context } => {
                write!(f, "{file}:{line}: unexpected end of file while parsing {context}")
            }
            PreprocessError::ExpectedToken {
                file,
                line,
                expected,
                found,
            } => {
                write!(f, "{file}:{line}: expected token '{expected}' but got '{found}'")
            }
            PreprocessError::UnterminatedLiteral { file, line } => {
                write!(f, "{file}:{line}: unterminated string or character literal")
            }
            PreprocessError::IncludeNotFound { file, line, name } => {
                write!(f, "{file}:{line}: can't find #include file \"{name}\"")
            }
            PreprocessError::ErrorDirective { file, line, message } => {
                write!(f, "{file}:{line}: #error {message}")
            }
            PreprocessError::ConstantRedefined {
                file,
                line,
                name,
                value,
            } => {
                write!(
                    f,
                    "{file}:{line}: cannot redefine constant symbol \"{name}\" to non-constant \"{value}\""
                )
            }
            PreprocessError::MacroArgMismatch { file, line, name } => {
                write!(f, "{file}:{line}: missing argument in invocation of macro \"{name}\"")
            }
            PreprocessError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for PreprocessError {}

impl From<std::io::Error> for PreprocessError {
    fn from(err: std::io::Error) -> Self {
        PreprocessError::Io(err)
    }
}
