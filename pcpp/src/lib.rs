#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # Pseudo-C-Preprocessor Library
//!
//! This library provides a minimal pseudo-C-preprocessor designed in
//! particular to preserve `#define` statements defining constants so they
//! can be observed by a downstream glue-code generator, while fully
//! processing `#include` and conditional-compilation directives.
//!
//! ## Features
//!
//! - Include resolution against an ordered search path
//! - Comment stripping (`//` and `/* */`) with accurate line accounting
//! - Constant `#define` collection and re-emission as `# define NAME VALUE`
//! - Simple parameterized macro expansion
//! - Conditional compilation (`#if`, `#ifdef`, `#ifndef`, `#elif`, `#else`,
//!   `#endif`) with a pragmatic, fail-closed expression evaluator
//! - Synthetic `# <line> "<file>"` markers so the consumer can report
//!   accurate source positions
//!
//! ## Example
//!
//! ```rust,no_run
//! use pcpp::{preprocess_str, PreprocessorConfig};
//!
//! let code = r#"
//! #define GL_VERSION_1_2 1
//! #if defined(GL_VERSION_1_2)
//! void glFoo(int bar);
//! #endif
//! "#;
//!
//! let config = PreprocessorConfig::new().with_include_path("/usr/include/GL");
//! let result = preprocess_str(code, "gl.h", &config).unwrap();
//! println!("{}", result);
//! ```

mod config;
mod defines;
mod error;
mod lexer;
mod preprocessor;
mod token;

pub use config::PreprocessorConfig;
pub use defines::Macro;
pub use error::PreprocessError;
pub use preprocessor::Preprocessor;
pub use token::{is_identifier, is_number};

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

/// A cloneable in-memory sink, so the caller can keep a handle to the bytes
/// the preprocessor writes.
#[derive(Clone, Default)]
struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl SharedSink {
    fn take_string(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Preprocess a source string under the logical name `filename` and return
/// the emitted stream.
///
/// # Errors
/// Returns `PreprocessError` if the input has malformed directives,
/// mismatched conditionals, unresolvable includes, or hits an `#error`
/// directive in an enabled region.
pub fn preprocess_str(
    input: &str,
    filename: &str,
    config: &PreprocessorConfig,
) -> Result<String, PreprocessError> {
    let sink = SharedSink::default();
    let mut preprocessor = Preprocessor::with_config(config);
    preprocessor.set_output(Box::new(sink.clone()));
    preprocessor.run(input, filename)?;
    Ok(sink.take_string())
}

/// Preprocess a file on disk and return the emitted stream. The file's path
/// becomes its logical name in line markers and diagnostics.
///
/// # Errors
/// Returns `PreprocessError` if the file cannot be read or if preprocessing
/// fails.
pub fn preprocess_file_to_string<P: AsRef<Path>>(
    input_path: P,
    config: &PreprocessorConfig,
) -> Result<String, PreprocessError> {
    let path = input_path.as_ref();
    let input = std::fs::read_to_string(path)?;
    preprocess_str(&input, &path.to_string_lossy(), config)
}
