//! Error types for stylesheet compilation.
//!
//! Every failure aborts the current compile; there is no local recovery.
//! The only soft fallbacks (missing imports, disabled imports) never reach
//! this module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing or compiling a stylesheet.
///
/// # Examples
///
/// ```rust
/// use lessc::{compile, CompileError};
///
/// let err = compile(".selector { .missing-mixin; }").unwrap_err();
/// assert!(matches!(err, CompileError::UnresolvedMixin(_)));
/// assert_eq!(err.to_string(), ".missing-mixin is undefined");
/// ```
#[derive(Error, Debug)]
pub enum CompileError {
    /// No grammar rule matched at the current position.
    #[error("parse error: failed to parse line {line}{}: `{text}`", in_file(.file))]
    Syntax {
        /// 1-based line of the offending construct.
        line: usize,
        /// Text of the offending line.
        text: String,
        /// Source file name, when known.
        file: Option<String>,
    },

    /// A variable reference that no scope frame binds.
    #[error("variable {0} is undefined")]
    UnresolvedVariable(String),

    /// A mixin invocation or accessor path that resolves to no block.
    #[error("{0} is undefined")]
    UnresolvedMixin(String),

    /// A variable whose value refers back to itself with no older binding.
    #[error("variable {0} refers to itself")]
    RecursiveVariable(String),

    /// Division or remainder by zero.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// End of input reached with blocks still open.
    #[error("parse error: unclosed block at end of {}", .file.as_deref().unwrap_or("input"))]
    UnclosedBlock {
        /// Source file name, when known.
        file: Option<String>,
    },

    /// An import resolved to a file that could not be read.
    #[error("failed to read import {}", .path.display())]
    ImportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn in_file(file: &Option<String>) -> String {
    match file {
        Some(name) => format!(" of {name}"),
        None => String::new(),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompileError>;
