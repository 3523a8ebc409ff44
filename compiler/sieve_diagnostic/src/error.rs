//! The positioned error type and its factory functions.
//!
//! Factory functions (e.g. `division_by_zero()`) are the public way to
//! build errors; they fix the kind and the message wording in one place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ErrorKind;

/// One entry of an include chain: a file and a 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    pub file: PathBuf,
    pub line: usize,
}

impl Frame {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Frame {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A fatal preprocessing error.
#[derive(Clone)]
pub struct Error {
    /// Structured category, for matching.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Include chain, innermost frame first. Empty until the directive
    /// machine (or the orchestrator) attaches a position.
    pub chain: Vec<Frame>,
    /// The literal source line being processed when the error occurred.
    pub source_line: Option<String>,
    /// Underlying failure, typically an I/O or XML error.
    pub cause: Option<Cause>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            chain: Vec::new(),
            source_line: None,
            cause: None,
        }
    }

    /// Attach the include chain unless one is already present.
    ///
    /// Errors raised while evaluating an included file already carry the
    /// deeper chain; the outer frames must not overwrite it.
    #[must_use]
    pub fn with_chain(mut self, chain: Vec<Frame>) -> Self {
        if self.chain.is_empty() {
            self.chain = chain;
        }
        self
    }

    /// Attach the offending source line unless one is already present.
    #[must_use]
    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        if self.source_line.is_none() {
            self.source_line = Some(line.into());
        }
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Innermost position, if any.
    pub fn position(&self) -> Option<&Frame> {
        self.chain.first()
    }

    #[inline]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("chain", &self.chain)
            .field("source_line", &self.source_line)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.kind, self.message)?;
        let mut frames = self.chain.iter();
        if let Some(innermost) = frames.next() {
            write!(f, "\n  --> {innermost}")?;
        }
        if let Some(line) = &self.source_line {
            write!(f, "\n   | {line}")?;
        }
        for outer in frames {
            write!(f, "\n   = included from {outer}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n   = cause: {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

// Expression Errors

#[cold]
pub fn parse_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Parse, message)
}

#[cold]
pub fn type_mismatch(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::TypeMismatch, message)
}

/// No rule of a binary operator accepts the operand kinds.
#[cold]
pub fn binary_type_mismatch(op: &str, left: &str, right: &str) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("operator '{op}' cannot be applied to {left} and {right}"),
    )
}

/// No rule of a unary operator accepts the operand kind.
#[cold]
pub fn unary_type_mismatch(op: &str, operand: &str) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("operator '{op}' cannot be applied to {operand}"),
    )
}

/// No overload of a function accepts the argument kinds.
#[cold]
pub fn no_matching_signature(function: &str, kinds: &[&str]) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!(
            "function '{function}' has no signature accepting ({})",
            kinds.join(", ")
        ),
    )
}

#[cold]
pub fn wrong_arg_count(function: &str, expected: usize, got: usize) -> Error {
    Error::new(
        ErrorKind::Parse,
        format!("function '{function}' expects {expected} argument(s), got {got}"),
    )
}

#[cold]
pub fn division_by_zero() -> Error {
    Error::new(ErrorKind::ArithmeticFault, "division by zero")
}

#[cold]
pub fn modulo_by_zero() -> Error {
    Error::new(ErrorKind::ArithmeticFault, "modulo by zero")
}

// Variable Errors

#[cold]
pub fn unknown_variable(name: &str) -> Error {
    Error::new(
        ErrorKind::UnknownVariable,
        format!("unknown variable '{name}'"),
    )
}

#[cold]
pub fn read_only_variable(name: &str) -> Error {
    Error::new(
        ErrorKind::ReadOnlyVariable,
        format!("variable '{name}' is read-only"),
    )
}

// Directive Errors

/// A block opened at `opened_at` (innermost first) was never closed.
#[cold]
pub fn unclosed_block(directive: &str, opened_at: Vec<Frame>) -> Error {
    Error::new(
        ErrorKind::UnclosedBlock,
        format!("'{directive}' is never closed"),
    )
    .with_chain(opened_at)
}

#[cold]
pub fn user_abort(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::UserAbort, message)
}

#[cold]
pub fn extension_failure(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Extension, message)
}

// Resource Errors

#[cold]
pub fn missing_resource(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::MissingResource, message)
}

/// Wrap an I/O failure on `path`.
///
/// Read failures are `MissingResource`; everything else is a file system
/// fault on the destination side.
#[cold]
pub fn io_error(action: &str, path: &Path, err: std::io::Error) -> Error {
    let kind = if action == "read" {
        ErrorKind::MissingResource
    } else {
        ErrorKind::FileSystem
    };
    Error::new(kind, format!("cannot {action} '{}'", path.display())).with_cause(err)
}

#[cold]
pub fn config_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Config, message)
}

#[cold]
pub fn cancelled() -> Error {
    Error::new(ErrorKind::Cancelled, "run cancelled")
}
