//! Error categories.

/// Category of a fatal error.
///
/// The category is what callers and tests match on; the human-readable
/// detail lives in [`Error::message`](crate::Error::message).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed expression, unmatched bracket, unknown directive.
    #[error("parse error")]
    Parse,
    /// No operator/function signature accepts the operand kinds, or a
    /// condition did not evaluate to a boolean.
    #[error("type mismatch")]
    TypeMismatch,
    /// Integer division or modulo by zero.
    #[error("arithmetic fault")]
    ArithmeticFault,
    #[error("unknown variable")]
    UnknownVariable,
    /// Write to a variable owned by a read-only namespace.
    #[error("read-only variable")]
    ReadOnlyVariable,
    /// Conditional or loop still open at end of input.
    #[error("unclosed block")]
    UnclosedBlock,
    /// Unreadable include/config/source file, or a stale resource handle.
    #[error("missing resource")]
    MissingResource,
    /// Destination could not be created, cleared or written.
    #[error("file system fault")]
    FileSystem,
    /// Raised on purpose by an `//#error` directive.
    #[error("aborted")]
    UserAbort,
    /// The registered extension rejected an action or a user function.
    #[error("extension failure")]
    Extension,
    /// Invalid option or config file line.
    #[error("configuration error")]
    Config,
    #[error("cancelled")]
    Cancelled,
}
