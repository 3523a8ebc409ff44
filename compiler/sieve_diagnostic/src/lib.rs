//! Error reporting for the sieve preprocessor.
//!
//! Every failure in the run is fatal, so there is a single error type,
//! [`Error`], shared by the expression engine, the directive machine and
//! the orchestrator. Errors start life without a position (an operator
//! does not know which line it sits on) and pick up context as they unwind:
//!
//! ```text
//! division_by_zero()                         // raised by the `/` operator
//!     .with_source_line("//#if 1/0 == 0")    // attached by the directive machine
//!     .with_chain(vec![inner, outer])        // include stack, innermost first
//! ```
//!
//! The rendered form names the kind, the message, every include frame and
//! the offending line, so a failure deep inside an included file can be
//! located without re-running in verbose mode.

mod error;
mod kind;

pub use error::{
    binary_type_mismatch, cancelled, config_error, division_by_zero, extension_failure,
    io_error, missing_resource, modulo_by_zero, no_matching_signature, parse_error,
    read_only_variable, type_mismatch, unary_type_mismatch, unclosed_block, unknown_variable,
    user_abort, wrong_arg_count, Error, Frame,
};
pub use kind::ErrorKind;

/// Result alias used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;
