//! Host extension hook.
//!
//! An extension receives `//#action` directives and answers `$name(...)`
//! user function calls. It is registered explicitly by whoever builds the
//! processing context; there is no discovery by name.

use sieve_diagnostic::{extension_failure, Result};

use crate::value::Value;

pub trait Extension {
    /// Handle `//#action a, b, ...` with the evaluated arguments.
    fn action(&mut self, args: &[Value]) -> Result<()>;

    /// Number of arguments `$name(...)` takes, or `None` if unknown.
    fn user_function_arity(&self, name: &str) -> Option<usize> {
        let _ = name;
        None
    }

    /// Run a user function. Called only after the arity was checked.
    fn call_user_function(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let _ = args;
        Err(extension_failure(format!(
            "user function '${name}' is not provided by the extension"
        )))
    }
}
