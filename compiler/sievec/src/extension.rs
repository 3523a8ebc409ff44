//! Extensions shipped with the driver.

use sieve_diagnostic::{extension_failure, Result};
use sieve_expr::{Extension, Value};

/// `--extension=log`: writes `//#action` arguments to the log and
/// provides `$log(x)`, which logs `x` and returns it unchanged.
#[derive(Debug, Default)]
pub struct LoggingExtension {
    actions: usize,
}

impl LoggingExtension {
    /// Number of `//#action` directives handled so far.
    pub fn actions(&self) -> usize {
        self.actions
    }
}

impl Extension for LoggingExtension {
    fn action(&mut self, args: &[Value]) -> Result<()> {
        self.actions += 1;
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        tracing::info!(target: "sieve::action", "{}", rendered.join(", "));
        Ok(())
    }

    fn user_function_arity(&self, name: &str) -> Option<usize> {
        (name == "log").then_some(1)
    }

    fn call_user_function(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        match (name, args) {
            ("log", [value]) => {
                tracing::info!(target: "sieve::action", "{value}");
                Ok(value.clone())
            }
            _ => Err(extension_failure(format!(
                "user function '${name}' is not provided by the log extension"
            ))),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use sieve_expr::{evaluate, Scope, Site, Variables};

    #[test]
    fn test_log_function_returns_its_argument() {
        let mut scope = Scope::new(Variables::new());
        scope.extension = Some(Box::new(LoggingExtension::default()));
        let value = evaluate("$log(1 + 2) * 2", &mut scope.at(Site::default())).unwrap();
        assert_eq!(value.to_string(), "6");
    }

    #[test]
    fn test_action_counts() {
        let mut extension = LoggingExtension::default();
        extension
            .action(&[Value::string("a"), Value::Int(1)])
            .unwrap();
        assert_eq!(extension.actions(), 1);
        assert!(extension.user_function_arity("other").is_none());
    }
}
