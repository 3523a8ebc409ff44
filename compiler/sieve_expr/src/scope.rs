//! Run-scoped state that expressions evaluate against.

use std::path::{Path, PathBuf};

use sieve_diagnostic::{extension_failure, parse_error, wrong_arg_count, Result};

use crate::eval::Environment;
use crate::extension::Extension;
use crate::resource::ResourceRegistry;
use crate::value::Value;
use crate::variables::{Site, Variables};

/// Variables, resources and the optional extension of one run.
#[derive(Default)]
pub struct Scope {
    pub variables: Variables,
    pub resources: ResourceRegistry,
    pub extension: Option<Box<dyn Extension>>,
}

impl Scope {
    pub fn new(variables: Variables) -> Self {
        Scope {
            variables,
            resources: ResourceRegistry::new(),
            extension: None,
        }
    }

    /// View of this scope positioned at `site`, usable as an
    /// [`Environment`].
    pub fn at<'s>(&'s mut self, site: Site<'s>) -> ScopeAt<'s> {
        ScopeAt { scope: self, site }
    }

    /// Forward `//#action` arguments to the extension.
    pub fn action(&mut self, args: &[Value]) -> Result<()> {
        match self.extension.as_mut() {
            Some(extension) => extension.action(args),
            None => Err(extension_failure(
                "'//#action' needs an extension, but none is registered",
            )),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("variables", &self.variables)
            .field("resources", &self.resources.len())
            .field("extension", &self.extension.is_some())
            .finish()
    }
}

pub struct ScopeAt<'a> {
    scope: &'a mut Scope,
    site: Site<'a>,
}

impl ScopeAt<'_> {
    fn base_dir(&self) -> Option<&Path> {
        self.site.file.and_then(Path::parent)
    }
}

impl Environment for ScopeAt<'_> {
    fn variable(&self, name: &str) -> Result<Value> {
        self.scope.variables.get(name, &self.site)
    }

    fn is_defined(&self, name: &str) -> bool {
        self.scope.variables.is_defined(name, &self.site)
    }

    fn resources(&mut self) -> &mut ResourceRegistry {
        &mut self.scope.resources
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn call_user_function(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let Some(extension) = self.scope.extension.as_mut() else {
            return Err(extension_failure(format!(
                "user function '${name}' needs an extension, but none is registered"
            )));
        };
        match extension.user_function_arity(name) {
            None => Err(parse_error(format!("unknown user function '${name}'"))),
            Some(arity) if arity != args.len() => {
                Err(wrong_arg_count(&format!("${name}"), arity, args.len()))
            }
            Some(_) => extension.call_user_function(name, args),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
