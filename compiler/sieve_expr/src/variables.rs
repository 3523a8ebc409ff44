//! Variable tables and name resolution.
//!
//! Names are case-insensitive and stored lower-cased. A read looks at
//! local variables, then global variables, then each special namespace
//! in registration order. A write to a name some namespace owns goes to
//! that namespace, which normally refuses it.

use std::path::Path;

use rustc_hash::FxHashMap;
use sieve_diagnostic::{config_error, unknown_variable, Result};

use crate::value::Value;

mod special;

pub use special::{EngineNamespace, EnvNamespace, FileNamespace, PropertyNamespace};

/// Position the expression is evaluated at, for file metadata variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct Site<'a> {
    /// File being processed (the innermost include frame).
    pub file: Option<&'a Path>,
    /// Outermost file of the current include chain.
    pub root: Option<&'a Path>,
    /// 1-based line number.
    pub line: usize,
}

/// A family of computed, usually read-only, variables.
pub trait SpecialVariables {
    /// Short label for logs.
    fn namespace(&self) -> &'static str;

    /// Whether reads and writes of `name` belong to this namespace.
    fn owns(&self, name: &str) -> bool;

    /// Current value of `name`, or `None` when it has no value here.
    fn get(&self, name: &str, site: &Site<'_>) -> Option<Value>;

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let _ = value;
        Err(sieve_diagnostic::read_only_variable(name))
    }
}

/// What reading an unknown name yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Fail with `UnknownVariable`.
    #[default]
    Strict,
    /// Evaluate to `false`.
    Permissive,
}

/// Whether `name` may be assigned: a letter or `_` followed by letters,
/// digits, `_` or `.`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

pub struct Variables {
    locals: FxHashMap<String, Value>,
    globals: FxHashMap<String, Value>,
    namespaces: Vec<Box<dyn SpecialVariables>>,
    unknown: UnknownPolicy,
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl Variables {
    /// Tables with the file, engine and environment namespaces.
    pub fn new() -> Self {
        let mut variables = Self::bare();
        variables.register(Box::new(FileNamespace));
        variables.register(Box::new(EngineNamespace::default()));
        variables.register(Box::new(EnvNamespace));
        variables
    }

    /// Tables with no namespaces at all.
    pub fn bare() -> Self {
        Variables {
            locals: FxHashMap::default(),
            globals: FxHashMap::default(),
            namespaces: Vec::new(),
            unknown: UnknownPolicy::Strict,
        }
    }

    pub fn register(&mut self, namespace: Box<dyn SpecialVariables>) {
        tracing::trace!(namespace = namespace.namespace(), "registered variable namespace");
        self.namespaces.push(namespace);
    }

    pub fn set_unknown_policy(&mut self, policy: UnknownPolicy) {
        self.unknown = policy;
    }

    pub fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown
    }

    /// Resolve without applying the unknown-name policy.
    pub fn lookup(&self, name: &str, site: &Site<'_>) -> Option<Value> {
        let name = name.to_lowercase();
        if let Some(value) = self.locals.get(&name).or_else(|| self.globals.get(&name)) {
            return Some(value.clone());
        }
        self.namespaces
            .iter()
            .filter(|ns| ns.owns(&name))
            .find_map(|ns| ns.get(&name, site))
    }

    pub fn get(&self, name: &str, site: &Site<'_>) -> Result<Value> {
        match self.lookup(name, site) {
            Some(value) => Ok(value),
            None if self.unknown == UnknownPolicy::Permissive => Ok(Value::Bool(false)),
            None => Err(unknown_variable(name)),
        }
    }

    pub fn is_defined(&self, name: &str, site: &Site<'_>) -> bool {
        self.lookup(name, site).is_some()
    }

    pub fn set_local(&mut self, name: &str, value: Value) -> Result<()> {
        let name = name.to_lowercase();
        if let Some(ns) = self.owner_mut(&name) {
            return ns.set(&name, value);
        }
        self.locals.insert(name, value);
        Ok(())
    }

    pub fn set_global(&mut self, name: &str, value: Value) -> Result<()> {
        let name = name.to_lowercase();
        if let Some(ns) = self.owner_mut(&name) {
            return ns.set(&name, value);
        }
        self.globals.insert(name, value);
        Ok(())
    }

    /// Define a global from the command line or a config file. Defining
    /// the same name twice there is an error.
    pub fn define_global(&mut self, name: &str, value: Value) -> Result<()> {
        if self.globals.contains_key(&name.to_lowercase()) {
            return Err(config_error(format!("global variable '{name}' is already defined")));
        }
        self.set_global(name, value)
    }

    /// Remove a local and a global of this name; true if either existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        let local = self.locals.remove(&name).is_some();
        let global = self.globals.remove(&name).is_some();
        local || global
    }

    /// Forget local variables; done when a new top-level file starts.
    pub fn clear_locals(&mut self) {
        self.locals.clear();
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(&name.to_lowercase())
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(&name.to_lowercase())
    }

    /// Globals sorted by name.
    pub fn globals(&self) -> Vec<(&str, &Value)> {
        let mut globals: Vec<_> = self.globals.iter().map(|(k, v)| (k.as_str(), v)).collect();
        globals.sort_unstable_by_key(|(name, _)| *name);
        globals
    }

    fn owner_mut(&mut self, name: &str) -> Option<&mut Box<dyn SpecialVariables>> {
        self.namespaces.iter_mut().find(|ns| ns.owns(name))
    }
}

impl std::fmt::Debug for Variables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variables")
            .field("locals", &self.locals)
            .field("globals", &self.globals)
            .field(
                "namespaces",
                &self.namespaces.iter().map(|ns| ns.namespace()).collect::<Vec<_>>(),
            )
            .field("unknown", &self.unknown)
            .finish()
    }
}
