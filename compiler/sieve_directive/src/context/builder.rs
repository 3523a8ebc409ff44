//! `ContextBuilder` for assembling a [`Context`] with its collaborators.

use sieve_expr::{Extension, Scope, SpecialVariables, UnknownPolicy, Variables};

use super::Context;
use crate::cancel::CancelToken;
use crate::config::ProcessorConfig;

/// Builder for [`Context`].
///
/// Extensions and extra variable namespaces are registered here,
/// explicitly; nothing is discovered at run time.
#[derive(Default)]
pub struct ContextBuilder {
    config: ProcessorConfig,
    variables: Option<Variables>,
    namespaces: Vec<Box<dyn SpecialVariables>>,
    unknown: UnknownPolicy,
    extension: Option<Box<dyn Extension>>,
    cancel: Option<CancelToken>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from prepared variable tables instead of the standard ones.
    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Add a namespace after the standard file, engine and environment ones.
    #[must_use]
    pub fn namespace(mut self, namespace: Box<dyn SpecialVariables>) -> Self {
        self.namespaces.push(namespace);
        self
    }

    #[must_use]
    pub fn unknown_variables(mut self, policy: UnknownPolicy) -> Self {
        self.unknown = policy;
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: Box<dyn Extension>) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Share a cancellation flag with the caller.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Context {
        let mut variables = self.variables.unwrap_or_default();
        for namespace in self.namespaces {
            variables.register(namespace);
        }
        variables.set_unknown_policy(self.unknown);

        let mut scope = Scope::new(variables);
        scope.extension = self.extension;

        Context {
            scope,
            config: self.config,
            cancel: self.cancel.unwrap_or_default(),
        }
    }
}
