//! The run-scoped processing context.
//!
//! One [`Context`] owns everything a run mutates: the variable tables,
//! the XML resource arena, the optional extension, the configuration and
//! the cancellation flag. Files are processed one after another through
//! [`Context::process_file`]; globals persist between files, locals do
//! not.

use std::path::Path;

use sieve_diagnostic::{Frame, Result};
use sieve_expr::{evaluate, evaluate_bool, Scope, Site, Value, Variables};

use crate::cancel::CancelToken;
use crate::config::ProcessorConfig;
use crate::exclusion::ExclusionCondition;
use crate::frame::IncludeFrame;
use crate::process::FileRun;

mod builder;

pub use builder::ContextBuilder;

/// Result of processing one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileOutput {
    pub text: String,
    /// Destination file name set by `//#outname`.
    pub outname: Option<String>,
    /// Destination directory set by `//#outdir`, relative to the target root.
    pub outdir: Option<String>,
}

pub struct Context {
    pub(crate) scope: Scope,
    pub(crate) config: ProcessorConfig,
    pub(crate) cancel: CancelToken,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn variables(&self) -> &Variables {
        &self.scope.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.scope.variables
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Evaluate an expression outside any file, e.g. a config-file entry.
    pub fn evaluate(&mut self, text: &str) -> Result<Value> {
        evaluate(text, &mut self.scope.at(Site::default()))
    }

    /// Read `path` and run it through the directive machine.
    pub fn process_file(&mut self, path: &Path) -> Result<FileOutput> {
        self.cancel.check()?;
        let frame = IncludeFrame::load(path)?;
        self.run(frame)
    }

    /// Run in-memory text through the directive machine as if it were the
    /// file at `path`. Includes resolve relative to `path`.
    pub fn process_text(&mut self, path: &Path, text: &str) -> Result<FileOutput> {
        self.cancel.check()?;
        self.run(IncludeFrame::from_text(path, text))
    }

    fn run(&mut self, frame: IncludeFrame) -> Result<FileOutput> {
        tracing::debug!(file = %frame.path.display(), lines = frame.lines.len(), "preprocessing");
        self.scope.variables.clear_locals();
        FileRun::new(self, frame).execute()
    }

    /// Whether any recorded `//#excludeif` condition of a file holds.
    pub fn is_excluded(&mut self, conditions: &[ExclusionCondition]) -> Result<bool> {
        for condition in conditions {
            let site = Site {
                file: Some(&condition.file),
                root: Some(&condition.file),
                line: condition.line,
            };
            let excluded = evaluate_bool(&condition.expression, &mut self.scope.at(site))
                .map_err(|err| {
                    err.with_chain(vec![Frame::new(&condition.file, condition.line)])
                        .with_source_line(condition.source.as_str())
                })?;
            if excluded {
                tracing::debug!(
                    file = %condition.file.display(),
                    line = condition.line,
                    "excluded by //#excludeif"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Release run-scoped resources. Safe to call more than once.
    pub fn close(&mut self) {
        let released = self.scope.resources.clear();
        if released > 0 {
            tracing::debug!(released, "released XML resources");
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("scope", &self.scope)
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
