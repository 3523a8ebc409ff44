//! Config files and global definitions.
//!
//! A config file holds one entry per line:
//!
//! ```text
//! # comment
//! --keep-lines              flag, same grammar as the command line
//! -D LEGACY
//! target = "web"            global variable; the value is an expression
//! ```
//!
//! Lines starting with `@` are reserved and rejected. Definitions are kept
//! in order and evaluated by [`define_globals`], each against the globals
//! defined before it.

use std::path::{Path, PathBuf};

use sieve_diagnostic::{config_error, io_error, Error, Frame, Result};
use sieve_directive::Context;
use sieve_expr::{is_valid_name, Value};

use crate::options::{Definition, DefinitionSource, Options};

/// Load every config file named in `options`, including those named by
/// other config files. A file may be loaded only once.
pub fn load_configs(options: &mut Options) -> Result<()> {
    let mut loaded: Vec<PathBuf> = Vec::new();
    let mut next = 0;
    while let Some(path) = options.configs.get(next).cloned() {
        next += 1;
        let identity = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if loaded.contains(&identity) {
            return Err(config_error(format!(
                "config file '{}' is loaded more than once",
                path.display()
            )));
        }
        loaded.push(identity);

        let text = std::fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
        tracing::debug!(file = %path.display(), "loading config");
        apply_config(options, &path, &text)?;
    }
    Ok(())
}

/// Apply the entries of one config file.
pub fn apply_config(options: &mut Options, path: &Path, text: &str) -> Result<()> {
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let locate =
            |err: Error| err.with_chain(vec![Frame::new(path, index + 1)]).with_source_line(line);

        if line.starts_with('@') {
            return Err(locate(config_error(
                "'@' is reserved and cannot start a config line",
            )));
        }
        if line.starts_with('-') {
            let args: Vec<&str> = line.split_whitespace().collect();
            options
                .apply_all(&args)
                .map_err(|e| locate(config_error(e.to_string()).with_cause(e)))?;
            continue;
        }

        let Some((name, expression)) = line.split_once('=') else {
            return Err(locate(config_error("expected 'name=expression'")));
        };
        let name = name.trim();
        if !is_valid_name(name) {
            return Err(locate(config_error(format!(
                "'{name}' is not a valid variable name"
            ))));
        }
        options.definitions.push(Definition {
            name: name.to_string(),
            value: Some(expression.trim().to_string()),
            source: DefinitionSource::ConfigFile(Frame::new(path, index + 1)),
        });
    }
    Ok(())
}

/// Define the globals of `definitions` in order. Defining a name twice is
/// an error.
pub fn define_globals(ctx: &mut Context, definitions: &[Definition]) -> Result<()> {
    for definition in definitions {
        define(ctx, definition).map_err(|err| match &definition.source {
            DefinitionSource::ConfigFile(frame) => {
                let source = format!(
                    "{}={}",
                    definition.name,
                    definition.value.as_deref().unwrap_or_default()
                );
                err.with_chain(vec![frame.clone()]).with_source_line(source)
            }
            DefinitionSource::CommandLine => err,
        })?;
    }
    Ok(())
}

fn define(ctx: &mut Context, definition: &Definition) -> Result<()> {
    let value = match (&definition.value, &definition.source) {
        (None, _) => Value::Bool(true),
        (Some(raw), DefinitionSource::CommandLine) => Value::from_raw(raw),
        (Some(expression), DefinitionSource::ConfigFile(_)) => ctx.evaluate(expression)?,
    };
    tracing::debug!(name = %definition.name, %value, "global");
    ctx.variables_mut().define_global(&definition.name, value)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
