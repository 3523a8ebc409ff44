//! Exclusion pre-pass.
//!
//! Before any file is preprocessed, every candidate is scanned for
//! `//#excludeif` lines. The conditions are recorded, not evaluated: they
//! are evaluated later against the globals of the run, so a file can be
//! excluded by a variable set on the command line or in a config file.

use std::path::{Path, PathBuf};

use sieve_diagnostic::{io_error, Result};

use crate::config::ProcessorConfig;
use crate::directive::{Directive, DirectiveLine};

/// One `//#excludeif` found in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionCondition {
    pub expression: String,
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// The directive line as written, trimmed.
    pub source: String,
}

/// Collect the `//#excludeif` conditions of a file.
pub fn scan_exclusions(path: &Path, config: &ProcessorConfig) -> Result<Vec<ExclusionCondition>> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    Ok(scan_exclusions_in(path, &text, config))
}

/// Collect the `//#excludeif` conditions of in-memory text read from `path`.
pub fn scan_exclusions_in(
    path: &Path,
    text: &str,
    config: &ProcessorConfig,
) -> Vec<ExclusionCondition> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            let body = DirectiveLine::classify(trimmed).body(config.allow_whitespace)?;
            match Directive::find(body)? {
                (Directive::ExcludeIf, expression) => Some(ExclusionCondition {
                    expression: expression.to_string(),
                    file: path.to_path_buf(),
                    line: index + 1,
                    source: trimmed.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
