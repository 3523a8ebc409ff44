//! The preprocessing run.
//!
//! ```text
//! clear target ─▶ discover ─▶ scan //#excludeif ─▶ define globals
//!     ─▶ evaluate exclusions ─▶ per file: copy | preprocess + filter comments ─▶ write
//! ```
//!
//! Every failure aborts the run. Files are handled in sorted source order,
//! and a single [`Context`] carries globals from one file to the next.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sieve_comments::{filter_str, CommentPolicy};
use sieve_diagnostic::{config_error, io_error, Result};
use sieve_directive::{scan_exclusions, CancelToken, Context, FileOutput};
use sieve_expr::UnknownPolicy;

use crate::config::define_globals;
use crate::discovery::discover;
use crate::extension::LoggingExtension;
use crate::options::{BuiltinExtension, Options};
use crate::record::{FileFlags, FileRecord};

/// Counters reported at the end of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files run through the directive machine.
    pub preprocessed: usize,
    /// Files mirrored byte for byte.
    pub copied: usize,
    /// Files skipped by extension or `//#excludeif`.
    pub excluded: usize,
    /// Destinations left alone because their content already matched.
    pub unchanged: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} preprocessed, {} copied, {} excluded",
            self.preprocessed, self.copied, self.excluded
        )?;
        if self.unchanged > 0 {
            write!(f, " ({} unchanged)", self.unchanged)?;
        }
        write!(f, " in {}ms", self.elapsed.as_millis())
    }
}

/// Runs one preprocessing pass over the trees named by [`Options`].
pub struct Preprocessor<'o> {
    options: &'o Options,
    cancel: CancelToken,
}

impl<'o> Preprocessor<'o> {
    pub fn new(options: &'o Options) -> Self {
        Preprocessor {
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancellation flag, e.g. with a signal handler.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn run(&self) -> Result<RunStats> {
        let started = Instant::now();
        let options = self.options;
        let mut stats = RunStats::default();

        if options.clear {
            self.clear_target()?;
        }

        let mut records = discover(options)?;
        let config = options.processor_config();
        for record in records.iter_mut().filter(|r| r.is_preprocessed()) {
            record.exclusions = scan_exclusions(&record.source, &config)?;
        }

        let mut ctx = self.context();
        define_globals(&mut ctx, &options.definitions)?;
        for record in records.iter_mut().filter(|r| !r.exclusions.is_empty()) {
            if ctx.is_excluded(&record.exclusions)? {
                record.flags.insert(FileFlags::EXCLUDED);
            }
        }

        for record in &records {
            self.cancel.check()?;
            if record.is_excluded() {
                tracing::debug!(file = %record.source.display(), "excluded");
                stats.excluded += 1;
            } else if record.is_copy_only() {
                let bytes =
                    fs::read(&record.source).map_err(|e| io_error("read", &record.source, e))?;
                let destination = options.target.join(&record.relative);
                self.write_output(&destination, &bytes, &mut stats)?;
                stats.copied += 1;
            } else {
                let output = ctx.process_file(&record.source)?;
                let destination = destination(&options.target, record, &output);
                let text = match options.comments {
                    CommentPolicy::Keep => output.text,
                    policy => filter_str(&output.text, policy, options.allow_whitespace),
                };
                self.write_output(&destination, text.as_bytes(), &mut stats)?;
                stats.preprocessed += 1;
            }
        }

        ctx.close();
        stats.elapsed = started.elapsed();
        tracing::info!(
            preprocessed = stats.preprocessed,
            copied = stats.copied,
            excluded = stats.excluded,
            unchanged = stats.unchanged,
            elapsed_ms = u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            dry_run = options.dry_run,
            "run finished"
        );
        Ok(stats)
    }

    fn context(&self) -> Context {
        let options = self.options;
        let mut builder = Context::builder()
            .config(options.processor_config())
            .cancel_token(self.cancel.clone());
        if options.unknown_as_false {
            builder = builder.unknown_variables(UnknownPolicy::Permissive);
        }
        if let Some(BuiltinExtension::Log) = options.extension {
            builder = builder.extension(Box::new(LoggingExtension::default()));
        }
        builder.build()
    }

    /// Remove the target root. Refuses when a source root lives inside it.
    fn clear_target(&self) -> Result<()> {
        let target = &self.options.target;
        let Ok(canonical) = fs::canonicalize(target) else {
            tracing::debug!(dir = %target.display(), "nothing to clear");
            return Ok(());
        };
        for root in self.options.source_roots() {
            let root = fs::canonicalize(&root).unwrap_or(root);
            if root.starts_with(&canonical) {
                return Err(config_error(format!(
                    "refusing to clear '{}': it contains source root '{}'",
                    target.display(),
                    root.display()
                )));
            }
        }
        if self.options.dry_run {
            tracing::info!(dir = %target.display(), "dry run: would clear target");
            return Ok(());
        }
        tracing::info!(dir = %target.display(), "clearing target");
        fs::remove_dir_all(target).map_err(|e| io_error("clear", target, e))
    }

    fn write_output(&self, path: &Path, bytes: &[u8], stats: &mut RunStats) -> Result<()> {
        if self.options.skip_unchanged && fs::read(path).is_ok_and(|existing| existing == bytes) {
            tracing::debug!(file = %path.display(), "unchanged");
            stats.unchanged += 1;
            return Ok(());
        }
        if self.options.dry_run {
            tracing::debug!(file = %path.display(), bytes = bytes.len(), "dry run: would write");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
        }
        fs::write(path, bytes).map_err(|e| io_error("write", path, e))
    }
}

/// Where a preprocessed file goes: its mirrored path under `target`, with
/// the directory replaced by `//#outdir` (relative to `target`) and the
/// file name by `//#outname`.
pub fn destination(target: &Path, record: &FileRecord, output: &FileOutput) -> PathBuf {
    let dir = match &output.outdir {
        Some(outdir) => target.join(outdir),
        None => match record.relative.parent() {
            Some(parent) => target.join(parent),
            None => target.to_path_buf(),
        },
    };
    match &output.outname {
        Some(name) => dir.join(name),
        None => match record.relative.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        },
    }
}

#[cfg(test)]
mod tests;
