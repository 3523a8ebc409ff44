//! Run options and the flag grammar.
//!
//! The same grammar serves the command line and the `-`-prefixed lines of
//! config files, so everything a config file can say could also be said on
//! the command line.

use std::path::PathBuf;

use sieve_comments::{CommentPolicy, UnknownPolicy};
use sieve_diagnostic::Frame;
use sieve_directive::ProcessorConfig;
use sieve_expr::is_valid_name;

/// Extensions routed through the directive machine when none are given.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "java", "txt", "htm", "html", "xml", "rs", "c", "cpp", "h", "js", "kt",
];

/// A malformed command line or config-file flag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("unknown option '{0}'")]
    UnknownFlag(String),
    #[error("option '{0}' needs a value")]
    MissingValue(String),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("unsupported charset '{0}' (only UTF-8 is supported)")]
    UnsupportedCharset(String),
    #[error("unknown extension '{0}' (available: log)")]
    UnknownExtension(String),
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),
    #[error(transparent)]
    Comments(#[from] UnknownPolicy),
}

/// Extensions that ship with the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinExtension {
    /// Logs `//#action` arguments and provides `$log(x)`.
    Log,
}

/// Where a global definition came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionSource {
    /// `-D NAME=VALUE`; the value is a literal, or raw text taken as a string.
    CommandLine,
    /// `name=expression` in a config file; the value is an expression.
    ConfigFile(Frame),
}

/// A global variable to define before any file is processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// `None` defines the variable as `true`.
    pub value: Option<String>,
    pub source: DefinitionSource,
}

/// What the command line asked for.
#[derive(Clone, Debug)]
pub enum Command {
    Run(Options),
    Help,
}

#[allow(
    clippy::struct_excessive_bools,
    reason = "Options has standard CLI switch fields"
)]
#[derive(Clone, Debug)]
pub struct Options {
    /// Source roots; `.` when none are given.
    pub sources: Vec<PathBuf>,
    pub target: PathBuf,
    /// Extensions (lowercase, without the dot) that are preprocessed.
    pub extensions: Vec<String>,
    /// Extensions that are ignored entirely.
    pub excluded: Vec<String>,
    pub comments: CommentPolicy,
    pub keep_lines: bool,
    pub allow_whitespace: bool,
    pub unknown_as_false: bool,
    pub skip_unknown_directives: bool,
    pub clear: bool,
    pub skip_unchanged: bool,
    pub dry_run: bool,
    pub verbose: bool,
    /// Wildcard patterns of folders to skip during discovery.
    pub exclude_folders: Vec<String>,
    pub extension: Option<BuiltinExtension>,
    /// Globals in definition order: command line first, then config files.
    pub definitions: Vec<Definition>,
    pub configs: Vec<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            sources: Vec::new(),
            target: PathBuf::from("./preprocessed"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            excluded: Vec::new(),
            comments: CommentPolicy::Keep,
            keep_lines: false,
            allow_whitespace: false,
            unknown_as_false: false,
            skip_unknown_directives: false,
            clear: false,
            skip_unchanged: false,
            dry_run: false,
            verbose: false,
            exclude_folders: Vec::new(),
            extension: None,
            definitions: Vec::new(),
            configs: Vec::new(),
        }
    }
}

impl Options {
    /// Source roots to walk.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        if self.sources.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.sources.clone()
        }
    }

    /// Switches handed to the directive machine.
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            keep_lines: self.keep_lines,
            allow_whitespace: self.allow_whitespace,
            skip_unknown_directives: self.skip_unknown_directives,
        }
    }

    /// Apply a sequence of flags.
    pub fn apply_all<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), CliError> {
        let mut i = 0;
        while i < args.len() {
            let next = args.get(i + 1).map(AsRef::as_ref);
            i += self.apply(args[i].as_ref(), next)?;
        }
        Ok(())
    }

    /// Apply one flag. `next` is the following argument, consumed only by
    /// the two-word form `-D NAME`. Returns how many arguments were used.
    pub fn apply(&mut self, arg: &str, next: Option<&str>) -> Result<usize, CliError> {
        if arg == "-D" {
            let definition = next.ok_or_else(|| CliError::MissingValue("-D".to_string()))?;
            self.define(definition)?;
            return Ok(2);
        }
        if let Some(definition) = arg.strip_prefix("-D") {
            self.define(definition)?;
            return Ok(1);
        }

        match arg {
            "--keep-lines" => self.keep_lines = true,
            "--allow-whitespace" => self.allow_whitespace = true,
            "--unknown-as-false" => self.unknown_as_false = true,
            "--skip-unknown-directives" => self.skip_unknown_directives = true,
            "--clear" => self.clear = true,
            "--skip-unchanged" => self.skip_unchanged = true,
            "--dry-run" => self.dry_run = true,
            "-v" | "--verbose" => self.verbose = true,
            _ => self.apply_valued(arg)?,
        }
        Ok(1)
    }

    fn apply_valued(&mut self, arg: &str) -> Result<(), CliError> {
        let Some((flag, value)) = arg.split_once('=') else {
            return Err(if is_valued_flag(arg) {
                CliError::MissingValue(arg.to_string())
            } else if arg.starts_with('-') {
                CliError::UnknownFlag(arg.to_string())
            } else {
                CliError::UnexpectedArgument(arg.to_string())
            });
        };
        if value.is_empty() && flag != "--excluded" {
            return Err(CliError::MissingValue(flag.to_string()));
        }

        match flag {
            "--source" => self.sources.push(PathBuf::from(value)),
            "--target" => self.target = PathBuf::from(value),
            "--extensions" => self.extensions = extension_list(value),
            "--excluded" => self.excluded = extension_list(value),
            "--in-charset" | "--out-charset" => check_charset(value)?,
            "--comments" => self.comments = value.parse()?,
            "--exclude-folder" => self.exclude_folders.push(value.to_string()),
            "--extension" => {
                self.extension = match value.to_ascii_lowercase().as_str() {
                    "log" => Some(BuiltinExtension::Log),
                    _ => return Err(CliError::UnknownExtension(value.to_string())),
                };
            }
            "--define" => self.define(value)?,
            "--config" => self.configs.push(PathBuf::from(value)),
            _ if arg.starts_with('-') => return Err(CliError::UnknownFlag(flag.to_string())),
            _ => return Err(CliError::UnexpectedArgument(arg.to_string())),
        }
        Ok(())
    }

    fn define(&mut self, definition: &str) -> Result<(), CliError> {
        let (name, value) = match definition.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.to_string())),
            None => (definition.trim(), None),
        };
        if !is_valid_name(name) {
            return Err(CliError::InvalidName(name.to_string()));
        }
        self.definitions.push(Definition {
            name: name.to_string(),
            value,
            source: DefinitionSource::CommandLine,
        });
        Ok(())
    }
}

fn is_valued_flag(flag: &str) -> bool {
    matches!(
        flag,
        "--source"
            | "--target"
            | "--extensions"
            | "--excluded"
            | "--in-charset"
            | "--out-charset"
            | "--comments"
            | "--exclude-folder"
            | "--extension"
            | "--define"
            | "--config"
    )
}

/// `java, .TXT,,rs` → `["java", "txt", "rs"]`.
fn extension_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn check_charset(name: &str) -> Result<(), CliError> {
    if name.eq_ignore_ascii_case("utf-8") || name.eq_ignore_ascii_case("utf8") {
        Ok(())
    } else {
        Err(CliError::UnsupportedCharset(name.to_string()))
    }
}

/// Parse the command line (without the program name).
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Command, CliError> {
    if args
        .iter()
        .any(|a| matches!(a.as_ref(), "-h" | "--help"))
    {
        return Ok(Command::Help);
    }
    let mut options = Options::default();
    options.apply_all(args)?;
    Ok(Command::Run(options))
}
