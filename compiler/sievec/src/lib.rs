//! The `sieve` driver.
//!
//! Turns a command line (and any config files it names) into [`Options`],
//! walks the source roots, and runs every file through the directive
//! machine or copies it, writing the results under the target root.
//!
//! ```text
//! argv ─▶ parse_args ─▶ load_configs ─▶ Preprocessor::run ─▶ RunStats
//! ```

pub mod config;
pub mod discovery;
pub mod extension;
pub mod options;
pub mod orchestrator;
pub mod pattern;
pub mod record;
pub mod tracing_setup;

pub use config::{apply_config, define_globals, load_configs};
pub use discovery::{discover, Classifier};
pub use extension::LoggingExtension;
pub use options::{
    parse_args, BuiltinExtension, CliError, Command, Definition, DefinitionSource, Options,
    DEFAULT_EXTENSIONS,
};
pub use orchestrator::{destination, Preprocessor, RunStats};
pub use pattern::FolderPattern;
pub use record::{FileFlags, FileRecord};
pub use tracing_setup::{init_tracing, set_verbose};
