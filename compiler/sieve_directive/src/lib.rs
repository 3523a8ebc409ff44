//! Directive state machine for the sieve preprocessor.
//!
//! Source files carry their preprocessing instructions inside ordinary
//! comments, so an unprocessed file still compiles:
//!
//! ```text
//! //#if DEBUG
//! log("A");
//! //#else
//! log("B");
//! //#endif
//! int answer = /*$ 40 + 2 $*/ 0;
//! ```
//!
//! A [`Context`] holds the state of one run. [`Context::process_file`]
//! walks a file line by line, keeping a stack of open conditional and loop
//! blocks and a stack of include frames, and returns the text to write.
//! [`scan_exclusions`] is the pre-pass that collects `//#excludeif`
//! conditions before anything is processed.

pub mod block;
pub mod cancel;
pub mod config;
pub mod context;
pub mod directive;
pub mod exclusion;
pub mod frame;
mod process;

pub use cancel::CancelToken;
pub use config::{ProcessorConfig, PLACEHOLDER_PREFIX};
pub use context::{Context, ContextBuilder, FileOutput};
pub use directive::{split_arguments, Directive, DirectiveLine, Outcome, DIRECTIVE_PREFIX};
pub use exclusion::{scan_exclusions, scan_exclusions_in, ExclusionCondition};
