//! Comment removal for preprocessed output.
//!
//! An optional post-pass run over text the directive machine has already
//! produced. Three policies are available:
//!
//! - [`CommentPolicy::Keep`]: identity copy.
//! - [`CommentPolicy::RemoveAll`]: strip every `//` and `/* */` comment.
//! - [`CommentPolicy::RemoveDirectives`]: strip only `//` comments that
//!   carry directives, sentinels or keep-lines placeholders (`//#`, `//$`,
//!   `//>`); everything else passes through.
//!
//! The filter is a character state machine that never looks more than one
//! line ahead, so a file of any size streams through in constant memory.
//! String and char literals are tracked so that `"http://x"` and `'"'`
//! are never taken for, or mistaken around, a comment.

mod filter;
mod policy;

pub use filter::{filter_str, filter_stream, CommentFilter};
pub use policy::{CommentPolicy, UnknownPolicy};
