//! Comment-removal policies.

use std::fmt;
use std::str::FromStr;

/// Which comments the post-pass removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommentPolicy {
    #[default]
    Keep,
    RemoveAll,
    RemoveDirectives,
}

impl CommentPolicy {
    /// Every policy, in the order the CLI lists them.
    pub const ALL: [CommentPolicy; 3] = [
        CommentPolicy::Keep,
        CommentPolicy::RemoveAll,
        CommentPolicy::RemoveDirectives,
    ];

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CommentPolicy::Keep => "keep",
            CommentPolicy::RemoveAll => "remove",
            CommentPolicy::RemoveDirectives => "remove-directives",
        }
    }
}

impl fmt::Display for CommentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A comment mode name that matches no policy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown comment mode '{0}' (expected keep, remove or remove-directives)")]
pub struct UnknownPolicy(pub String);

impl FromStr for CommentPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}
