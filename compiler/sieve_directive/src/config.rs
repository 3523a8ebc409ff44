//! Per-run switches of the directive machine.

/// Marker that starts a keep-lines placeholder.
pub const PLACEHOLDER_PREFIX: &str = "//> ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Replace directive and suppressed lines with placeholders instead of
    /// dropping them, so output line numbers match the source.
    pub keep_lines: bool,
    /// Accept `//  #directive` with whitespace between `//` and `#`.
    pub allow_whitespace: bool,
    /// Pass unknown directives through as text with a warning instead of
    /// failing.
    pub skip_unknown_directives: bool,
}
