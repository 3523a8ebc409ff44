//! Discovered files and their classification.

use std::path::PathBuf;

use bitflags::bitflags;
use sieve_directive::ExclusionCondition;

bitflags! {
    /// How the orchestrator treats a file.
    ///
    /// No flag set means the file goes through the directive machine.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FileFlags: u8 {
        /// Skipped entirely: an excluded extension, or a true
        /// `//#excludeif`.
        const EXCLUDED = 1 << 0;
        /// Mirrored byte for byte, never preprocessed.
        const COPY_ONLY = 1 << 1;
    }
}

/// One file found under a source root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub source: PathBuf,
    /// Path relative to its source root; the default destination is this
    /// path under the target root.
    pub relative: PathBuf,
    pub flags: FileFlags,
    /// `//#excludeif` conditions found by the pre-pass.
    pub exclusions: Vec<ExclusionCondition>,
}

impl FileRecord {
    pub fn new(source: PathBuf, relative: PathBuf, flags: FileFlags) -> Self {
        FileRecord {
            source,
            relative,
            flags,
            exclusions: Vec::new(),
        }
    }

    #[inline]
    pub fn is_excluded(&self) -> bool {
        self.flags.contains(FileFlags::EXCLUDED)
    }

    #[inline]
    pub fn is_copy_only(&self) -> bool {
        self.flags.contains(FileFlags::COPY_ONLY)
    }

    /// Whether the file goes through the directive machine.
    #[inline]
    pub fn is_preprocessed(&self) -> bool {
        self.flags.is_empty()
    }
}
