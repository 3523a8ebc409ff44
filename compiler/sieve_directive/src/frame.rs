//! Include frames.

use std::path::{Path, PathBuf};

use sieve_diagnostic::{io_error, missing_resource, Frame, Result};

/// One file being read: the outermost file or a nested include.
#[derive(Debug)]
pub struct IncludeFrame {
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// Index of the next line to read; while a line is being processed
    /// this equals its 1-based line number.
    pub next: usize,
}

impl IncludeFrame {
    /// Read a UTF-8 file and split it into lines.
    pub fn load(path: &Path) -> Result<IncludeFrame> {
        let bytes = std::fs::read(path).map_err(|e| io_error("read", path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            missing_resource(format!("'{}' is not valid UTF-8", path.display())).with_cause(e)
        })?;
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: &Path, text: &str) -> IncludeFrame {
        IncludeFrame {
            path: path.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
            next: 0,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.next >= self.lines.len()
    }

    /// Position of the line being processed.
    pub fn position(&self) -> Frame {
        Frame::new(&self.path, self.next)
    }
}

/// Include chain, innermost first.
pub fn chain(frames: &[IncludeFrame]) -> Vec<Frame> {
    frames.iter().rev().map(IncludeFrame::position).collect()
}
