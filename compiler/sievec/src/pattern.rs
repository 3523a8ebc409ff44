//! Wildcard patterns for `--exclude-folder`.
//!
//! - `?` matches one character other than `/`
//! - `*` matches any run of characters other than `/`
//! - `**` matches anything, `/` included; `**/` also matches nothing
//!
//! A pattern without `/` is matched against the folder name alone, at any
//! depth; a pattern with `/` is matched against the folder's path relative
//! to the source root. Backslashes are treated as `/`.

use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Piece {
    Char(char),
    AnyChar,
    Star,
    GlobStar,
    /// `**/`: empty, or anything ending in `/`.
    GlobDir,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderPattern {
    text: String,
    pieces: Vec<Piece>,
    /// Whether the pattern is matched against the whole relative path.
    anchored: bool,
}

impl FolderPattern {
    pub fn new(pattern: &str) -> Self {
        let text = pattern.trim().replace('\\', "/");
        let text = text.trim_matches('/').to_string();
        let mut pieces = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let piece = match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        Piece::GlobDir
                    } else {
                        Piece::GlobStar
                    }
                }
                '*' => Piece::Star,
                '?' => Piece::AnyChar,
                c => Piece::Char(c),
            };
            pieces.push(piece);
        }
        let anchored = text.contains('/');
        FolderPattern {
            text,
            pieces,
            anchored,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Match a folder given by its path relative to the source root.
    pub fn matches_path(&self, relative: &Path) -> bool {
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if self.anchored {
            self.matches(&joined)
        } else {
            let name = joined.rsplit('/').next().unwrap_or_default();
            self.matches(name)
        }
    }

    /// Match `text` as a whole.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let n = text.len();
        // reachable[j]: the pieces so far can match text[..j]
        let mut reachable = vec![false; n + 1];
        reachable[0] = true;

        for piece in &self.pieces {
            let mut next = vec![false; n + 1];
            match *piece {
                Piece::Char(expected) => {
                    for j in 0..n {
                        next[j + 1] = reachable[j] && text[j] == expected;
                    }
                }
                Piece::AnyChar => {
                    for j in 0..n {
                        next[j + 1] = reachable[j] && text[j] != '/';
                    }
                }
                Piece::Star => {
                    next[0] = reachable[0];
                    for j in 1..=n {
                        next[j] = reachable[j] || (next[j - 1] && text[j - 1] != '/');
                    }
                }
                Piece::GlobStar => {
                    next[0] = reachable[0];
                    for j in 1..=n {
                        next[j] = reachable[j] || next[j - 1];
                    }
                }
                Piece::GlobDir => {
                    let mut seen = false;
                    for j in 0..=n {
                        next[j] = reachable[j] || (seen && text[j - 1] == '/');
                        seen |= reachable[j];
                    }
                }
            }
            reachable = next;
        }
        reachable[n]
    }
}
