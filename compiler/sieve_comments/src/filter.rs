//! The comment-removal state machine.
//!
//! ```text
//! Normal ──'/'──▶ Slash ──'/'──▶ LineComment          (RemoveAll)
//!                   │     └─'/'──▶ Candidate ─▶ LineComment { keep }
//!                   └─'*'──▶ Block ◀──▶ BlockStar ──'/'──▶ Normal
//! Normal ──'"' or '\''──▶ Quoted ◀──▶ QuotedEscape
//! ```
//!
//! A newline always ends a line comment, a quoted literal and a pending
//! candidate; only block comments span lines.

use std::io::{self, BufRead, Write};

use crate::policy::CommentPolicy;

/// First character of a `//` comment that carries a directive (`#`), an
/// output sentinel (`$`) or a keep-lines placeholder (`>`).
fn is_carrier(c: char) -> bool {
    matches!(c, '#' | '$' | '>')
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    /// Saw `/` in normal text; not yet emitted.
    Slash,
    /// Inside `//...`; `keep` decides whether characters are written.
    LineComment { keep: bool },
    /// After `//` under `RemoveDirectives`, buffering until the comment can
    /// be classified.
    Candidate,
    Block { keep: bool },
    /// Saw `*` inside a block comment.
    BlockStar { keep: bool },
    /// Inside a string or char literal opened by `quote`.
    Quoted { quote: char },
    QuotedEscape { quote: char },
}

/// Incremental comment filter. Feed it text in any chunking, then call
/// [`CommentFilter::finish`].
#[derive(Debug)]
pub struct CommentFilter {
    policy: CommentPolicy,
    allow_whitespace: bool,
    state: State,
    /// Text after `//` held back while in [`State::Candidate`].
    pending: String,
}

impl CommentFilter {
    pub fn new(policy: CommentPolicy) -> Self {
        CommentFilter {
            policy,
            allow_whitespace: false,
            state: State::Normal,
            pending: String::new(),
        }
    }

    /// Recognize carriers written as `//  #...` with whitespace before
    /// the marker.
    #[must_use]
    pub fn allow_whitespace(mut self, allow: bool) -> Self {
        self.allow_whitespace = allow;
        self
    }

    pub fn policy(&self) -> CommentPolicy {
        self.policy
    }

    /// Filter `chunk`, appending the surviving text to `out`.
    pub fn feed(&mut self, chunk: &str, out: &mut String) {
        if self.policy == CommentPolicy::Keep {
            out.push_str(chunk);
            return;
        }
        for c in chunk.chars() {
            self.step(c, out);
        }
    }

    /// Flush whatever is held back at end of input and reset.
    pub fn finish(&mut self, out: &mut String) {
        match self.state {
            State::Slash => out.push('/'),
            State::Candidate => self.flush_candidate(out),
            _ => {}
        }
        self.state = State::Normal;
    }

    fn step(&mut self, c: char, out: &mut String) {
        self.state = match self.state {
            State::Normal => match c {
                '/' => State::Slash,
                '"' | '\'' => {
                    out.push(c);
                    State::Quoted { quote: c }
                }
                _ => {
                    out.push(c);
                    State::Normal
                }
            },
            State::Slash => match c {
                '/' if self.policy == CommentPolicy::RemoveAll => {
                    State::LineComment { keep: false }
                }
                '/' => State::Candidate,
                '*' => {
                    let keep = self.policy != CommentPolicy::RemoveAll;
                    if keep {
                        out.push_str("/*");
                    }
                    State::Block { keep }
                }
                _ => {
                    out.push('/');
                    self.state = State::Normal;
                    self.step(c, out);
                    return;
                }
            },
            State::LineComment { keep } => {
                if keep || c == '\n' || c == '\r' {
                    out.push(c);
                }
                if c == '\n' {
                    State::Normal
                } else {
                    State::LineComment { keep }
                }
            }
            State::Candidate => self.classify_candidate(c, out),
            State::Block { keep } => {
                if keep {
                    out.push(c);
                }
                if c == '*' {
                    State::BlockStar { keep }
                } else {
                    State::Block { keep }
                }
            }
            State::BlockStar { keep } => {
                if keep {
                    out.push(c);
                }
                match c {
                    '/' => State::Normal,
                    '*' => State::BlockStar { keep },
                    _ => State::Block { keep },
                }
            }
            State::Quoted { quote } => {
                out.push(c);
                match c {
                    '\\' => State::QuotedEscape { quote },
                    '\n' => State::Normal,
                    _ if c == quote => State::Normal,
                    _ => State::Quoted { quote },
                }
            }
            State::QuotedEscape { quote } => {
                out.push(c);
                if c == '\n' {
                    State::Normal
                } else {
                    State::Quoted { quote }
                }
            }
        };
    }

    fn classify_candidate(&mut self, c: char, out: &mut String) -> State {
        if c == '\n' {
            self.flush_candidate(out);
            out.push(c);
            return State::Normal;
        }
        if c.is_whitespace() && self.allow_whitespace {
            self.pending.push(c);
            return State::Candidate;
        }
        if is_carrier(c) {
            self.pending.clear();
            return State::LineComment { keep: false };
        }
        self.flush_candidate(out);
        out.push(c);
        State::LineComment { keep: true }
    }

    fn flush_candidate(&mut self, out: &mut String) {
        out.push_str("//");
        out.push_str(&self.pending);
        self.pending.clear();
    }
}

/// Filter a whole string.
pub fn filter_str(text: &str, policy: CommentPolicy, allow_whitespace: bool) -> String {
    let mut filter = CommentFilter::new(policy).allow_whitespace(allow_whitespace);
    let mut out = String::with_capacity(text.len());
    filter.feed(text, &mut out);
    filter.finish(&mut out);
    out
}

/// Filter `reader` into `writer` one line at a time.
pub fn filter_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    policy: CommentPolicy,
    allow_whitespace: bool,
) -> io::Result<()> {
    if policy == CommentPolicy::Keep {
        io::copy(&mut reader, &mut writer)?;
        return writer.flush();
    }

    let mut filter = CommentFilter::new(policy).allow_whitespace(allow_whitespace);
    let mut line = String::new();
    let mut out = String::new();
    let mut lines = 0usize;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        lines += 1;
        out.clear();
        filter.feed(&line, &mut out);
        writer.write_all(out.as_bytes())?;
    }
    out.clear();
    filter.finish(&mut out);
    writer.write_all(out.as_bytes())?;
    tracing::trace!(%policy, lines, "comment filter finished");
    writer.flush()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
