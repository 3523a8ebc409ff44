//! Directive catalog and line matching.
//!
//! A directive line is a line comment whose text starts with `#`:
//! `//#if DEBUG`. The word after `#` is matched against the catalog in
//! registration order; the first entry whose name matches exactly, or is
//! followed by whitespace, and whose argument presence fits, wins. Order
//! matters: `ifdefined` is tried before `if` and `endif` before `end`.

use std::fmt;

/// Prefix shared by every directive line.
pub const DIRECTIVE_PREFIX: &str = "//#";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    IfDefined,
    If,
    Else,
    EndIf,
    While,
    Break,
    Continue,
    End,
    Include,
    Local,
    Global,
    Define,
    Undef,
    ExcludeIf,
    Action,
    Echo,
    Warning,
    Error,
    ExitIf,
    Exit,
    OutName,
    OutDir,
    OutputOff,
    OutputOn,
    CommentNextLine,
}

/// What a handler did with its line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Handled; a keep-lines placeholder stands in for the line.
    Processed,
    /// Not a directive after all; the line is emitted as text.
    NotProcessed,
    /// Handled, and the line leaves no trace in the output. Only a loop
    /// jumping back to its body does this, since the line is seen again.
    ConsumeNoOutput,
}

impl Directive {
    /// Registration order.
    pub const ALL: [Directive; 25] = [
        Directive::IfDefined,
        Directive::If,
        Directive::Else,
        Directive::EndIf,
        Directive::While,
        Directive::Break,
        Directive::Continue,
        Directive::End,
        Directive::Include,
        Directive::Local,
        Directive::Global,
        Directive::Define,
        Directive::Undef,
        Directive::ExcludeIf,
        Directive::Action,
        Directive::Echo,
        Directive::Warning,
        Directive::Error,
        Directive::ExitIf,
        Directive::Exit,
        Directive::OutName,
        Directive::OutDir,
        Directive::OutputOff,
        Directive::OutputOn,
        Directive::CommentNextLine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Directive::IfDefined => "ifdefined",
            Directive::If => "if",
            Directive::Else => "else",
            Directive::EndIf => "endif",
            Directive::While => "while",
            Directive::Break => "break",
            Directive::Continue => "continue",
            Directive::End => "end",
            Directive::Include => "include",
            Directive::Local => "local",
            Directive::Global => "global",
            Directive::Define => "define",
            Directive::Undef => "undef",
            Directive::ExcludeIf => "excludeif",
            Directive::Action => "action",
            Directive::Echo => "echo",
            Directive::Warning => "warning",
            Directive::Error => "error",
            Directive::ExitIf => "exitif",
            Directive::Exit => "exit",
            Directive::OutName => "outname",
            Directive::OutDir => "outdir",
            Directive::OutputOff => "-",
            Directive::OutputOn => "+",
            Directive::CommentNextLine => "//",
        }
    }

    /// Whether the directive takes an argument.
    pub fn takes_argument(self) -> bool {
        !matches!(
            self,
            Directive::Else
                | Directive::EndIf
                | Directive::Break
                | Directive::Continue
                | Directive::End
                | Directive::Exit
                | Directive::OutputOff
                | Directive::OutputOn
                | Directive::CommentNextLine
        )
    }

    /// Whether the directive opens, alternates or closes a block, and so
    /// must be interpreted even inside a suppressed region.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Directive::IfDefined
                | Directive::If
                | Directive::Else
                | Directive::EndIf
                | Directive::While
                | Directive::Break
                | Directive::Continue
                | Directive::End
        )
    }

    /// Match the text after `//#` to a directive and its argument.
    pub fn find(body: &str) -> Option<(Directive, &str)> {
        Self::ALL.into_iter().find_map(|directive| {
            let argument = directive.match_name(body)?;
            (directive.takes_argument() != argument.is_empty()).then_some((directive, argument))
        })
    }

    /// Argument text (trimmed) if `body` starts with this directive's name.
    fn match_name(self, body: &str) -> Option<&str> {
        let name = self.name();
        let head = body.get(..name.len())?;
        if !head.eq_ignore_ascii_case(name) {
            return None;
        }
        let rest = &body[name.len()..];
        match rest.chars().next() {
            None => Some(""),
            Some(c) if c.is_whitespace() => Some(rest.trim()),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DIRECTIVE_PREFIX}{}", self.name())
    }
}

/// How a trimmed line relates to the directive prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveLine<'a> {
    /// `//#...`; carries the text after `#`.
    Directive(&'a str),
    /// `//  #...`, accepted only with whitespace tolerance.
    Spaced(&'a str),
    /// Anything else.
    Text,
}

impl<'a> DirectiveLine<'a> {
    /// Classify a line that has had its leading whitespace removed.
    pub fn classify(trimmed: &'a str) -> DirectiveLine<'a> {
        if let Some(body) = trimmed.strip_prefix(DIRECTIVE_PREFIX) {
            return DirectiveLine::Directive(body);
        }
        let Some(comment) = trimmed.strip_prefix("//") else {
            return DirectiveLine::Text;
        };
        let unspaced = comment.trim_start();
        match unspaced.strip_prefix('#') {
            Some(body) if unspaced.len() < comment.len() => DirectiveLine::Spaced(body),
            _ => DirectiveLine::Text,
        }
    }

    /// Directive body under the given whitespace policy.
    pub fn body(self, allow_whitespace: bool) -> Option<&'a str> {
        match self {
            DirectiveLine::Directive(body) => Some(body),
            DirectiveLine::Spaced(body) if allow_whitespace => Some(body.trim_start()),
            DirectiveLine::Spaced(_) | DirectiveLine::Text => None,
        }
    }
}

/// Split `a, "b,c", f(1, 2)` at top-level commas, outside strings and
/// brackets. Pieces are trimmed.
pub fn split_arguments(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() || !pieces.is_empty() {
        pieces.push(last);
    }
    pieces
}

#[cfg(test)]
mod tests;
