//! Line-by-line processing of one file and its includes.
//!
//! Includes are an explicit stack of frames walked by a single loop, so
//! nesting depth costs heap, not native stack, and every line passes the
//! same cancellation check. Per line:
//!
//! 1. if output is enabled, substitute `/*$ expr $*/` macros left to right
//!    (never on `//$$` lines);
//! 2. if the line is a directive, dispatch it;
//! 3. otherwise emit it, honouring the `//$$`, `//$` and `/*-*/` sentinels,
//!    or replace it with a placeholder when it is suppressed.

use std::borrow::Cow;

use sieve_diagnostic::{
    missing_resource, parse_error, type_mismatch, unclosed_block, user_abort, Error, Result,
};
use sieve_expr::{is_valid_name, Environment, Expression, ScopeAt, Site, Value};

use crate::block::{Block, BlockKind, BlockStack, LoopState};
use crate::config::PLACEHOLDER_PREFIX;
use crate::context::{Context, FileOutput};
use crate::directive::{split_arguments, Directive, DirectiveLine, Outcome};
use crate::frame::{chain, IncludeFrame};

/// Sentinel: emit the rest of the line without macro substitution.
const RAW_SENTINEL: &str = "//$$";
/// Sentinel: emit the rest of the line after macro substitution.
const TAIL_SENTINEL: &str = "//$";
/// Sentinel: drop everything from here to the end of the line.
const TRUNCATE_SENTINEL: &str = "/*-*/";
const MACRO_OPEN: &str = "/*$";
const MACRO_CLOSE: &str = "$*/";

pub(crate) struct FileRun<'c> {
    ctx: &'c mut Context,
    frames: Vec<IncludeFrame>,
    blocks: BlockStack,
    /// Cleared by `//#-`, set by `//#+`.
    text_output: bool,
    /// Set by `//#//`: comment out the next emitted line.
    comment_next: bool,
    out: FileOutput,
}

impl<'c> FileRun<'c> {
    pub(crate) fn new(ctx: &'c mut Context, frame: IncludeFrame) -> Self {
        FileRun {
            ctx,
            frames: vec![frame],
            blocks: BlockStack::default(),
            text_output: true,
            comment_next: false,
            out: FileOutput::default(),
        }
    }

    pub(crate) fn execute(mut self) -> Result<FileOutput> {
        loop {
            self.ctx.cancel.check()?;
            let Some(frame) = self.frames.last_mut() else {
                break;
            };
            if frame.is_finished() {
                self.finish_frame()?;
                continue;
            }
            let line = frame.lines[frame.next].clone();
            frame.next += 1;
            if let Err(err) = self.process_line(&line) {
                return Err(self.locate(err, &line));
            }
        }

        if let Some(block) = self.blocks.last() {
            return Err(unclosed_block(
                &block.opener.to_string(),
                block.opened_at.clone(),
            ));
        }
        Ok(self.out)
    }

    /// Pop a frame that ran out of lines. A loop may not outlive the file
    /// that opened it.
    fn finish_frame(&mut self) -> Result<()> {
        let depth = self.frames.len();
        if depth > 1 {
            if let Some(block) = self.blocks.loop_opened_at(depth) {
                return Err(unclosed_block(
                    &block.opener.to_string(),
                    block.opened_at.clone(),
                ));
            }
        }
        if let Some(done) = self.frames.pop() {
            tracing::trace!(file = %done.path.display(), "end of file");
        }
        Ok(())
    }

    /// Attach the include chain and the offending line.
    fn locate(&self, err: Error, line: &str) -> Error {
        err.with_chain(chain(&self.frames))
            .with_source_line(line.trim())
    }

    fn env(&mut self) -> ScopeAt<'_> {
        let site = Site {
            file: self.frames.last().map(|f| f.path.as_path()),
            root: self.frames.first().map(|f| f.path.as_path()),
            line: self.frames.last().map_or(0, |f| f.next),
        };
        self.ctx.scope.at(site)
    }

    fn evaluate(&mut self, text: &str) -> Result<Value> {
        sieve_expr::evaluate(text, &mut self.env())
    }

    fn evaluate_bool(&mut self, text: &str) -> Result<bool> {
        sieve_expr::evaluate_bool(text, &mut self.env())
    }

    fn process_line(&mut self, raw: &str) -> Result<()> {
        let active = self.blocks.is_active();
        let original = raw.trim_start();
        let line = if active && !original.starts_with(RAW_SENTINEL) {
            self.substitute_macros(raw)?
        } else {
            Cow::Borrowed(raw)
        };
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        let class = DirectiveLine::classify(trimmed);
        if let Some(body) = class.body(self.ctx.config.allow_whitespace) {
            match self.dispatch(body)? {
                Outcome::Processed => self.placeholder(original),
                Outcome::ConsumeNoOutput => {}
                Outcome::NotProcessed if active && self.text_output => {
                    self.emit(indent, trimmed);
                }
                Outcome::NotProcessed => self.placeholder(original),
            }
            return Ok(());
        }
        if matches!(class, DirectiveLine::Spaced(_)) && active {
            tracing::warn!(
                line = trimmed,
                "comment looks like a directive but has whitespace after '//'; \
                 kept as a comment (enable whitespace tolerance to accept it)"
            );
        }

        if !(active && self.text_output) {
            self.placeholder(original);
        } else if let Some(tail) = trimmed.strip_prefix(RAW_SENTINEL) {
            self.emit(indent, tail);
        } else if let Some(tail) = trimmed.strip_prefix(TAIL_SENTINEL) {
            self.emit(indent, truncate(tail));
        } else {
            self.emit(indent, truncate(trimmed));
        }
        Ok(())
    }

    /// Replace every `/*$ expr $*/` with the string form of its value,
    /// scanning on after each inserted text.
    fn substitute_macros<'l>(&mut self, line: &'l str) -> Result<Cow<'l, str>> {
        if !line.contains(MACRO_OPEN) {
            return Ok(Cow::Borrowed(line));
        }
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(start) = rest.find(MACRO_OPEN) {
            let body_start = start + MACRO_OPEN.len();
            let Some(len) = rest[body_start..].find(MACRO_CLOSE) else {
                break;
            };
            out.push_str(&rest[..start]);
            let value = self.evaluate(&rest[body_start..body_start + len])?;
            out.push_str(&value.to_string());
            rest = &rest[body_start + len + MACRO_CLOSE.len()..];
        }
        out.push_str(rest);
        Ok(Cow::Owned(out))
    }

    fn emit(&mut self, indent: &str, content: &str) {
        let text = &mut self.out.text;
        text.push_str(indent);
        if std::mem::take(&mut self.comment_next) {
            text.push_str("// ");
        }
        text.push_str(content);
        text.push('\n');
    }

    fn placeholder(&mut self, original: &str) {
        if self.ctx.config.keep_lines {
            let text = &mut self.out.text;
            text.push_str(PLACEHOLDER_PREFIX);
            text.push_str(original.trim_end());
            text.push('\n');
        }
    }

    fn dispatch(&mut self, body: &str) -> Result<Outcome> {
        let Some((directive, argument)) = Directive::find(body) else {
            if !self.blocks.is_active() {
                return Ok(Outcome::Processed);
            }
            if self.ctx.config.skip_unknown_directives {
                tracing::warn!(directive = body.trim(), "unknown directive passed through as text");
                return Ok(Outcome::NotProcessed);
            }
            return Err(parse_error(format!("unknown directive '//#{}'", body.trim())));
        };

        if directive.is_structural() {
            return self.structural(directive, argument);
        }
        if !self.blocks.is_active() {
            return Ok(Outcome::Processed);
        }
        self.run_directive(directive, argument)
    }

    fn open_block(&mut self, opener: Directive, kind: BlockKind) {
        self.blocks.push(Block {
            kind,
            opener,
            depth: self.frames.len(),
            opened_at: chain(&self.frames),
        });
    }

    /// Directives that open, alternate or close blocks. These run even in
    /// suppressed regions so that nesting stays balanced.
    fn structural(&mut self, directive: Directive, argument: &str) -> Result<Outcome> {
        let parent_active = self.blocks.is_active();
        match directive {
            Directive::IfDefined | Directive::If => {
                let active = match directive {
                    _ if !parent_active => false,
                    Directive::IfDefined => {
                        let name = defined_name(argument)?;
                        self.env().is_defined(&name)
                    }
                    _ => self.evaluate_bool(argument)?,
                };
                self.open_block(
                    directive,
                    BlockKind::Conditional {
                        active,
                        parent_active,
                        else_seen: false,
                    },
                );
            }
            Directive::Else => match self.blocks.last_mut().map(|b| &mut b.kind) {
                Some(BlockKind::Conditional {
                    active,
                    parent_active,
                    else_seen,
                }) => {
                    if *else_seen {
                        return Err(parse_error("second '//#else' in the same '//#if'"));
                    }
                    *else_seen = true;
                    *active = *parent_active && !*active;
                }
                _ => return Err(parse_error("'//#else' without a matching '//#if'")),
            },
            Directive::EndIf => match self.blocks.last() {
                Some(block) if !block.is_loop() => {
                    self.blocks.pop();
                }
                Some(_) => return Err(parse_error("'//#endif' cannot close a '//#while'")),
                None => return Err(parse_error("'//#endif' without a matching '//#if'")),
            },
            Directive::While => {
                let (state, condition) = if parent_active {
                    let condition = Expression::parse(argument)?;
                    let holds = condition.evaluate_bool(&mut self.env())?;
                    let state = if holds { LoopState::Running } else { LoopState::Finished };
                    (state, condition)
                } else {
                    let condition = Expression {
                        text: argument.to_string(),
                        root: None,
                    };
                    (LoopState::Dead, condition)
                };
                let body_start = self.frames.last().map_or(0, |f| f.next);
                self.open_block(
                    directive,
                    BlockKind::Loop {
                        state,
                        condition,
                        body_start,
                    },
                );
            }
            Directive::Break | Directive::Continue => {
                if !parent_active {
                    return Ok(Outcome::Processed);
                }
                let Some(block) = self.blocks.innermost_loop_mut() else {
                    return Err(parse_error(format!("'{directive}' outside of a loop")));
                };
                if let BlockKind::Loop { state, .. } = &mut block.kind {
                    *state = if directive == Directive::Break {
                        LoopState::Finished
                    } else {
                        LoopState::Continuing
                    };
                }
            }
            Directive::End => return self.end_loop(),
            _ => return Err(parse_error(format!("'{directive}' is not a block directive"))),
        }
        Ok(Outcome::Processed)
    }

    fn end_loop(&mut self) -> Result<Outcome> {
        let depth = self.frames.len();
        let (state, condition, body_start) = match self.blocks.last() {
            Some(Block {
                kind:
                    BlockKind::Loop {
                        state,
                        condition,
                        body_start,
                    },
                depth: opened_depth,
                ..
            }) => {
                if *opened_depth != depth {
                    return Err(parse_error(
                        "'//#end' must be in the same file as its '//#while'",
                    ));
                }
                (*state, condition.clone(), *body_start)
            }
            Some(_) => return Err(parse_error("'//#end' cannot close a '//#if'")),
            None => return Err(parse_error("'//#end' without a matching '//#while'")),
        };

        let repeat = matches!(state, LoopState::Running | LoopState::Continuing)
            && condition.evaluate_bool(&mut self.env())?;
        if repeat {
            if let Some(Block {
                kind: BlockKind::Loop { state, .. },
                ..
            }) = self.blocks.last_mut()
            {
                *state = LoopState::Running;
            }
            if let Some(frame) = self.frames.last_mut() {
                frame.next = body_start;
            }
            return Ok(Outcome::ConsumeNoOutput);
        }
        self.blocks.pop();
        Ok(Outcome::Processed)
    }

    /// Directives that act on the run; only reached in active regions.
    fn run_directive(&mut self, directive: Directive, argument: &str) -> Result<Outcome> {
        match directive {
            Directive::Include => return self.include(argument),
            Directive::Local | Directive::Global => {
                let (name, expression) = assignment(argument)?;
                let value = self.evaluate(expression)?;
                let variables = &mut self.ctx.scope.variables;
                if directive == Directive::Local {
                    variables.set_local(name, value)?;
                } else {
                    variables.set_global(name, value)?;
                }
            }
            Directive::Define => {
                let (name, expression) = definition(argument)?;
                let value = match expression {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Bool(true),
                };
                self.ctx.scope.variables.set_global(name, value)?;
            }
            Directive::Undef => {
                let name = defined_name(argument)?;
                if !self.ctx.scope.variables.remove(&name) {
                    tracing::debug!(name = %name, "//#undef of a variable that is not defined");
                }
            }
            // Evaluated by the exclusion pre-pass before the main pass
            Directive::ExcludeIf => {}
            Directive::Action => {
                let values = split_arguments(argument)
                    .into_iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.ctx.scope.action(&values)?;
            }
            Directive::Echo => {
                let message = self.evaluate(argument)?;
                tracing::info!("{message}");
            }
            Directive::Warning => {
                let message = self.evaluate(argument)?;
                tracing::warn!("{message}");
            }
            Directive::Error => {
                let message = self.evaluate(argument)?;
                return Err(user_abort(message.to_string()));
            }
            Directive::ExitIf => {
                if self.evaluate_bool(argument)? {
                    self.exit_frame();
                }
            }
            Directive::Exit => self.exit_frame(),
            Directive::OutName => {
                self.out.outname = Some(self.evaluate(argument)?.to_string());
            }
            Directive::OutDir => {
                self.out.outdir = Some(self.evaluate(argument)?.to_string());
            }
            Directive::OutputOff => self.text_output = false,
            Directive::OutputOn => self.text_output = true,
            Directive::CommentNextLine => self.comment_next = true,
            Directive::IfDefined
            | Directive::If
            | Directive::Else
            | Directive::EndIf
            | Directive::While
            | Directive::Break
            | Directive::Continue
            | Directive::End => return self.structural(directive, argument),
        }
        Ok(Outcome::Processed)
    }

    fn include(&mut self, argument: &str) -> Result<Outcome> {
        let target = match self.evaluate(argument)? {
            Value::Str(path) => path,
            other => {
                return Err(type_mismatch(format!(
                    "include path must be str, found {}",
                    other.type_name()
                )))
            }
        };
        let path = self.env().resolve_path(&target);
        let identity = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        let circular = self.frames.iter().any(|frame| {
            std::fs::canonicalize(&frame.path).unwrap_or_else(|_| frame.path.clone()) == identity
        });
        if circular {
            return Err(missing_resource(format!(
                "circular include of '{}'",
                path.display()
            )));
        }

        let frame = IncludeFrame::load(&path)?;
        tracing::debug!(file = %path.display(), depth = self.frames.len(), "include");
        self.frames.push(frame);
        Ok(Outcome::Processed)
    }

    /// Leave the current frame, dropping blocks it opened.
    fn exit_frame(&mut self) {
        let depth = self.frames.len();
        let dropped = self.blocks.discard_from_depth(depth);
        if let Some(frame) = self.frames.pop() {
            tracing::debug!(file = %frame.path.display(), line = frame.next, dropped, "exit");
        }
    }
}

fn truncate(text: &str) -> &str {
    match text.find(TRUNCATE_SENTINEL) {
        Some(end) => &text[..end],
        None => text,
    }
}

fn checked_name(name: &str) -> Result<&str> {
    if is_valid_name(name) {
        Ok(name)
    } else {
        Err(parse_error(format!("'{name}' is not a valid variable name")))
    }
}

/// `NAME` argument of `ifdefined` and `undef`.
fn defined_name(argument: &str) -> Result<String> {
    checked_name(argument.trim()).map(str::to_lowercase)
}

/// `NAME = EXPR` argument of `local` and `global`.
fn assignment(argument: &str) -> Result<(&str, &str)> {
    let Some((name, expression)) = argument.split_once('=') else {
        return Err(parse_error(format!("expected NAME=EXPR, found '{argument}'")));
    };
    Ok((checked_name(name.trim())?, expression))
}

/// `NAME`, `NAME=EXPR` or `NAME EXPR` argument of `define`.
fn definition(argument: &str) -> Result<(&str, Option<&str>)> {
    let argument = argument.trim();
    let end = argument
        .find(|c: char| c == '=' || c.is_whitespace())
        .unwrap_or(argument.len());
    let name = checked_name(&argument[..end])?;
    let rest = argument[end..].trim_start();
    let expression = match rest.strip_prefix('=') {
        Some(value) if !value.starts_with('=') => value,
        _ => rest,
    };
    Ok((name, (!expression.trim().is_empty()).then_some(expression)))
}
