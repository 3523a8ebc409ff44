//! Open conditional and loop blocks.
//!
//! Conditionals and loops share one stack so that mismatched closers
//! (`//#endif` closing a loop) are caught. The output is enabled only
//! while every block on the stack is active.

use sieve_diagnostic::Frame;
use sieve_expr::Expression;

use crate::directive::Directive;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Executing the body.
    Running,
    /// `//#continue` seen; skipping to `//#end`.
    Continuing,
    /// `//#break` seen, or the condition failed on entry.
    Finished,
    /// Opened inside a suppressed region; never evaluated.
    Dead,
}

#[derive(Debug)]
pub enum BlockKind {
    Conditional {
        /// Whether the current branch is emitted.
        active: bool,
        /// Whether the enclosing region was active when the block opened.
        parent_active: bool,
        else_seen: bool,
    },
    Loop {
        state: LoopState,
        condition: Expression,
        /// Index of the first body line in the loop's file.
        body_start: usize,
    },
}

#[derive(Debug)]
pub struct Block {
    pub kind: BlockKind,
    /// The directive that opened the block.
    pub opener: Directive,
    /// Include frame depth the block was opened in.
    pub depth: usize,
    /// Include chain of the opening line, innermost first.
    pub opened_at: Vec<Frame>,
}

impl Block {
    #[inline]
    pub fn is_active(&self) -> bool {
        match &self.kind {
            BlockKind::Conditional { active, .. } => *active,
            BlockKind::Loop { state, .. } => *state == LoopState::Running,
        }
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        matches!(self.kind, BlockKind::Loop { .. })
    }
}

/// Stack of open blocks.
#[derive(Debug, Default)]
pub struct BlockStack {
    blocks: Vec<Block>,
}

impl BlockStack {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.blocks.iter().all(Block::is_active)
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn pop(&mut self) -> Option<Block> {
        self.blocks.pop()
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Block> {
        self.blocks.last_mut()
    }

    /// Innermost open loop.
    pub fn innermost_loop_mut(&mut self) -> Option<&mut Block> {
        self.blocks.iter_mut().rev().find(|b| b.is_loop())
    }

    /// Drop the blocks opened at include depth `depth` or deeper.
    pub fn discard_from_depth(&mut self, depth: usize) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.depth < depth);
        before - self.blocks.len()
    }

    /// An open loop opened at include depth `depth` or deeper.
    pub fn loop_opened_at(&self, depth: usize) -> Option<&Block> {
        self.blocks.iter().find(|b| b.is_loop() && b.depth >= depth)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}
