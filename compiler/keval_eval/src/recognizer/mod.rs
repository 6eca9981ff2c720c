//! The recognizer extension point.
//!
//! A recognizer is one syntax rule. The engine hands it the input, the
//! current position, the phase flag and the output stream; the recognizer
//! either accepts (advancing the position, possibly flipping the phase, and
//! appending elements) or declines.

use std::fmt;

use crate::{FunctionDescriptor, OverloadTable, PostfixExpression};

/// Which of the engine's two chains is active.
///
/// Grammars use the flag to tell positions where an operand is expected
/// (`Pre`) from positions where an operator may follow (`Post`). The engine
/// never flips it itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Pre,
    Post,
}

impl Phase {
    /// The other phase.
    #[inline]
    #[must_use]
    pub fn flip(self) -> Phase {
        match self {
            Phase::Pre => Phase::Post,
            Phase::Post => Phase::Pre,
        }
    }

    #[inline]
    pub fn is_post(self) -> bool {
        matches!(self, Phase::Post)
    }
}

impl From<bool> for Phase {
    /// `false` is `Pre`, `true` is `Post`.
    fn from(post: bool) -> Self {
        if post {
            Phase::Post
        } else {
            Phase::Pre
        }
    }
}

impl From<Phase> for bool {
    fn from(phase: Phase) -> Self {
        phase.is_post()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pre => f.write_str("pre"),
            Phase::Post => f.write_str("post"),
        }
    }
}

/// A pluggable syntax rule.
///
/// # Contract for `parse`
///
/// - On acceptance return `true`. `pos` should have moved forward; the
///   engine fails a parse whose recognizers keep accepting without progress
///   (see [`EngineOptions::stall_limit`](crate::EngineOptions::stall_limit)).
/// - On decline return `false`. The engine restores `pos` and `phase`, and
///   under the default rollback policy also drops anything appended.
/// - Elements may only be appended to `output`; call descriptors are
///   normally taken from this recognizer's own [`overloads`](Self::overloads).
///
/// `parse` takes `&self` because one instance may sit in both chains and be
/// shared across threads. Recognizers that need per-cycle state keep it
/// behind their own lock.
pub trait Recognizer<T, K>: Send + Sync {
    fn parse(
        &self,
        pos: &mut usize,
        input: &[K],
        phase: &mut Phase,
        output: &mut PostfixExpression<T>,
    ) -> bool;

    /// Functions this recognizer can emit calls to.
    fn overloads(&self) -> &OverloadTable<T, K>;

    fn overloads_mut(&mut self) -> &mut OverloadTable<T, K>;

    /// Label used in trace output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Register an overload in this recognizer's table, replacing any
    /// existing one with the same arity.
    fn add_overload<F>(
        &mut self,
        name: &[K],
        arity: usize,
        priority: i32,
        callable: F,
    ) -> Option<FunctionDescriptor<T>>
    where
        Self: Sized,
        K: Ord + Clone,
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        self.overloads_mut()
            .add_overload(name, arity, priority, callable)
    }

    /// Remove one overload from this recognizer's table.
    fn remove_overload(&mut self, name: &[K], arity: usize) -> bool
    where
        K: Ord + Clone,
    {
        self.overloads_mut().remove_overload(name, arity)
    }
}
