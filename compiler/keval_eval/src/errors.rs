//! Error types for parsing and evaluation.
//!
//! A parse failure is ordinary control flow (no recognizer accepted the
//! input), so it is a plain value rather than a panic. Evaluation failures
//! describe a malformed postfix stream.

use std::fmt;

use thiserror::Error;

use crate::Phase;

/// Why an evaluation of a postfix stream failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A call needed more operands than the stack held.
    #[error(
        "stack underflow at element {position}: call needs {needed} operand(s), {available} available"
    )]
    StackUnderflow {
        /// Index of the offending call in the postfix stream.
        position: usize,
        needed: usize,
        available: usize,
    },
    /// The stream did not leave exactly one value behind.
    #[error("invalid stack size: expected exactly one result, found {size}")]
    InvalidStackSize { size: usize },
}

/// Category of a [`ParseFailure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseFailureKind {
    /// Every recognizer of the active chain declined.
    NoMatch,
    /// Recognizers kept accepting without advancing past the furthest
    /// position reached.
    Stalled,
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailureKind::NoMatch => f.write_str("no recognizer matched"),
            ParseFailureKind::Stalled => f.write_str("parse stalled"),
        }
    }
}

/// A parse cycle that could not consume the whole input.
///
/// The output expression handed to the failed parse is left as the
/// recognizers built it up to this point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind} at position {position} ({phase} phase)")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    /// Input position the engine was at when it gave up.
    pub position: usize,
    /// Phase that was active at that position.
    pub phase: Phase,
}

impl ParseFailure {
    pub fn no_match(position: usize, phase: Phase) -> Self {
        ParseFailure {
            kind: ParseFailureKind::NoMatch,
            position,
            phase,
        }
    }

    pub fn stalled(position: usize, phase: Phase) -> Self {
        ParseFailure {
            kind: ParseFailureKind::Stalled,
            position,
            phase,
        }
    }
}

/// Either half of [`Engine::run`](crate::Engine::run) failing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
