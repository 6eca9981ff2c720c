//! Keval Eval - recognizer chains and postfix evaluation.
//!
//! The engine turns a sequence of input tokens into a postfix (RPN) stream
//! of constants, variables and function calls, then executes that stream on
//! a value stack. It knows nothing about any concrete grammar: all syntax
//! lives in user-supplied [`Recognizer`]s.
//!
//! # Architecture
//!
//! - [`OverloadTable`]: multi-part function names mapped to overloads keyed
//!   by arity, stored in a [`keval_trie::KeySequenceTrie`].
//! - [`Recognizer`]: one pluggable syntax rule. Each recognizer owns its own
//!   overload table; there is no global function registry.
//! - [`Engine`]: two ordered chains of recognizers, one per [`Phase`]. The
//!   front of a chain is consulted first.
//! - [`PostfixExpression`]: the output stream recognizers append to.
//!
//! # Cycle
//!
//! ```text
//! input ──parse──▶ PostfixExpression ──evaluate──▶ T
//!         │
//!         └─ per step: try the chain for the current phase, front to back,
//!            until one recognizer accepts
//! ```
//!
//! Parsing and evaluation are separate calls so a parsed expression can be
//! inspected or evaluated more than once. [`Engine::run`] does both.
//!
//! # Tracing
//!
//! Recognizer attempts and executed elements are logged at `trace` level,
//! failures at `debug`. Call [`init_tracing`] and set
//! `RUST_LOG=keval_eval=trace` to see them.

mod engine;
mod errors;
mod function;
mod options;
mod overload;
mod postfix;
mod recognizer;
mod tracing_setup;

pub use engine::{Engine, EngineBuilder, SharedRecognizer};
pub use errors::{EngineError, EvalError, ParseFailure, ParseFailureKind};
pub use function::{Callable, FunctionDescriptor};
pub use options::{EngineOptions, RollbackPolicy, DEFAULT_STALL_LIMIT};
pub use overload::{OverloadSet, OverloadTable};
pub use postfix::{Element, PostfixExpression};
pub use recognizer::{Phase, Recognizer};
pub use tracing_setup::init_tracing;
