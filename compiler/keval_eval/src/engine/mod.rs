//! The evaluation engine: recognizer chains, the parse loop and the
//! postfix executor.
//!
//! # Parse loop
//!
//! Starting at position 0 in phase [`Phase::Pre`], each step walks the chain
//! of the current phase from front to back and stops at the first recognizer
//! that accepts. The loop ends successfully once the position reaches the end
//! of the input, and fails when a whole chain declines.
//!
//! Chains are `VecDeque`s of shared recognizers: registration pushes to the
//! front, so the most recently added recognizer takes precedence over
//! everything registered before it.

mod builder;

pub use builder::EngineBuilder;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    Element, EngineError, EngineOptions, EvalError, ParseFailure, Phase, PostfixExpression,
    Recognizer,
};

/// A recognizer as stored in a chain.
///
/// The same instance may be registered in both chains.
pub type SharedRecognizer<T, K> = Arc<dyn Recognizer<T, K>>;

/// Inline capacity of the evaluation stack.
const INLINE_STACK: usize = 16;

/// Inline capacity for the operands of a single call.
const INLINE_ARGS: usize = 8;

/// Two recognizer chains plus the options governing a parse cycle.
///
/// The engine holds no per-cycle state, so one engine can serve any number
/// of parses, including concurrent ones when `T` and `K` allow it.
pub struct Engine<T, K> {
    pre_chain: VecDeque<SharedRecognizer<T, K>>,
    post_chain: VecDeque<SharedRecognizer<T, K>>,
    options: EngineOptions,
}

impl<T, K> Engine<T, K> {
    /// An engine with empty chains and default options.
    pub fn new() -> Self {
        Engine::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Engine {
            pre_chain: VecDeque::new(),
            post_chain: VecDeque::new(),
            options,
        }
    }

    pub fn builder() -> EngineBuilder<T, K> {
        EngineBuilder::new()
    }

    #[inline]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Wrap `recognizer` and put it at the front of the `phase` chain.
    ///
    /// Returns a handle to the stored instance, so the caller can register
    /// it in the other chain too or keep inspecting it.
    pub fn add_handler_front<R>(&mut self, phase: Phase, recognizer: R) -> Arc<R>
    where
        R: Recognizer<T, K> + 'static,
    {
        let recognizer = Arc::new(recognizer);
        let shared: SharedRecognizer<T, K> = recognizer.clone();
        self.add_shared_handler_front(phase, shared);
        recognizer
    }

    /// Put an already shared recognizer at the front of the `phase` chain.
    pub fn add_shared_handler_front(&mut self, phase: Phase, recognizer: SharedRecognizer<T, K>) {
        trace!(%phase, recognizer = recognizer.name(), "registering recognizer");
        self.chain_mut(phase).push_front(recognizer);
    }

    /// The `phase` chain in consultation order.
    pub fn chain(&self, phase: Phase) -> impl ExactSizeIterator<Item = &SharedRecognizer<T, K>> {
        self.chain_ref(phase).iter()
    }

    pub fn chain_len(&self, phase: Phase) -> usize {
        self.chain_ref(phase).len()
    }

    fn chain_ref(&self, phase: Phase) -> &VecDeque<SharedRecognizer<T, K>> {
        match phase {
            Phase::Pre => &self.pre_chain,
            Phase::Post => &self.post_chain,
        }
    }

    fn chain_mut(&mut self, phase: Phase) -> &mut VecDeque<SharedRecognizer<T, K>> {
        match phase {
            Phase::Pre => &mut self.pre_chain,
            Phase::Post => &mut self.post_chain,
        }
    }

    /// Translate `input` into postfix form, replacing the contents of
    /// `output`.
    ///
    /// On failure `output` keeps what the accepted steps produced, which is
    /// useful for diagnostics but not meant to be evaluated.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn parse(&self, output: &mut PostfixExpression<T>, input: &[K]) -> Result<(), ParseFailure> {
        output.clear();
        let mut pos = 0;
        let mut phase = Phase::Pre;
        let mut furthest = 0;
        let mut stalled = 0usize;

        while pos < input.len() {
            if !self.step(&mut pos, input, &mut phase, output) {
                debug!(position = pos, %phase, "no recognizer matched");
                return Err(ParseFailure::no_match(pos, phase));
            }

            if pos > furthest {
                furthest = pos;
                stalled = 0;
            } else {
                stalled += 1;
                if self.options.stall_limit.is_some_and(|limit| stalled > limit) {
                    debug!(position = pos, %phase, steps = stalled, "parse stalled");
                    return Err(ParseFailure::stalled(pos, phase));
                }
            }
        }

        trace!(elements = output.len(), "parse complete");
        Ok(())
    }

    /// Run one step: the first accepting recognizer of the active chain.
    fn step(
        &self,
        pos: &mut usize,
        input: &[K],
        phase: &mut Phase,
        output: &mut PostfixExpression<T>,
    ) -> bool {
        for recognizer in self.chain_ref(*phase) {
            let (start, start_phase, start_len) = (*pos, *phase, output.len());
            if recognizer.parse(pos, input, phase, output) {
                trace!(
                    recognizer = recognizer.name(),
                    from = start,
                    to = *pos,
                    phase = %*phase,
                    "accepted"
                );
                return true;
            }
            trace!(recognizer = recognizer.name(), position = start, "declined");
            *pos = start;
            *phase = start_phase;
            if self.options.rollback.truncates() {
                output.truncate(start_len);
            }
        }
        false
    }

    /// Execute a postfix stream and return the single value it leaves.
    ///
    /// Constants and variables are pushed. A call pops `arity` operands and
    /// passes them to its function in push order (`args[0]` is the deepest).
    /// A panicking function unwinds through this call.
    #[tracing::instrument(level = "debug", skip_all, fields(elements = output.len()))]
    pub fn evaluate(&self, output: &PostfixExpression<T>) -> Result<T, EvalError>
    where
        T: Clone,
    {
        let mut stack: SmallVec<[T; INLINE_STACK]> = SmallVec::new();

        for (position, element) in output.iter().enumerate() {
            match element {
                Element::Constant(value) | Element::Variable(value) => {
                    stack.push(value.clone());
                }
                Element::Call { function, arity } => {
                    let available = stack.len();
                    if available < *arity {
                        debug!(position, needed = *arity, available, "stack underflow");
                        return Err(EvalError::StackUnderflow {
                            position,
                            needed: *arity,
                            available,
                        });
                    }
                    let args: SmallVec<[T; INLINE_ARGS]> =
                        stack.drain(available - arity..).collect();
                    stack.push(function.call(&args));
                }
            }
            trace!(position, depth = stack.len(), "executed element");
        }

        if stack.len() != 1 {
            debug!(size = stack.len(), "invalid final stack size");
            return Err(EvalError::InvalidStackSize { size: stack.len() });
        }
        stack
            .pop()
            .ok_or(EvalError::InvalidStackSize { size: 0 })
    }

    /// Parse `input` into a fresh expression and evaluate it.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn run(&self, input: &[K]) -> Result<T, EngineError>
    where
        T: Clone,
    {
        let mut output = PostfixExpression::new();
        self.parse(&mut output, input)?;
        Ok(self.evaluate(&output)?)
    }
}

impl<T, K> Default for Engine<T, K> {
    fn default() -> Self {
        Engine::new()
    }
}

impl<T, K> fmt::Debug for Engine<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |chain: &VecDeque<SharedRecognizer<T, K>>| {
            chain.iter().map(|r| r.name().to_owned()).collect::<Vec<_>>()
        };
        f.debug_struct("Engine")
            .field("pre_chain", &names(&self.pre_chain))
            .field("post_chain", &names(&self.post_chain))
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests;
