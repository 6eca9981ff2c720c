//! Builder for configuring and assembling an [`Engine`].

use std::sync::Arc;

use super::{Engine, SharedRecognizer};
use crate::{EngineOptions, Phase, Recognizer, RollbackPolicy};

/// Builder for creating [`Engine`] instances.
///
/// Handlers are registered in call order, each at the front of its chain, so
/// the last `handler` call for a phase is the first recognizer consulted.
///
/// ```text
/// Engine::builder()
///     .handler(Phase::Pre, Number)
///     .handler(Phase::Post, BinaryOp)
///     .stall_limit(None)
///     .build()
/// ```
pub struct EngineBuilder<T, K> {
    options: EngineOptions,
    handlers: Vec<(Phase, SharedRecognizer<T, K>)>,
}

impl<T, K> EngineBuilder<T, K> {
    pub fn new() -> Self {
        EngineBuilder {
            options: EngineOptions::default(),
            handlers: Vec::new(),
        }
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.options.rollback = rollback;
        self
    }

    /// `None` disables the stall guard.
    #[must_use]
    pub fn stall_limit(mut self, limit: Option<usize>) -> Self {
        self.options.stall_limit = limit;
        self
    }

    #[must_use]
    pub fn handler<R>(self, phase: Phase, recognizer: R) -> Self
    where
        R: Recognizer<T, K> + 'static,
    {
        self.shared_handler(phase, Arc::new(recognizer))
    }

    /// Register an already shared recognizer, e.g. one that also goes into
    /// the other chain.
    #[must_use]
    pub fn shared_handler(mut self, phase: Phase, recognizer: SharedRecognizer<T, K>) -> Self {
        self.handlers.push((phase, recognizer));
        self
    }

    pub fn build(self) -> Engine<T, K> {
        let mut engine = Engine::with_options(self.options);
        for (phase, recognizer) in self.handlers {
            engine.add_shared_handler_front(phase, recognizer);
        }
        engine
    }
}

impl<T, K> Default for EngineBuilder<T, K> {
    fn default() -> Self {
        EngineBuilder::new()
    }
}
