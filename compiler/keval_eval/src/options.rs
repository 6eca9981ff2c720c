//! Engine configuration.
//!
//! Options are plain data handed to [`Engine::with_options`](crate::Engine::with_options)
//! or assembled through [`EngineBuilder`](crate::EngineBuilder).

/// Default for [`EngineOptions::stall_limit`].
pub const DEFAULT_STALL_LIMIT: usize = 16;

/// What happens to output appended by a recognizer that then declines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RollbackPolicy {
    /// Discard everything the declining recognizer appended, so a failed
    /// attempt leaves the output exactly as it found it.
    #[default]
    Truncate,
    /// Keep whatever was appended. Recognizers are then responsible for
    /// only writing once they have committed to a match.
    Keep,
}

impl RollbackPolicy {
    #[inline]
    pub fn truncates(self) -> bool {
        matches!(self, RollbackPolicy::Truncate)
    }
}

/// Tunables for a parse cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EngineOptions {
    pub rollback: RollbackPolicy,
    /// Maximum number of consecutive accepted steps that do not move past
    /// the furthest input position reached so far. Exceeding it fails the
    /// parse with [`ParseFailureKind::Stalled`](crate::ParseFailureKind::Stalled).
    /// `None` disables the guard.
    pub stall_limit: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            rollback: RollbackPolicy::default(),
            stall_limit: Some(DEFAULT_STALL_LIMIT),
        }
    }
}
