//! Per-call authorization retry state.

/// Phase of one outgoing call with respect to the auth retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptPhase {
    /// The original call has not been replayed.
    #[default]
    FirstAttempt,
    /// The call was replayed once after an authorization failure. Terminal.
    Retried,
}

/// State carried for the lifetime of one outgoing call, including its replay.
///
/// `retried` flips from false to true at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthAttemptState {
    retried: bool,
}

impl AuthAttemptState {
    /// Creates the state for a call that is about to begin.
    #[must_use]
    pub const fn new() -> Self {
        Self { retried: false }
    }

    /// Returns true once the call has been replayed.
    #[must_use]
    pub const fn retried(&self) -> bool {
        self.retried
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AttemptPhase {
        if self.retried {
            AttemptPhase::Retried
        } else {
            AttemptPhase::FirstAttempt
        }
    }

    /// Moves to `Retried`. Returns false if the call was already retried.
    pub const fn begin_retry(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}
