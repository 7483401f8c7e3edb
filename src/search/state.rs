//! Dispatch state machine
//!
//! Tracks progress through the ordered mirror list:
//!
//! ```text
//! Idle -> TryingMirror(0) -> Success(0)
//!                         -> NextMirror(0) -> TryingMirror(1) -> ...
//!                                          -> Exhausted
//! ```
//!
//! `Success` and `Exhausted` are terminal.

use crate::types::ResultEntry;

/// Where the dispatcher is in the mirror list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No mirror has been tried yet
    Idle,

    /// The mirror at this index is being queried
    TryingMirror(usize),

    /// The mirror at this index returned results
    Success(usize),

    /// The mirror at this index was skipped
    NextMirror(usize),

    /// No mirror returned results
    Exhausted,
}

/// How a single mirror attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The mirror returned at least one entry
    Success(Vec<ResultEntry>),

    /// The mirror failed or returned nothing; the reason is informational
    Skip(String),
}

impl DispatchState {
    /// Leaves `Idle` for the first mirror, or `Exhausted` if there is none
    pub fn start(mirror_count: usize) -> Self {
        Self::Idle.advance(mirror_count)
    }

    /// Moves from a decision point to the next mirror or to exhaustion
    ///
    /// Only `Idle` and `NextMirror` advance; every other state is returned
    /// unchanged.
    pub fn advance(self, mirror_count: usize) -> Self {
        let next = match self {
            Self::Idle => 0,
            Self::NextMirror(index) => index + 1,
            other => return other,
        };

        if next < mirror_count {
            Self::TryingMirror(next)
        } else {
            Self::Exhausted
        }
    }

    /// Settles the mirror currently being tried
    ///
    /// Has no effect outside `TryingMirror`.
    pub fn resolve(self, outcome: &MirrorOutcome) -> Self {
        match (self, outcome) {
            (Self::TryingMirror(index), MirrorOutcome::Success(_)) => Self::Success(index),
            (Self::TryingMirror(index), MirrorOutcome::Skip(_)) => Self::NextMirror(index),
            (other, _) => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Exhausted)
    }
}
