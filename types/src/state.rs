//! Proposal lifecycle states and close outcomes.

use serde::{Deserialize, Serialize};

/// The lifecycle of a proposal singleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Launched with zero tallies; the timer coin does not exist yet.
    Launching,
    /// At least one vote recorded; accepts further vote spends.
    Voting,
    /// Closed with the pass thresholds met; the proposed puzzle ran.
    Passed,
    /// Closed with attendance or margin unmet; nothing ran.
    Failed,
    /// Closed via the self-destruct path, bypassing the margin checks.
    SelfDestructed,
    /// Terminal beacon state. The identity is immutable forever.
    Finished,
}

impl ProposalState {
    /// Whether vote-add/remove spends are accepted in this state.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Launching | Self::Voting)
    }

    /// Whether this state is terminal (no further state change possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Whether the proposal has closed (in any outcome).
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed | Self::SelfDestructed | Self::Finished
        )
    }
}

/// The outcome of a close attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalOutcome {
    /// Attendance, margin, and timelock all satisfied; the proposed puzzle runs.
    Passed,
    /// Timelock satisfied but attendance or margin unmet.
    Failed,
    /// Explicit self-destruct, bypassing margin checks.
    SelfDestructed,
}

impl ProposalOutcome {
    /// The lifecycle state this outcome transitions into.
    pub fn into_state(self) -> ProposalState {
        match self {
            Self::Passed => ProposalState::Passed,
            Self::Failed => ProposalState::Failed,
            Self::SelfDestructed => ProposalState::SelfDestructed,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}
