//! DAO governance over the coin-set model.
//!
//! Seven cooperating puzzle families implement proposal creation, weighted
//! voting, quorum/threshold enforcement, and treasury execution with no
//! central coordinator:
//!
//! - **Lockup**: custody of locked voting weight, per-coin voting history.
//! - **Proposal**: the central state machine — tallies, closing, outcomes.
//! - **Timer**: minimum relative-height delay before a proposal may close.
//! - **Validator**: the treasury's gatekeeper over a closing proposal.
//! - **Treasury**: custodian of governance rules and funds.
//! - **Finished beacon**: permanent proof that a proposal closed.
//! - **Funding/merge**: treasury fund coins and their aggregation.
//!
//! Every puzzle is a pure predicate: `evaluate(coin, solution)` returns the
//! conditions the spend emits, and the only coordination between coins is
//! byte-exact announcement matching inside one atomic batch.

pub mod error;
pub mod finished;
pub mod funding;
pub mod lockup;
pub mod payload;
pub mod proposal;
pub mod timer;
pub mod treasury;
pub mod validator;
pub mod vote;

pub use error::GovernanceError;
pub use finished::FinishedPuzzle;
pub use funding::{merge_manifest_message, FundingPuzzle, FundingSolution};
pub use lockup::{LockupClass, LockupPuzzle, LockupSolution};
pub use payload::{PayloadKind, ProposedPayload, SpendPayload, UpdatePayload};
pub use proposal::{CloseOp, ProposalClass, ProposalPuzzle, ProposalSolution, VoteCast, VoteOp};
pub use timer::{TimerPuzzle, TimerSolution};
pub use treasury::{TreasuryPuzzle, TreasurySolution, ORACLE_MESSAGE};
pub use validator::{ProposalInfo, ValidatorConfig, VoteTally};
pub use vote::{ownership_message, VoteDirection, VoteRecord};
