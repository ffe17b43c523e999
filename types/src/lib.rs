//! Fundamental types for the Covenant governance protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: coin and puzzle identifiers, announcement ids, amounts,
//! governance rules, and proposal lifecycle states.

pub mod amount;
pub mod hash;
pub mod rules;
pub mod state;

pub use amount::Amount;
pub use hash::{AnnouncementId, CoinId, LauncherId, ProposalId, PuzzleHash};
pub use rules::{DaoRules, BPS_DENOMINATOR};
pub use state::{ProposalOutcome, ProposalState};
