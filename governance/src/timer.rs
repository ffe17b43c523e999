//! The proposal timer: the minimum relative-height gate on closing.
//!
//! Created by the proposal's first vote spend, the timer has exactly one
//! spend path and emits exactly four conditions: the relative-height wait,
//! the announcement pairing it with its proposal's close, the reciprocal
//! assertion of the proposal's timelock announcement, and an ancestry check
//! proving its parent really was the proposal coin that created it.

use crate::proposal::ProposalPuzzle;
use covenant_coinset::{singleton_puzzle_hash, SingletonStruct};
use covenant_conditions::Condition;
use covenant_crypto::{coin_id, curry_hash, module_hash, puzzle_announcement_id};
use covenant_types::{Amount, CoinId, ProposalId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the timer module.
pub fn timer_mod_hash() -> PuzzleHash {
    module_hash("covenant/proposal-timer/v1")
}

/// The timer paired with one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPuzzle {
    /// First-phase commitment of the proposal family.
    pub proposal_class_hash: PuzzleHash,
    pub proposal_id: ProposalId,
}

impl TimerPuzzle {
    pub fn puzzle_hash(&self) -> PuzzleHash {
        let singleton_struct = SingletonStruct::new(self.proposal_id);
        curry_hash(
            &timer_mod_hash(),
            &[
                self.proposal_class_hash.as_bytes(),
                singleton_struct.struct_hash().as_bytes(),
            ],
        )
    }

    /// Evaluate the timer's single spend path. Infallible: the timer gates
    /// timing only, and every check it makes is a ledger condition.
    pub fn evaluate(&self, solution: &TimerSolution) -> Vec<Condition> {
        // The proposal's identity at close time, recomputed from the tallies
        // the solution claims — the announcement pairing fails if they lie.
        let closing_inner = ProposalPuzzle::hash_from_parts(
            self.proposal_class_hash,
            self.proposal_id,
            solution.proposed_puzzle_hash,
            solution.yes_votes,
            solution.total_votes,
        );
        let closing_full = singleton_puzzle_hash(self.proposal_id, &closing_inner);

        // The timer's parent must be the proposal coin that created it — the
        // launch-state proposal, before any tallies accumulated.
        let launch_inner = ProposalPuzzle::hash_from_parts(
            self.proposal_class_hash,
            self.proposal_id,
            solution.proposed_puzzle_hash,
            Amount::ZERO,
            Amount::ZERO,
        );
        let launch_full = singleton_puzzle_hash(self.proposal_id, &launch_inner);
        let parent_id = coin_id(
            &solution.parent_parent_id,
            &launch_full,
            solution.parent_amount,
        );

        vec![
            Condition::AssertHeightRelative {
                height: solution.timelock,
            },
            Condition::CreatePuzzleAnnouncement {
                message: self.proposal_id.as_bytes().to_vec(),
            },
            Condition::AssertPuzzleAnnouncement {
                announcement: puzzle_announcement_id(
                    &closing_full,
                    &solution.timelock.to_be_bytes(),
                ),
            },
            Condition::AssertMyParentId { parent_id },
        ]
    }
}

/// The timer's one solution:
/// `(yes_votes, total_votes, proposal_inner_puzhash, timelock,
/// parent_parent_id, parent_amount)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSolution {
    /// The proposal's tallies at close time.
    pub yes_votes: Amount,
    pub total_votes: Amount,
    /// The payload commitment carried by the proposal.
    pub proposed_puzzle_hash: PuzzleHash,
    /// The treasury's proposal timelock, echoed by the closing proposal.
    pub timelock: u64,
    /// The launch-state proposal coin's parent.
    pub parent_parent_id: CoinId,
    /// The launch-state proposal coin's amount.
    pub parent_amount: Amount,
}
