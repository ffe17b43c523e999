//! The finished-state beacon: permanent proof that a proposal closed.
//!
//! A degenerate singleton and a mathematical fixed point: every spend
//! re-announces the proposal id and recreates an identical beacon, forever.
//! Lockup coins consume the announcement to prove a proposal is closed and
//! safe to retract a vote from.

use covenant_coinset::{singleton_puzzle_hash, Coin, SingletonStruct};
use covenant_conditions::Condition;
use covenant_crypto::module_hash;
use covenant_types::{ProposalId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the finished-state module.
pub fn finished_mod_hash() -> PuzzleHash {
    module_hash("covenant/finished-state/v1")
}

/// The terminal beacon for one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedPuzzle {
    pub proposal_id: ProposalId,
}

impl FinishedPuzzle {
    pub fn new(proposal_id: ProposalId) -> Self {
        Self { proposal_id }
    }

    pub fn inner_puzzle_hash(&self) -> PuzzleHash {
        let singleton_struct = SingletonStruct::new(self.proposal_id);
        covenant_crypto::curry_hash(
            &finished_mod_hash(),
            &[
                singleton_struct.struct_hash().as_bytes(),
                finished_mod_hash().as_bytes(),
            ],
        )
    }

    pub fn full_puzzle_hash(&self) -> PuzzleHash {
        singleton_puzzle_hash(self.proposal_id, &self.inner_puzzle_hash())
    }

    /// The one (idempotent) spend path: recreate self, re-announce the id.
    pub fn evaluate(&self, coin: &Coin) -> Vec<Condition> {
        vec![
            Condition::CreateCoin {
                puzzle_hash: self.full_puzzle_hash(),
                amount: coin.amount,
            },
            Condition::CreatePuzzleAnnouncement {
                message: self.proposal_id.as_bytes().to_vec(),
            },
            Condition::AssertMyPuzzleHash {
                puzzle_hash: self.full_puzzle_hash(),
            },
        ]
    }
}
