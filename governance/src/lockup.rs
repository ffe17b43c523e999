//! The lockup custodian: locked voting weight and per-coin voting history.
//!
//! A lockup coin holds weight-bearing tokens and the list of proposals the
//! coin has voted on and not yet retracted from. The list is what prevents
//! double-counting: adding a proposal id that is already present is an
//! integrity violation that aborts the spend.

use crate::error::GovernanceError;
use crate::finished::{finished_mod_hash, FinishedPuzzle};
use crate::vote::{ownership_message, VoteDirection, VoteRecord};
use covenant_coinset::singleton::{launcher_mod_hash, singleton_mod_hash};
use covenant_coinset::Coin;
use covenant_conditions::Condition;
use covenant_crypto::{blake2b_256_framed, curry_hash, module_hash, puzzle_announcement_id};
use covenant_types::{ProposalId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the lockup module.
pub fn lockup_mod_hash() -> PuzzleHash {
    module_hash("covenant/lockup/v1")
}

/// The protocol-wide half of a lockup's identity: which token class the
/// locked weight is denominated in. Shared by every lockup of one DAO.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockupClass {
    pub token_class_hash: PuzzleHash,
}

impl LockupClass {
    pub fn new(token_class_hash: PuzzleHash) -> Self {
        Self { token_class_hash }
    }

    /// First-phase commitment: the lockup module applied to the protocol
    /// constants. Computed before any instance exists, then folded into each
    /// instance's own commitment.
    pub fn class_hash(&self) -> PuzzleHash {
        curry_hash(
            &lockup_mod_hash(),
            &[
                singleton_mod_hash().as_bytes(),
                launcher_mod_hash().as_bytes(),
                finished_mod_hash().as_bytes(),
                self.token_class_hash.as_bytes(),
            ],
        )
    }
}

/// One lockup coin's state: its class, active votes, and owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockupPuzzle {
    pub class: LockupClass,
    /// Proposal ids currently voted on; order is newest-first, a given id
    /// appears at most once.
    pub active_votes: Vec<ProposalId>,
    /// Inner commitment controlling transfer and withdrawal.
    pub owner_puzzle_hash: PuzzleHash,
}

impl LockupPuzzle {
    pub fn new(
        class: LockupClass,
        active_votes: Vec<ProposalId>,
        owner_puzzle_hash: PuzzleHash,
    ) -> Self {
        Self {
            class,
            active_votes,
            owner_puzzle_hash,
        }
    }

    /// Second-phase commitment: class hash re-applied to itself (so the
    /// successor it names can be recomputed by anyone holding the class),
    /// then the voting history and the owner.
    pub fn puzzle_hash(&self) -> PuzzleHash {
        Self::hash_from_parts(
            self.class.class_hash(),
            &self.active_votes,
            &self.owner_puzzle_hash,
        )
    }

    /// Commitment from raw parts — used by the proposal to recompute a
    /// voting lockup's pre-spend identity without holding the full struct.
    pub fn hash_from_parts(
        class_hash: PuzzleHash,
        active_votes: &[ProposalId],
        owner_puzzle_hash: &PuzzleHash,
    ) -> PuzzleHash {
        let votes_commitment = id_list_commitment(active_votes);
        curry_hash(
            &class_hash,
            &[
                class_hash.as_bytes(),
                &votes_commitment,
                owner_puzzle_hash.as_bytes(),
            ],
        )
    }

    fn with_vote(&self, proposal_id: ProposalId) -> Self {
        let mut votes = Vec::with_capacity(self.active_votes.len() + 1);
        votes.push(proposal_id);
        votes.extend_from_slice(&self.active_votes);
        Self {
            class: self.class,
            active_votes: votes,
            owner_puzzle_hash: self.owner_puzzle_hash,
        }
    }

    fn without_vote(&self, proposal_id: ProposalId) -> Self {
        Self {
            class: self.class,
            active_votes: self
                .active_votes
                .iter()
                .copied()
                .filter(|id| *id != proposal_id)
                .collect(),
            owner_puzzle_hash: self.owner_puzzle_hash,
        }
    }

    /// Evaluate one lockup spend.
    pub fn evaluate(
        &self,
        coin: &Coin,
        solution: &LockupSolution,
    ) -> Result<Vec<Condition>, GovernanceError> {
        match solution {
            LockupSolution::AddVote {
                proposal_id,
                direction,
                proposal_puzzle_hash,
            } => self.add_vote(coin, *proposal_id, *direction, proposal_puzzle_hash),
            LockupSolution::RetractVote {
                proposal_id,
                direction,
            } => self.retract_vote(coin, *proposal_id, *direction),
            LockupSolution::Transfer {
                new_owner_puzzle_hash,
            } => Ok(self.transfer(coin, new_owner_puzzle_hash)),
        }
    }

    fn add_vote(
        &self,
        coin: &Coin,
        proposal_id: ProposalId,
        direction: VoteDirection,
        proposal_puzzle_hash: &PuzzleHash,
    ) -> Result<Vec<Condition>, GovernanceError> {
        if self.active_votes.contains(&proposal_id) {
            return Err(GovernanceError::DuplicateVote { proposal_id });
        }
        let record = VoteRecord {
            proposal_id,
            coin_id: coin.coin_id(),
            amount: coin.amount,
            direction,
        };
        Ok(vec![
            Condition::AssertMyPuzzleHash {
                puzzle_hash: self.puzzle_hash(),
            },
            Condition::CreateCoin {
                puzzle_hash: self.with_vote(proposal_id).puzzle_hash(),
                amount: coin.amount,
            },
            Condition::CreatePuzzleAnnouncement {
                message: record.message(),
            },
            // The proposal announces the id of every vote coin it accepts;
            // mutual commitment binds the two spends into one batch.
            Condition::AssertPuzzleAnnouncement {
                announcement: puzzle_announcement_id(
                    proposal_puzzle_hash,
                    coin.coin_id().as_bytes(),
                ),
            },
        ])
    }

    fn retract_vote(
        &self,
        coin: &Coin,
        proposal_id: ProposalId,
        direction: VoteDirection,
    ) -> Result<Vec<Condition>, GovernanceError> {
        if !self.active_votes.contains(&proposal_id) {
            return Err(GovernanceError::VoteNotFound { proposal_id });
        }
        let record = VoteRecord {
            proposal_id,
            coin_id: coin.coin_id(),
            amount: coin.amount,
            direction,
        };
        let beacon = FinishedPuzzle::new(proposal_id);
        Ok(vec![
            Condition::AssertMyPuzzleHash {
                puzzle_hash: self.puzzle_hash(),
            },
            Condition::CreateCoin {
                puzzle_hash: self.without_vote(proposal_id).puzzle_hash(),
                amount: coin.amount,
            },
            Condition::CreatePuzzleAnnouncement {
                message: record.message(),
            },
            // Only a finished-state beacon perpetually announces the
            // proposal id, so this assertion is unsatisfiable until the
            // proposal has actually closed.
            Condition::AssertPuzzleAnnouncement {
                announcement: puzzle_announcement_id(
                    &beacon.full_puzzle_hash(),
                    proposal_id.as_bytes(),
                ),
            },
        ])
    }

    fn transfer(&self, coin: &Coin, new_owner_puzzle_hash: &PuzzleHash) -> Vec<Condition> {
        let mut successor = self.clone();
        successor.owner_puzzle_hash = *new_owner_puzzle_hash;
        vec![
            Condition::AssertMyPuzzleHash {
                puzzle_hash: self.puzzle_hash(),
            },
            Condition::CreateCoin {
                puzzle_hash: successor.puzzle_hash(),
                amount: coin.amount,
            },
            Condition::CreatePuzzleAnnouncement {
                message: ownership_message(&coin.coin_id()),
            },
        ]
    }
}

/// One lockup spend, selected by explicit discriminant.
///
/// The wire-level solution is positional
/// `(my_id, generated_conditions, my_amount, new_proposal_or_removal_list,
/// inner_puzhash_args…, inner_puzzle_reveal?, new_inner_puzhash?)`; the coin
/// identity fields are taken from the coin being spent rather than repeated
/// here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockupSolution {
    /// Vote on a proposal not yet present in `active_votes`.
    AddVote {
        proposal_id: ProposalId,
        direction: VoteDirection,
        /// Full puzzle commitment of the proposal being voted on, used to
        /// assert its reciprocal announcement.
        proposal_puzzle_hash: PuzzleHash,
    },
    /// Remove a closed proposal from `active_votes`.
    RetractVote {
        proposal_id: ProposalId,
        /// Direction of the vote being retracted.
        direction: VoteDirection,
    },
    /// Change ownership, preserving votes and weight.
    Transfer { new_owner_puzzle_hash: PuzzleHash },
}

fn id_list_commitment(ids: &[ProposalId]) -> [u8; 32] {
    let parts: Vec<&[u8]> = ids.iter().map(|id| id.as_bytes().as_slice()).collect();
    blake2b_256_framed(&parts)
}
