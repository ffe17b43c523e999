//! The proposal: the central governance state machine.
//!
//! A proposal is a singleton anchored to a treasury's identity. Vote spends
//! recreate it with updated tallies; the close spend pairs it with its timer
//! and the treasury through announcements and transitions it into the
//! finished-state beacon. Tallies only ever change through checked
//! arithmetic and the invariant `yes_votes <= total_votes` is enforced on
//! every transition.

use crate::error::GovernanceError;
use crate::finished::{finished_mod_hash, FinishedPuzzle};
use crate::lockup::LockupPuzzle;
use crate::timer::{timer_mod_hash, TimerPuzzle};
use crate::treasury::{treasury_mod_hash, TreasuryPuzzle};
use crate::vote::{VoteDirection, VoteRecord};
use covenant_coinset::singleton::{launcher_mod_hash, singleton_mod_hash};
use covenant_coinset::{singleton_puzzle_hash, Coin};
use covenant_conditions::Condition;
use covenant_crypto::{curry_hash, module_hash, puzzle_announcement_id};
use covenant_types::{Amount, CoinId, DaoRules, LauncherId, ProposalId, ProposalOutcome,
    ProposalState, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the proposal module.
pub fn proposal_mod_hash() -> PuzzleHash {
    module_hash("covenant/proposal/v1")
}

/// The protocol-wide half of a proposal's identity: which treasury it is
/// anchored to and which lockup/token family votes on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalClass {
    pub treasury_id: LauncherId,
    pub lockup_class_hash: PuzzleHash,
    pub token_class_hash: PuzzleHash,
}

impl ProposalClass {
    /// First-phase commitment: the proposal module applied to the protocol
    /// constants and the treasury anchor.
    pub fn class_hash(&self) -> PuzzleHash {
        curry_hash(
            &proposal_mod_hash(),
            &[
                timer_mod_hash().as_bytes(),
                singleton_mod_hash().as_bytes(),
                launcher_mod_hash().as_bytes(),
                finished_mod_hash().as_bytes(),
                treasury_mod_hash().as_bytes(),
                self.lockup_class_hash.as_bytes(),
                self.token_class_hash.as_bytes(),
                self.treasury_id.as_bytes(),
            ],
        )
    }
}

/// One proposal coin's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPuzzle {
    pub class: ProposalClass,
    /// The proposal's own launcher id.
    pub proposal_id: ProposalId,
    /// Commitment of the payload that runs if the proposal passes.
    pub proposed_puzzle_hash: PuzzleHash,
    pub yes_votes: Amount,
    pub total_votes: Amount,
}

impl ProposalPuzzle {
    /// A freshly-launched proposal with zero tallies.
    pub fn launch(
        class: ProposalClass,
        proposal_id: ProposalId,
        proposed_puzzle_hash: PuzzleHash,
    ) -> Self {
        Self {
            class,
            proposal_id,
            proposed_puzzle_hash,
            yes_votes: Amount::ZERO,
            total_votes: Amount::ZERO,
        }
    }

    /// Second-phase commitment: class hash re-applied to itself, then the
    /// instance fields.
    pub fn inner_puzzle_hash(&self) -> PuzzleHash {
        Self::hash_from_parts(
            self.class.class_hash(),
            self.proposal_id,
            self.proposed_puzzle_hash,
            self.yes_votes,
            self.total_votes,
        )
    }

    pub fn full_puzzle_hash(&self) -> PuzzleHash {
        singleton_puzzle_hash(self.proposal_id, &self.inner_puzzle_hash())
    }

    /// Inner commitment from raw parts — used by the timer and the validator
    /// to recompute a proposal's identity from claimed tallies.
    pub fn hash_from_parts(
        class_hash: PuzzleHash,
        proposal_id: ProposalId,
        proposed_puzzle_hash: PuzzleHash,
        yes_votes: Amount,
        total_votes: Amount,
    ) -> PuzzleHash {
        curry_hash(
            &class_hash,
            &[
                class_hash.as_bytes(),
                proposal_id.as_bytes(),
                proposed_puzzle_hash.as_bytes(),
                &yes_votes.to_be_bytes(),
                &total_votes.to_be_bytes(),
            ],
        )
    }

    pub fn with_tallies(&self, yes_votes: Amount, total_votes: Amount) -> Self {
        Self {
            yes_votes,
            total_votes,
            ..*self
        }
    }

    /// The timer gating this proposal's close.
    pub fn timer(&self) -> TimerPuzzle {
        TimerPuzzle {
            proposal_class_hash: self.class.class_hash(),
            proposal_id: self.proposal_id,
        }
    }

    pub fn state(&self) -> ProposalState {
        if self.total_votes.is_zero() {
            ProposalState::Launching
        } else {
            ProposalState::Voting
        }
    }

    /// The outcome a close attempt yields under `rules`. Height conditions
    /// (timelock, soft close, self-destruct delay) are enforced by the
    /// ledger against the emitted conditions, not here.
    pub fn close_outcome(&self, rules: &DaoRules, self_destruct: bool) -> ProposalOutcome {
        if self_destruct {
            ProposalOutcome::SelfDestructed
        } else if rules.meets_attendance(self.total_votes)
            && rules.meets_pass_margin(self.yes_votes, self.total_votes)
        {
            ProposalOutcome::Passed
        } else {
            ProposalOutcome::Failed
        }
    }

    /// Evaluate one proposal spend.
    pub fn evaluate(
        &self,
        coin: &Coin,
        solution: &ProposalSolution,
    ) -> Result<Vec<Condition>, GovernanceError> {
        if self.yes_votes > self.total_votes {
            return Err(GovernanceError::InvalidTally {
                yes: self.yes_votes,
                total: self.total_votes,
            });
        }
        match solution {
            ProposalSolution::Vote(op) => self.accept_votes(coin, op),
            ProposalSolution::Close(op) => Ok(self.close(coin, op)),
        }
    }

    fn accept_votes(&self, coin: &Coin, op: &VoteOp) -> Result<Vec<Condition>, GovernanceError> {
        if op.casts.is_empty() {
            return Err(GovernanceError::EmptyVote);
        }
        for (i, cast) in op.casts.iter().enumerate() {
            if op.casts[..i].iter().any(|c| c.coin_id == cast.coin_id) {
                return Err(GovernanceError::DuplicateVoteCoin {
                    coin_id: cast.coin_id,
                });
            }
        }

        let mut weight = Amount::ZERO;
        for cast in &op.casts {
            weight = weight
                .checked_add(cast.amount)
                .ok_or(GovernanceError::TallyOverflow)?;
        }
        let (yes_votes, total_votes) = self.apply_weight(weight, op.direction, op.retract)?;

        let successor = self.with_tallies(yes_votes, total_votes);
        let mut conditions = Vec::with_capacity(2 + op.casts.len() * 2);
        conditions.push(Condition::CreateCoin {
            puzzle_hash: successor.full_puzzle_hash(),
            amount: coin.amount,
        });
        // The first vote establishes the close delay by creating the timer.
        if self.total_votes.is_zero() {
            conditions.push(Condition::CreateCoin {
                puzzle_hash: self.timer().puzzle_hash(),
                amount: Amount::ZERO,
            });
        }
        for cast in &op.casts {
            let record = VoteRecord {
                proposal_id: self.proposal_id,
                coin_id: cast.coin_id,
                amount: cast.amount,
                direction: op.direction,
            };
            let lockup_hash = LockupPuzzle::hash_from_parts(
                self.class.lockup_class_hash,
                &cast.previous_votes,
                &cast.owner_puzzle_hash,
            );
            conditions.push(Condition::CreatePuzzleAnnouncement {
                message: cast.coin_id.as_bytes().to_vec(),
            });
            conditions.push(Condition::AssertPuzzleAnnouncement {
                announcement: puzzle_announcement_id(&lockup_hash, &record.message()),
            });
        }
        Ok(conditions)
    }

    fn apply_weight(
        &self,
        weight: Amount,
        direction: VoteDirection,
        retract: bool,
    ) -> Result<(Amount, Amount), GovernanceError> {
        let (yes_votes, total_votes) = if retract {
            let total = self
                .total_votes
                .checked_sub(weight)
                .ok_or(GovernanceError::TallyUnderflow)?;
            let yes = if direction.is_yes() {
                self.yes_votes
                    .checked_sub(weight)
                    .ok_or(GovernanceError::TallyUnderflow)?
            } else {
                self.yes_votes
            };
            (yes, total)
        } else {
            let total = self
                .total_votes
                .checked_add(weight)
                .ok_or(GovernanceError::TallyOverflow)?;
            let yes = if direction.is_yes() {
                self.yes_votes
                    .checked_add(weight)
                    .ok_or(GovernanceError::TallyOverflow)?
            } else {
                self.yes_votes
            };
            (yes, total)
        };
        if yes_votes > total_votes {
            return Err(GovernanceError::InvalidTally {
                yes: yes_votes,
                total: total_votes,
            });
        }
        Ok((yes_votes, total_votes))
    }

    fn close(&self, coin: &Coin, op: &CloseOp) -> Vec<Condition> {
        let outcome = self.close_outcome(&op.rules, op.self_destruct);
        let treasury_full = singleton_puzzle_hash(
            self.class.treasury_id,
            &TreasuryPuzzle::inner_hash_from_parts(&op.validator_hash, &op.rules),
        );
        let finished = FinishedPuzzle::new(self.proposal_id);

        let mut conditions = Vec::with_capacity(6);
        if op.self_destruct {
            // Liveness path: the timer may be orphaned, so no pairing with
            // it is required — only the longer self-destruct delay.
            conditions.push(Condition::AssertHeightRelative {
                height: op.rules.self_destruct_time,
            });
        } else {
            // A quiet window with no vote spends since the last recreation.
            conditions.push(Condition::AssertHeightRelative {
                height: op.rules.soft_close_length,
            });
            // Pair with the timer: it announces our id, we announce the
            // timelock it must have waited out.
            conditions.push(Condition::AssertPuzzleAnnouncement {
                announcement: puzzle_announcement_id(
                    &self.timer().puzzle_hash(),
                    self.proposal_id.as_bytes(),
                ),
            });
            conditions.push(Condition::CreatePuzzleAnnouncement {
                message: op.rules.proposal_timelock.to_be_bytes().to_vec(),
            });
        }
        // Bind to the treasury: our coin announcement for its assertion, its
        // puzzle announcement (execution for a pass, oracle otherwise) for ours.
        conditions.push(Condition::CreateCoinAnnouncement {
            message: self.proposal_id.as_bytes().to_vec(),
        });
        conditions.push(Condition::AssertPuzzleAnnouncement {
            announcement: puzzle_announcement_id(
                &treasury_full,
                &outcome_message(outcome, &self.proposal_id),
            ),
        });
        conditions.push(Condition::CreateCoin {
            puzzle_hash: finished.full_puzzle_hash(),
            amount: coin.amount,
        });
        conditions
    }
}

/// The announcement message a close expects from the treasury: the proposal
/// id when passing (the execution path authorizes it), the oracle message
/// otherwise.
pub fn outcome_message(outcome: ProposalOutcome, proposal_id: &ProposalId) -> Vec<u8> {
    if outcome.passed() {
        proposal_id.as_bytes().to_vec()
    } else {
        crate::treasury::ORACLE_MESSAGE.to_vec()
    }
}

/// One vote arriving from one lockup coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCast {
    /// The lockup coin's locked weight. Always positive.
    pub amount: Amount,
    /// The lockup coin's id.
    pub coin_id: CoinId,
    /// The lockup's active votes before this one — needed to recompute its
    /// pre-spend identity.
    pub previous_votes: Vec<ProposalId>,
    /// The lockup's owner commitment.
    pub owner_puzzle_hash: PuzzleHash,
}

/// A vote-add or vote-retract spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOp {
    pub direction: VoteDirection,
    /// When set, tallies decrease instead of increase.
    pub retract: bool,
    pub casts: Vec<VoteCast>,
}

/// A close attempt, carrying the treasury's rule values as trusted reveals.
///
/// The wire-level closing layout is positional `(validator_hash, 0,
/// timelock, pass_margin, attendance_required, 0, soft_close_length,
/// self_destruct_time, oracle_spend_delay, self_destruct_flag, my_amount)`;
/// the rule positions collapse into `rules` here. Any lie about a rule value
/// changes the recomputed treasury commitment and the batch cannot match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseOp {
    pub validator_hash: PuzzleHash,
    pub rules: DaoRules,
    pub self_destruct: bool,
}

/// One proposal spend, selected by explicit discriminant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalSolution {
    Vote(VoteOp),
    Close(CloseOp),
}
