//! The treasury: custodian of governance rules and funds.
//!
//! Two spend paths. The oracle path changes nothing and exists so other
//! coins can observe canonical treasury state: a puzzle announcement is
//! already bound to the treasury's commitment (hence every rule value), so
//! the zero-byte message is the parameter oracle. The execution path binds
//! itself to a closing proposal with a coin-announcement assertion, runs the
//! validator, and either pays out funds or replaces its own rule set.

use crate::error::GovernanceError;
use crate::payload::{PayloadKind, ProposedPayload};
use crate::validator::{ProposalInfo, ValidatorConfig, VoteTally};
use covenant_coinset::{singleton_puzzle_hash, Coin};
use covenant_conditions::Condition;
use covenant_crypto::{blake2b_256_framed, coin_announcement_id, curry_hash, module_hash};
use covenant_types::{Amount, CoinId, DaoRules, LauncherId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the treasury module.
pub fn treasury_mod_hash() -> PuzzleHash {
    module_hash("covenant/treasury/v1")
}

/// Message of the treasury's oracle announcement. The emitter identity
/// carries the parameters; the message is fixed.
pub const ORACLE_MESSAGE: [u8; 1] = [0];

/// Canonical commitment of a rule set, folded into the treasury's identity.
pub fn rules_commitment(rules: &DaoRules) -> [u8; 32] {
    blake2b_256_framed(&[
        &rules.proposal_timelock.to_be_bytes(),
        &rules.soft_close_length.to_be_bytes(),
        &rules.attendance_required.to_be_bytes(),
        &rules.pass_margin_bps.to_be_bytes(),
        &rules.self_destruct_time.to_be_bytes(),
        &rules.oracle_spend_delay.to_be_bytes(),
    ])
}

/// The treasury singleton's inner state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryPuzzle {
    pub treasury_id: LauncherId,
    pub validator: ValidatorConfig,
    pub rules: DaoRules,
}

impl TreasuryPuzzle {
    pub fn new(treasury_id: LauncherId, validator: ValidatorConfig, rules: DaoRules) -> Self {
        Self {
            treasury_id,
            validator,
            rules,
        }
    }

    /// Inner commitment from raw parts — also used by closing proposals to
    /// recompute the treasury they must pair with.
    pub fn inner_hash_from_parts(validator_hash: &PuzzleHash, rules: &DaoRules) -> PuzzleHash {
        curry_hash(
            &treasury_mod_hash(),
            &[
                treasury_mod_hash().as_bytes(),
                validator_hash.as_bytes(),
                &rules_commitment(rules),
            ],
        )
    }

    pub fn inner_puzzle_hash(&self) -> PuzzleHash {
        Self::inner_hash_from_parts(&self.validator.validator_hash(), &self.rules)
    }

    pub fn full_puzzle_hash(&self) -> PuzzleHash {
        singleton_puzzle_hash(self.treasury_id, &self.inner_puzzle_hash())
    }

    /// Evaluate one treasury spend.
    pub fn evaluate(
        &self,
        coin: &Coin,
        solution: &TreasurySolution,
    ) -> Result<Vec<Condition>, GovernanceError> {
        match solution {
            TreasurySolution::Oracle => Ok(self.oracle(coin)),
            TreasurySolution::Execute {
                info,
                tally,
                payload,
                funding,
            } => self.execute(coin, info, tally, payload, funding),
        }
    }

    fn oracle(&self, coin: &Coin) -> Vec<Condition> {
        vec![
            Condition::AssertHeightRelative {
                height: self.rules.oracle_spend_delay,
            },
            Condition::CreateCoin {
                puzzle_hash: self.full_puzzle_hash(),
                amount: coin.amount,
            },
            Condition::CreatePuzzleAnnouncement {
                message: ORACLE_MESSAGE.to_vec(),
            },
        ]
    }

    fn execute(
        &self,
        coin: &Coin,
        info: &ProposalInfo,
        tally: &VoteTally,
        payload: &ProposedPayload,
        funding: &[(CoinId, Amount)],
    ) -> Result<Vec<Condition>, GovernanceError> {
        // Allow-list check: the revealed payload must be one of the two
        // payload classes and hash to exactly what the proposal committed to.
        if payload.kind() != info.kind {
            return Err(GovernanceError::PayloadKindMismatch {
                committed: info.kind,
                revealed: payload.kind(),
            });
        }
        let revealed = payload.puzzle_hash();
        if revealed != info.proposed_puzzle_hash {
            return Err(GovernanceError::ProposedPuzzleMismatch {
                committed: info.proposed_puzzle_hash,
                revealed,
            });
        }

        let mut locked_funds = Amount::ZERO;
        for (_, amount) in funding {
            locked_funds = locked_funds
                .checked_add(*amount)
                .ok_or(GovernanceError::AmountOverflow)?;
        }

        let proposed_conditions = match payload {
            ProposedPayload::Spend(spend) => {
                spend.evaluate(funding, self.validator.excess_puzzle_hash)?
            }
            ProposedPayload::Update(update) => update.evaluate(self.treasury_id, coin.amount),
        };

        let mut conditions = Vec::new();
        // Bind this spend to the closing proposal coin.
        conditions.push(Condition::AssertCoinAnnouncement {
            announcement: coin_announcement_id(
                &info.proposal_coin_id,
                tally.proposal_id.as_bytes(),
            ),
        });
        conditions.extend(self.validator.validate(
            &self.rules,
            info,
            tally,
            &proposed_conditions,
            locked_funds,
        )?);
        // An update recreates the treasury through its payload; a spend
        // leaves the identity untouched and recreates it here.
        if payload.kind() == PayloadKind::Spend {
            conditions.push(Condition::CreateCoin {
                puzzle_hash: self.full_puzzle_hash(),
                amount: coin.amount,
            });
        }
        Ok(conditions)
    }
}

/// One treasury spend, selected by explicit discriminant.
///
/// The wire-level layouts are positional: `(0,0,0,0,0, treasury_struct)` for
/// the oracle path and `([proposal_coin_id, proposed_puzhash, flag],
/// [proposal_id, total_votes, yes_votes, parent_id, amount],
/// proposed_puzzle_reveal, proposed_solution)` for execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasurySolution {
    /// Announce canonical treasury state; no state change.
    Oracle,
    /// Execute a validated closing proposal.
    Execute {
        info: ProposalInfo,
        tally: VoteTally,
        payload: ProposedPayload,
        /// The funding coins `(coin id, amount)` backing this execution.
        funding: Vec<(CoinId, Amount)>,
    },
}
