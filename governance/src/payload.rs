//! The two allow-listed payload classes a proposal may carry.
//!
//! A proposal commits to the hash of the code it will run if it passes. Only
//! two classes of payload are executable by the treasury: a *spend* (pay out
//! treasury funds) or an *update* (replace the governance rule set). The
//! treasury recomputes the revealed payload's commitment and refuses
//! anything else.

use crate::error::GovernanceError;
use crate::funding::delegation_message;
use crate::treasury::{rules_commitment, treasury_mod_hash, TreasuryPuzzle};
use crate::validator::ValidatorConfig;
use covenant_coinset::SingletonStruct;
use covenant_conditions::Condition;
use covenant_crypto::{blake2b_256_framed, curry_hash, module_hash};
use covenant_types::{Amount, CoinId, DaoRules, LauncherId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the spend-payload module.
pub fn spend_payload_mod_hash() -> PuzzleHash {
    module_hash("covenant/spend-payload/v1")
}

/// Protocol identity of the update-payload module.
pub fn update_payload_mod_hash() -> PuzzleHash {
    module_hash("covenant/update-payload/v1")
}

/// Which allow-listed class a proposal's payload belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    Spend,
    Update,
}

/// A payload that pays treasury funds out to fixed targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendPayload {
    pub treasury_id: LauncherId,
    /// Fixed payout targets and amounts.
    pub payouts: Vec<(PuzzleHash, Amount)>,
    /// The funding-coin puzzle the treasury's value sits in.
    pub funding_puzzle_hash: PuzzleHash,
}

impl SpendPayload {
    pub fn puzzle_hash(&self) -> PuzzleHash {
        let singleton_struct = SingletonStruct::new(self.treasury_id);
        curry_hash(
            &spend_payload_mod_hash(),
            &[
                singleton_struct.struct_hash().as_bytes(),
                &self.payouts_commitment(),
                self.funding_puzzle_hash.as_bytes(),
            ],
        )
    }

    fn payouts_commitment(&self) -> [u8; 32] {
        let mut encoded: Vec<[u8; 40]> = Vec::with_capacity(self.payouts.len());
        for (puzzle_hash, amount) in &self.payouts {
            let mut buf = [0u8; 40];
            buf[..32].copy_from_slice(puzzle_hash.as_bytes());
            buf[32..].copy_from_slice(&amount.to_be_bytes());
            encoded.push(buf);
        }
        let parts: Vec<&[u8]> = encoded.iter().map(|b| b.as_slice()).collect();
        blake2b_256_framed(&parts)
    }

    /// Total value this payload pays out.
    pub fn payout_total(&self) -> Result<Amount, GovernanceError> {
        let mut total = Amount::ZERO;
        for (_, amount) in &self.payouts {
            total = total
                .checked_add(*amount)
                .ok_or(GovernanceError::AmountOverflow)?;
        }
        Ok(total)
    }

    /// Emit the payload's conditions over the funding coins being drained:
    /// a delegation announcement authorizing each funding spend, the payout
    /// coins, and the residual routed to `excess_puzzle_hash`.
    pub fn evaluate(
        &self,
        funding: &[(CoinId, Amount)],
        excess_puzzle_hash: PuzzleHash,
    ) -> Result<Vec<Condition>, GovernanceError> {
        let mut locked = Amount::ZERO;
        for (_, amount) in funding {
            locked = locked
                .checked_add(*amount)
                .ok_or(GovernanceError::AmountOverflow)?;
        }
        let payout_total = self.payout_total()?;
        if payout_total > locked {
            return Err(GovernanceError::TreasuryOverdraw {
                locked,
                requested: payout_total,
            });
        }

        let payload_hash = self.puzzle_hash();
        let mut conditions = Vec::with_capacity(funding.len() + self.payouts.len() + 1);
        for (coin_id, _) in funding {
            conditions.push(Condition::CreatePuzzleAnnouncement {
                message: delegation_message(coin_id, &payload_hash),
            });
        }
        for (puzzle_hash, amount) in &self.payouts {
            conditions.push(Condition::CreateCoin {
                puzzle_hash: *puzzle_hash,
                amount: *amount,
            });
        }
        let residual = locked - payout_total;
        if !residual.is_zero() {
            conditions.push(Condition::CreateCoin {
                puzzle_hash: excess_puzzle_hash,
                amount: residual,
            });
        }
        Ok(conditions)
    }
}

/// A payload that replaces the treasury's governance rules (and validator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub validator: ValidatorConfig,
    pub new_rules: DaoRules,
}

impl UpdatePayload {
    pub fn puzzle_hash(&self) -> PuzzleHash {
        curry_hash(
            &update_payload_mod_hash(),
            &[
                treasury_mod_hash().as_bytes(),
                self.validator.validator_hash().as_bytes(),
                &rules_commitment(&self.new_rules),
            ],
        )
    }

    /// Emit the recreation of the treasury under the new rule set. The
    /// treasury's singleton identity is unchanged; only the inner commitment
    /// moves.
    pub fn evaluate(&self, treasury_id: LauncherId, treasury_amount: Amount) -> Vec<Condition> {
        let successor = TreasuryPuzzle {
            treasury_id,
            validator: self.validator.clone(),
            rules: self.new_rules,
        };
        vec![Condition::CreateCoin {
            puzzle_hash: successor.full_puzzle_hash(),
            amount: treasury_amount,
        }]
    }
}

/// The revealed payload of a closing proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposedPayload {
    Spend(SpendPayload),
    Update(UpdatePayload),
}

impl ProposedPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Spend(_) => PayloadKind::Spend,
            Self::Update(_) => PayloadKind::Update,
        }
    }

    pub fn puzzle_hash(&self) -> PuzzleHash {
        match self {
            Self::Spend(payload) => payload.puzzle_hash(),
            Self::Update(payload) => payload.puzzle_hash(),
        }
    }
}
