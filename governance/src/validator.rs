//! The proposal validator: the treasury's gatekeeper over a closing proposal.
//!
//! A pure function over values the treasury passes in as trusted truths. Its
//! defining trick is the coin-id binding: it recomputes the closing
//! proposal's full puzzle commitment from the claimed tallies and payload
//! hash, then the coin id from the claimed parent and amount — and the
//! treasury's coin-announcement assertion only matches a real on-chain coin
//! with exactly those tallies. Lying about any field makes the batch
//! unsatisfiable.

use crate::error::GovernanceError;
use crate::payload::PayloadKind;
use crate::proposal::ProposalPuzzle;
use covenant_coinset::{singleton_puzzle_hash, SingletonStruct};
use covenant_conditions::Condition;
use covenant_crypto::{coin_id, curry_hash, module_hash};
use covenant_types::{Amount, CoinId, DaoRules, LauncherId, ProposalId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the validator module.
pub fn validator_mod_hash() -> PuzzleHash {
    module_hash("covenant/proposal-validator/v1")
}

/// The validator's fixed configuration, committed into the treasury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub treasury_id: LauncherId,
    /// First-phase commitment of the proposal family this validator accepts.
    pub proposal_class_hash: PuzzleHash,
    /// Minimum amount a proposal coin must carry to be executed.
    pub minimum_proposal_amount: Amount,
    /// Where any residual treasury balance is routed on a spend.
    pub excess_puzzle_hash: PuzzleHash,
}

impl ValidatorConfig {
    pub fn validator_hash(&self) -> PuzzleHash {
        let singleton_struct = SingletonStruct::new(self.treasury_id);
        curry_hash(
            &validator_mod_hash(),
            &[
                singleton_struct.struct_hash().as_bytes(),
                self.proposal_class_hash.as_bytes(),
                &self.minimum_proposal_amount.to_be_bytes(),
                self.excess_puzzle_hash.as_bytes(),
            ],
        )
    }

    /// Validate a closing proposal against the current governance rules.
    ///
    /// Checks in order: attendance, pass margin, minimum proposal amount,
    /// coin-id binding, and — for spends — the accounting rule that payouts
    /// never exceed locked funds and the residual routes to the excess
    /// puzzle hash. Output: an authorization announcement of the proposal id
    /// followed by the proposed conditions, untouched.
    pub fn validate(
        &self,
        rules: &DaoRules,
        info: &ProposalInfo,
        tally: &VoteTally,
        proposed_conditions: &[Condition],
        locked_funds: Amount,
    ) -> Result<Vec<Condition>, GovernanceError> {
        if !rules.meets_attendance(tally.total_votes) {
            return Err(GovernanceError::AttendanceNotMet {
                have: tally.total_votes,
                need: rules.attendance_required,
            });
        }
        if !rules.meets_pass_margin(tally.yes_votes, tally.total_votes) {
            return Err(GovernanceError::MarginNotMet {
                yes: tally.yes_votes,
                total: tally.total_votes,
                need_bps: rules.pass_margin_bps,
            });
        }
        if tally.amount < self.minimum_proposal_amount {
            return Err(GovernanceError::ProposalBelowMinimum {
                amount: tally.amount,
                minimum: self.minimum_proposal_amount,
            });
        }

        let inner = ProposalPuzzle::hash_from_parts(
            self.proposal_class_hash,
            tally.proposal_id,
            info.proposed_puzzle_hash,
            tally.yes_votes,
            tally.total_votes,
        );
        let full = singleton_puzzle_hash(tally.proposal_id, &inner);
        let computed = coin_id(&tally.parent_id, &full, tally.amount);
        if computed != info.proposal_coin_id {
            return Err(GovernanceError::ProposalCoinMismatch {
                claimed: info.proposal_coin_id,
                computed,
            });
        }

        if info.kind == PayloadKind::Spend {
            self.check_spend_accounting(proposed_conditions, locked_funds)?;
        }

        let mut output = Vec::with_capacity(proposed_conditions.len() + 1);
        output.push(Condition::CreatePuzzleAnnouncement {
            message: tally.proposal_id.as_bytes().to_vec(),
        });
        output.extend_from_slice(proposed_conditions);
        Ok(output)
    }

    fn check_spend_accounting(
        &self,
        proposed_conditions: &[Condition],
        locked_funds: Amount,
    ) -> Result<(), GovernanceError> {
        let mut payout_total = Amount::ZERO;
        let mut excess_total = Amount::ZERO;
        for condition in proposed_conditions {
            if let Some((puzzle_hash, amount)) = condition.as_created_coin() {
                if puzzle_hash == self.excess_puzzle_hash {
                    excess_total = excess_total
                        .checked_add(amount)
                        .ok_or(GovernanceError::AmountOverflow)?;
                } else {
                    payout_total = payout_total
                        .checked_add(amount)
                        .ok_or(GovernanceError::AmountOverflow)?;
                }
            }
        }
        if payout_total > locked_funds {
            return Err(GovernanceError::TreasuryOverdraw {
                locked: locked_funds,
                requested: payout_total,
            });
        }
        let residual = locked_funds - payout_total;
        if excess_total != residual {
            return Err(GovernanceError::ExcessNotRouted { residual });
        }
        Ok(())
    }
}

/// What the closing proposal announced about itself:
/// `[proposal_coin_id, proposed_puzhash, spend_or_update_flag]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInfo {
    pub proposal_coin_id: CoinId,
    pub proposed_puzzle_hash: PuzzleHash,
    pub kind: PayloadKind,
}

/// The closing proposal's final tallies and coin identity fields:
/// `[proposal_id, total_votes, yes_votes, parent_id, amount]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub proposal_id: ProposalId,
    pub total_votes: Amount,
    pub yes_votes: Amount,
    pub parent_id: CoinId,
    pub amount: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_types::LauncherId;

    fn config() -> ValidatorConfig {
        ValidatorConfig {
            treasury_id: LauncherId::new([0x7E; 32]),
            proposal_class_hash: PuzzleHash::new([0x22; 32]),
            minimum_proposal_amount: Amount::new(1),
            excess_puzzle_hash: PuzzleHash::new([0x31; 32]),
        }
    }

    fn rules() -> DaoRules {
        DaoRules {
            attendance_required: Amount::new(1000),
            pass_margin_bps: 5100,
            ..DaoRules::covenant_defaults()
        }
    }

    fn tally(yes: u64, total: u64) -> (ProposalInfo, VoteTally) {
        let config = config();
        let proposal_id = LauncherId::new([0x50; 32]);
        let proposed = PuzzleHash::new([0x60; 32]);
        let parent_id = CoinId::new([0x70; 32]);
        let amount = Amount::new(10);
        let inner = ProposalPuzzle::hash_from_parts(
            config.proposal_class_hash,
            proposal_id,
            proposed,
            Amount::new(yes),
            Amount::new(total),
        );
        let full = singleton_puzzle_hash(proposal_id, &inner);
        let info = ProposalInfo {
            proposal_coin_id: coin_id(&parent_id, &full, amount),
            proposed_puzzle_hash: proposed,
            kind: PayloadKind::Update,
        };
        let tally = VoteTally {
            proposal_id,
            total_votes: Amount::new(total),
            yes_votes: Amount::new(yes),
            parent_id,
            amount,
        };
        (info, tally)
    }

    #[test]
    fn passing_tally_authorized() {
        let (info, tally) = tally(950, 1200);
        let output = config()
            .validate(&rules(), &info, &tally, &[], Amount::ZERO)
            .unwrap();
        assert_eq!(
            output[0],
            Condition::CreatePuzzleAnnouncement {
                message: tally.proposal_id.as_bytes().to_vec(),
            }
        );
    }

    #[test]
    fn attendance_rejected_before_margin() {
        let (info, tally) = tally(200, 350);
        let result = config().validate(&rules(), &info, &tally, &[], Amount::ZERO);
        assert!(matches!(
            result,
            Err(GovernanceError::AttendanceNotMet { .. })
        ));
    }

    #[test]
    fn margin_rejected() {
        let (info, tally) = tally(500, 1200);
        let result = config().validate(&rules(), &info, &tally, &[], Amount::ZERO);
        assert!(matches!(result, Err(GovernanceError::MarginNotMet { .. })));
    }

    #[test]
    fn lying_about_tallies_breaks_coin_binding() {
        let (info, mut tally) = tally(950, 1200);
        tally.yes_votes = Amount::new(1200);
        let result = config().validate(&rules(), &info, &tally, &[], Amount::ZERO);
        assert!(matches!(
            result,
            Err(GovernanceError::ProposalCoinMismatch { .. })
        ));
    }

    #[test]
    fn spend_accounting_requires_excess_routing() {
        let (mut info, tally) = tally(950, 1200);
        info.kind = PayloadKind::Spend;
        let conds = vec![Condition::CreateCoin {
            puzzle_hash: PuzzleHash::new([0xDA; 32]),
            amount: Amount::new(400),
        }];
        // 600 residual left unrouted.
        let result = config().validate(&rules(), &info, &tally, &conds, Amount::new(1000));
        assert!(matches!(
            result,
            Err(GovernanceError::ExcessNotRouted { .. })
        ));

        let mut routed = conds;
        routed.push(Condition::CreateCoin {
            puzzle_hash: config().excess_puzzle_hash,
            amount: Amount::new(600),
        });
        assert!(config()
            .validate(&rules(), &info, &tally, &routed, Amount::new(1000))
            .is_ok());
    }

    #[test]
    fn spend_overdraw_rejected() {
        let (mut info, tally) = tally(950, 1200);
        info.kind = PayloadKind::Spend;
        let conds = vec![Condition::CreateCoin {
            puzzle_hash: PuzzleHash::new([0xDA; 32]),
            amount: Amount::new(2000),
        }];
        let result = config().validate(&rules(), &info, &tally, &conds, Amount::new(1000));
        assert!(matches!(
            result,
            Err(GovernanceError::TreasuryOverdraw { .. })
        ));
    }
}
