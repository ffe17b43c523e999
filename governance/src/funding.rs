//! Treasury funding coins and their aggregation.
//!
//! Treasury value sits in many small funding coins, each independently
//! spendable two ways: via a delegated puzzle directly authorized by the
//! treasury singleton, or via the merge path that combines many funding
//! coins into one without a treasury spend. Merge accounting is byte-exact:
//! the aggregator's manifest enumerates every contribution, contributors
//! assert the manifest, and the aggregator asserts each contributor back, so
//! no coin can be replayed into a different merge set.

use crate::error::GovernanceError;
use covenant_coinset::{singleton_puzzle_hash, Coin, SingletonStruct};
use covenant_conditions::Condition;
use covenant_crypto::{
    blake2b_256_framed, coin_announcement_id, curry_hash, module_hash, puzzle_announcement_id,
};
use covenant_types::{Amount, CoinId, LauncherId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the funding-coin module.
pub fn funding_mod_hash() -> PuzzleHash {
    module_hash("covenant/funding/v1")
}

/// Message of a contributor's inclusion announcement.
const CONTRIBUTION_MESSAGE: [u8; 1] = [0];

/// The authorization message the treasury announces to release one funding
/// coin to a delegated puzzle.
pub fn delegation_message(coin_id: &CoinId, delegated_puzzle_hash: &PuzzleHash) -> Vec<u8> {
    blake2b_256_framed(&[coin_id.as_bytes(), delegated_puzzle_hash.as_bytes()]).to_vec()
}

/// The manifest message enumerating a merge set's contributions
/// `(parent coin id, amount)`, announced once by the aggregator.
pub fn merge_manifest_message(contributions: &[(CoinId, Amount)]) -> Vec<u8> {
    let mut encoded: Vec<[u8; 40]> = Vec::with_capacity(contributions.len());
    for (coin_id, amount) in contributions {
        let mut buf = [0u8; 40];
        buf[..32].copy_from_slice(coin_id.as_bytes());
        buf[32..].copy_from_slice(&amount.to_be_bytes());
        encoded.push(buf);
    }
    let parts: Vec<&[u8]> = encoded.iter().map(|b| b.as_slice()).collect();
    blake2b_256_framed(&parts).to_vec()
}

/// A coin holding treasury funds, spendable only under treasury authority or
/// into a merge with its peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingPuzzle {
    pub treasury_id: LauncherId,
}

impl FundingPuzzle {
    pub fn new(treasury_id: LauncherId) -> Self {
        Self { treasury_id }
    }

    pub fn puzzle_hash(&self) -> PuzzleHash {
        let singleton_struct = SingletonStruct::new(self.treasury_id);
        curry_hash(&funding_mod_hash(), &[singleton_struct.struct_hash().as_bytes()])
    }

    /// Evaluate one funding-coin spend.
    pub fn evaluate(
        &self,
        coin: &Coin,
        solution: &FundingSolution,
    ) -> Result<Vec<Condition>, GovernanceError> {
        match solution {
            FundingSolution::Delegated {
                treasury_inner_puzzle_hash,
                delegated_puzzle_hash,
                conditions,
            } => Ok(self.delegated(
                coin,
                treasury_inner_puzzle_hash,
                delegated_puzzle_hash,
                conditions,
            )),
            FundingSolution::MergeContribute {
                aggregator_coin,
                contributions,
            } => self.merge_contribute(coin, aggregator_coin, contributions),
            FundingSolution::MergeAggregate { contributions } => {
                self.merge_aggregate(coin, contributions)
            }
        }
    }

    fn delegated(
        &self,
        coin: &Coin,
        treasury_inner_puzzle_hash: &PuzzleHash,
        delegated_puzzle_hash: &PuzzleHash,
        conditions: &[Condition],
    ) -> Vec<Condition> {
        let treasury_full = singleton_puzzle_hash(self.treasury_id, treasury_inner_puzzle_hash);
        let mut out = Vec::with_capacity(conditions.len() + 2);
        out.push(Condition::AssertMyPuzzleHash {
            puzzle_hash: self.puzzle_hash(),
        });
        out.push(Condition::AssertPuzzleAnnouncement {
            announcement: puzzle_announcement_id(
                &treasury_full,
                &delegation_message(&coin.coin_id(), delegated_puzzle_hash),
            ),
        });
        out.extend_from_slice(conditions);
        out
    }

    fn merge_contribute(
        &self,
        coin: &Coin,
        aggregator_coin: &Coin,
        contributions: &[(CoinId, Amount)],
    ) -> Result<Vec<Condition>, GovernanceError> {
        // Funds must stay in treasury custody: refuse to merge into a coin
        // that is not itself a funding coin of this treasury.
        if aggregator_coin.puzzle_hash != self.puzzle_hash() {
            return Err(GovernanceError::MergeForeignAggregator {
                puzzle_hash: aggregator_coin.puzzle_hash,
            });
        }
        let my_id = coin.coin_id();
        match contributions.iter().find(|(id, _)| *id == my_id) {
            None => {
                return Err(GovernanceError::MergeMissingContribution { coin_id: my_id });
            }
            Some((_, amount)) if *amount != coin.amount => {
                return Err(GovernanceError::MergeAmountMismatch {
                    coin_id: my_id,
                    manifest: *amount,
                    actual: coin.amount,
                });
            }
            Some(_) => {}
        }
        Ok(vec![
            Condition::AssertMyPuzzleHash {
                puzzle_hash: self.puzzle_hash(),
            },
            Condition::CreateCoinAnnouncement {
                message: CONTRIBUTION_MESSAGE.to_vec(),
            },
            Condition::AssertCoinAnnouncement {
                announcement: coin_announcement_id(
                    &aggregator_coin.coin_id(),
                    &merge_manifest_message(contributions),
                ),
            },
        ])
    }

    fn merge_aggregate(
        &self,
        coin: &Coin,
        contributions: &[(CoinId, Amount)],
    ) -> Result<Vec<Condition>, GovernanceError> {
        if contributions.is_empty() {
            return Err(GovernanceError::EmptyMerge);
        }
        let my_id = coin.coin_id();
        for (i, (coin_id, _)) in contributions.iter().enumerate() {
            if *coin_id == my_id || contributions[..i].iter().any(|(id, _)| id == coin_id) {
                return Err(GovernanceError::DuplicateContribution { coin_id: *coin_id });
            }
        }
        let mut contributed = Amount::ZERO;
        for (_, amount) in contributions {
            contributed = contributed
                .checked_add(*amount)
                .ok_or(GovernanceError::AmountOverflow)?;
        }
        let output = coin
            .amount
            .checked_add(contributed)
            .ok_or(GovernanceError::AmountOverflow)?;

        let mut out = Vec::with_capacity(contributions.len() + 3);
        out.push(Condition::AssertMyPuzzleHash {
            puzzle_hash: self.puzzle_hash(),
        });
        out.push(Condition::CreateCoinAnnouncement {
            message: merge_manifest_message(contributions),
        });
        for (coin_id, _) in contributions {
            out.push(Condition::AssertCoinAnnouncement {
                announcement: coin_announcement_id(coin_id, &CONTRIBUTION_MESSAGE),
            });
        }
        out.push(Condition::CreateCoin {
            puzzle_hash: self.puzzle_hash(),
            amount: output,
        });
        Ok(out)
    }
}

/// One funding-coin spend, selected by explicit discriminant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingSolution {
    /// Run a delegated puzzle the treasury announced authorization for.
    Delegated {
        treasury_inner_puzzle_hash: PuzzleHash,
        delegated_puzzle_hash: PuzzleHash,
        /// The delegated puzzle's output, passed through.
        conditions: Vec<Condition>,
    },
    /// Contribute this coin's value into a merge set.
    MergeContribute {
        /// The coin collecting the merged value.
        aggregator_coin: Coin,
        /// The full merge set, identical for every participant.
        contributions: Vec<(CoinId, Amount)>,
    },
    /// Collect a merge set into this coin's successor.
    MergeAggregate {
        contributions: Vec<(CoinId, Amount)>,
    },
}
