//! The coin: the unit of state in the protocol.

use covenant_crypto::coin_id;
use covenant_types::{Amount, CoinId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// A coin is `(parent_id, puzzle_hash, amount)`; its identity is the hash of
/// those three fields. Immutable once created; consumed exactly once by a
/// later spend that destroys it and creates successor coins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub parent_id: CoinId,
    pub puzzle_hash: PuzzleHash,
    pub amount: Amount,
}

impl Coin {
    pub fn new(parent_id: CoinId, puzzle_hash: PuzzleHash, amount: Amount) -> Self {
        Self {
            parent_id,
            puzzle_hash,
            amount,
        }
    }

    pub fn coin_id(&self) -> CoinId {
        coin_id(&self.parent_id, &self.puzzle_hash, self.amount)
    }
}
