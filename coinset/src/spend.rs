//! A single coin spend: a coin plus the conditions its puzzle emitted.

use crate::coin::Coin;
use covenant_conditions::Condition;
use serde::{Deserialize, Serialize};

/// One spend inside an atomic batch.
///
/// The puzzle itself is evaluated before the batch is assembled; what the
/// batch validator sees is the coin being consumed, the height at which it
/// was confirmed (for relative-height assertions), and the emitted
/// conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSpend {
    pub coin: Coin,
    /// Block height at which `coin` was confirmed on the ledger.
    pub confirmed_height: u64,
    pub conditions: Vec<Condition>,
}

impl CoinSpend {
    pub fn new(coin: Coin, confirmed_height: u64, conditions: Vec<Condition>) -> Self {
        Self {
            coin,
            confirmed_height,
            conditions,
        }
    }
}
