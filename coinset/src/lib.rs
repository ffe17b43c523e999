//! The coin-set model: coins, singleton lineages, and atomic spend batches.
//!
//! Coins are immutable once created and consumed exactly once. All
//! cross-coin coordination happens through announcement commitments that the
//! batch validator checks in two passes (collect, then verify) — never
//! through shared mutable state.

pub mod batch;
pub mod coin;
pub mod error;
pub mod singleton;
pub mod spend;

pub use batch::SpendBatch;
pub use coin::Coin;
pub use error::BatchError;
pub use singleton::{singleton_puzzle_hash, singleton_spend, LineageProof, SingletonStruct};
pub use spend::CoinSpend;
