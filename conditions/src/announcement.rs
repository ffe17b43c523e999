//! Batch-scoped announcement commitments.
//!
//! An announcement is a one-time commitment: created by one spend, matched
//! byte-for-byte by an assertion from another spend in the same atomic batch,
//! and gone the moment the batch is accepted or rejected. There is no
//! persistent storage of announcements anywhere in the protocol.

use covenant_crypto::{coin_announcement_id, puzzle_announcement_id};
use covenant_types::{AnnouncementId, CoinId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Who emitted an announcement: a puzzle (keyed by its commitment, shared by
/// every coin running that puzzle) or one specific coin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emitter {
    Puzzle(PuzzleHash),
    Coin(CoinId),
}

/// An announcement: an emitter identity plus an arbitrary message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub emitter: Emitter,
    pub message: Vec<u8>,
}

impl Announcement {
    pub fn from_puzzle(puzzle_hash: PuzzleHash, message: impl Into<Vec<u8>>) -> Self {
        Self {
            emitter: Emitter::Puzzle(puzzle_hash),
            message: message.into(),
        }
    }

    pub fn from_coin(coin_id: CoinId, message: impl Into<Vec<u8>>) -> Self {
        Self {
            emitter: Emitter::Coin(coin_id),
            message: message.into(),
        }
    }

    /// The id assertions must match: `hash(emitter identity ‖ message)`.
    pub fn id(&self) -> AnnouncementId {
        match &self.emitter {
            Emitter::Puzzle(puzzle_hash) => puzzle_announcement_id(puzzle_hash, &self.message),
            Emitter::Coin(coin_id) => coin_announcement_id(coin_id, &self.message),
        }
    }
}
