//! The eight spend conditions the ledger understands.

use covenant_types::{Amount, AnnouncementId, CoinId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// A single condition emitted by evaluating a puzzle against a solution.
///
/// Creation conditions take effect when the batch is accepted; assertion
/// conditions must be satisfied within the same batch or the whole batch is
/// rejected with no partial state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Create a successor coin with the given puzzle commitment and amount.
    CreateCoin {
        puzzle_hash: PuzzleHash,
        amount: Amount,
    },

    /// Announce `message` from this spend's coin id.
    CreateCoinAnnouncement { message: Vec<u8> },

    /// Require that `hash(coin_id ‖ message)` was announced by some coin
    /// spend in this batch.
    AssertCoinAnnouncement { announcement: AnnouncementId },

    /// Announce `message` from this spend's puzzle commitment.
    CreatePuzzleAnnouncement { message: Vec<u8> },

    /// Require that `hash(puzzle_hash ‖ message)` was announced by some
    /// puzzle spend in this batch.
    AssertPuzzleAnnouncement { announcement: AnnouncementId },

    /// Require at least `height` blocks between this coin's confirmation and
    /// the batch's peak.
    AssertHeightRelative { height: u64 },

    /// Require this coin's parent id to equal `parent_id`.
    AssertMyParentId { parent_id: CoinId },

    /// Require this coin's puzzle commitment to equal `puzzle_hash`.
    AssertMyPuzzleHash { puzzle_hash: PuzzleHash },
}

impl Condition {
    /// Opcode-style name, for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateCoin { .. } => "CREATE_COIN",
            Self::CreateCoinAnnouncement { .. } => "CREATE_COIN_ANNOUNCEMENT",
            Self::AssertCoinAnnouncement { .. } => "ASSERT_COIN_ANNOUNCEMENT",
            Self::CreatePuzzleAnnouncement { .. } => "CREATE_PUZZLE_ANNOUNCEMENT",
            Self::AssertPuzzleAnnouncement { .. } => "ASSERT_PUZZLE_ANNOUNCEMENT",
            Self::AssertHeightRelative { .. } => "ASSERT_HEIGHT_RELATIVE",
            Self::AssertMyParentId { .. } => "ASSERT_MY_PARENT_ID",
            Self::AssertMyPuzzleHash { .. } => "ASSERT_MY_PUZZLEHASH",
        }
    }

    /// Whether this condition asserts a fact rather than creating something.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::AssertCoinAnnouncement { .. }
                | Self::AssertPuzzleAnnouncement { .. }
                | Self::AssertHeightRelative { .. }
                | Self::AssertMyParentId { .. }
                | Self::AssertMyPuzzleHash { .. }
        )
    }

    /// The created coin, if this is a `CreateCoin`.
    pub fn as_created_coin(&self) -> Option<(PuzzleHash, Amount)> {
        match self {
            Self::CreateCoin {
                puzzle_hash,
                amount,
            } => Some((*puzzle_hash, *amount)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertions_classified_correctly() {
        let create = Condition::CreateCoin {
            puzzle_hash: PuzzleHash::ZERO,
            amount: Amount::new(1),
        };
        let assert = Condition::AssertHeightRelative { height: 10 };
        assert!(!create.is_assertion());
        assert!(assert.is_assertion());
    }

    #[test]
    fn created_coin_accessor() {
        let cond = Condition::CreateCoin {
            puzzle_hash: PuzzleHash::new([9u8; 32]),
            amount: Amount::new(300),
        };
        assert_eq!(
            cond.as_created_coin(),
            Some((PuzzleHash::new([9u8; 32]), Amount::new(300)))
        );
        assert_eq!(
            Condition::CreateCoinAnnouncement { message: vec![0] }.as_created_coin(),
            None
        );
    }
}
