//! Atomic spend-batch validation.
//!
//! The ledger's announcement discipline, made explicit: announcements exist
//! only for the duration of one batch, as an append-only multiset of
//! commitments. Validation is a two-pass collect-then-verify algorithm —
//! first gather everything the batch creates, then check every assertion
//! against the collected set. There are no callbacks and no evaluation-order
//! dependence; a batch either satisfies all its assertions or is rejected
//! whole.

use std::collections::HashSet;

use crate::error::BatchError;
use crate::spend::CoinSpend;
use covenant_conditions::{Announcement, Condition};
use covenant_types::{AnnouncementId, CoinId};
use tracing::{debug, warn};

/// An ordered collection of spends validated as one atomic unit.
#[derive(Clone, Debug, Default)]
pub struct SpendBatch {
    spends: Vec<CoinSpend>,
}

impl SpendBatch {
    pub fn new() -> Self {
        Self { spends: Vec::new() }
    }

    pub fn push(&mut self, spend: CoinSpend) {
        self.spends.push(spend);
    }

    pub fn spends(&self) -> &[CoinSpend] {
        &self.spends
    }

    pub fn is_empty(&self) -> bool {
        self.spends.is_empty()
    }

    /// Validate the batch at `peak_height`.
    ///
    /// Pass 1 collects consumed coin ids and every announcement the batch
    /// creates; pass 2 verifies assertions. Batch-external ordering is
    /// irrelevant: spends may appear in any order.
    pub fn validate(&self, peak_height: u64) -> Result<(), BatchError> {
        if self.spends.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        // Pass 1: collect.
        let mut consumed: HashSet<CoinId> = HashSet::new();
        let mut puzzle_announcements: HashSet<AnnouncementId> = HashSet::new();
        let mut coin_announcements: HashSet<AnnouncementId> = HashSet::new();

        for spend in &self.spends {
            let coin_id = spend.coin.coin_id();
            if !consumed.insert(coin_id) {
                warn!(coin = %coin_id, "batch rejected: double spend");
                return Err(BatchError::DoubleSpend(coin_id));
            }
            for condition in &spend.conditions {
                match condition {
                    Condition::CreatePuzzleAnnouncement { message } => {
                        let ann =
                            Announcement::from_puzzle(spend.coin.puzzle_hash, message.clone());
                        puzzle_announcements.insert(ann.id());
                    }
                    Condition::CreateCoinAnnouncement { message } => {
                        let ann = Announcement::from_coin(coin_id, message.clone());
                        coin_announcements.insert(ann.id());
                    }
                    _ => {}
                }
            }
        }

        // Pass 2: verify.
        for spend in &self.spends {
            let coin_id = spend.coin.coin_id();
            for condition in &spend.conditions {
                match condition {
                    Condition::AssertPuzzleAnnouncement { announcement } => {
                        if !puzzle_announcements.contains(announcement) {
                            warn!(
                                coin = %coin_id,
                                announcement = %announcement,
                                "batch rejected: unmatched puzzle announcement"
                            );
                            return Err(BatchError::UnmatchedPuzzleAnnouncement(*announcement));
                        }
                    }
                    Condition::AssertCoinAnnouncement { announcement } => {
                        if !coin_announcements.contains(announcement) {
                            warn!(
                                coin = %coin_id,
                                announcement = %announcement,
                                "batch rejected: unmatched coin announcement"
                            );
                            return Err(BatchError::UnmatchedCoinAnnouncement(*announcement));
                        }
                    }
                    Condition::AssertHeightRelative { height } => {
                        if spend.confirmed_height > peak_height {
                            return Err(BatchError::ConfirmedAfterPeak {
                                coin: coin_id,
                                confirmed_height: spend.confirmed_height,
                                peak_height,
                            });
                        }
                        let elapsed = peak_height - spend.confirmed_height;
                        if elapsed < *height {
                            return Err(BatchError::HeightNotReached {
                                required: *height,
                                elapsed,
                            });
                        }
                    }
                    Condition::AssertMyParentId { parent_id } => {
                        if spend.coin.parent_id != *parent_id {
                            return Err(BatchError::ParentMismatch {
                                coin: coin_id,
                                asserted: *parent_id,
                                actual: spend.coin.parent_id,
                            });
                        }
                    }
                    Condition::AssertMyPuzzleHash { puzzle_hash } => {
                        if spend.coin.puzzle_hash != *puzzle_hash {
                            return Err(BatchError::PuzzleHashMismatch {
                                coin: coin_id,
                                asserted: *puzzle_hash,
                                actual: spend.coin.puzzle_hash,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        debug!(spends = self.spends.len(), peak_height, "batch accepted");
        Ok(())
    }
}
