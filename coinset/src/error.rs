use covenant_types::{AnnouncementId, CoinId, PuzzleHash};
use thiserror::Error;

/// Why an atomic batch was rejected. Rejection is total: no condition from
/// any spend in the batch takes effect.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch contains no spends")]
    EmptyBatch,

    #[error("coin {0} is consumed more than once in the batch")]
    DoubleSpend(CoinId),

    #[error("asserted puzzle announcement {0} was not created in the batch")]
    UnmatchedPuzzleAnnouncement(AnnouncementId),

    #[error("asserted coin announcement {0} was not created in the batch")]
    UnmatchedCoinAnnouncement(AnnouncementId),

    #[error("relative height not reached: need {required}, elapsed {elapsed}")]
    HeightNotReached { required: u64, elapsed: u64 },

    #[error("spend of coin {coin} asserts parent {asserted} but parent is {actual}")]
    ParentMismatch {
        coin: CoinId,
        asserted: CoinId,
        actual: CoinId,
    },

    #[error("spend of coin {coin} asserts puzzle hash {asserted} but puzzle is {actual}")]
    PuzzleHashMismatch {
        coin: CoinId,
        asserted: PuzzleHash,
        actual: PuzzleHash,
    },

    #[error("spend of coin {coin} was confirmed at {confirmed_height}, after peak {peak_height}")]
    ConfirmedAfterPeak {
        coin: CoinId,
        confirmed_height: u64,
        peak_height: u64,
    },
}
