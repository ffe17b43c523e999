use crate::payload::PayloadKind;
use covenant_types::{Amount, CoinId, ProposalId, PuzzleHash};
use thiserror::Error;

/// Why a governance puzzle refused to evaluate.
///
/// Every variant is fatal for the spend being built and therefore for the
/// whole batch; none is retried automatically. Threshold violations are
/// non-terminal for the proposal itself — the coin stays live and a later
/// close attempt may succeed. Retracting a vote without the finished-beacon
/// proof is not represented here: the lockup emits the beacon assertion and
/// the batch validator rejects the batch when no beacon announcement exists.
#[derive(Debug, Error)]
pub enum GovernanceError {
    // Integrity violations.
    #[error("coin has already voted on proposal {proposal_id}")]
    DuplicateVote { proposal_id: ProposalId },

    #[error("no recorded vote on proposal {proposal_id} to retract")]
    VoteNotFound { proposal_id: ProposalId },

    #[error("vote coin {coin_id} appears more than once in one spend")]
    DuplicateVoteCoin { coin_id: CoinId },

    #[error("vote spend carries no votes")]
    EmptyVote,

    #[error("vote tally overflow")]
    TallyOverflow,

    #[error("vote tally underflow")]
    TallyUnderflow,

    #[error("inconsistent tally: yes {yes} exceeds total {total}")]
    InvalidTally { yes: Amount, total: Amount },

    // Threshold violations — the proposal stays open.
    #[error("attendance not met: {have} < {need}")]
    AttendanceNotMet { have: Amount, need: Amount },

    #[error("pass margin not met: {yes} yes of {total} total, need {need_bps} bps")]
    MarginNotMet {
        yes: Amount,
        total: Amount,
        need_bps: u64,
    },

    // Authorization violations.
    #[error("proposal coin too small: {amount} < minimum {minimum}")]
    ProposalBelowMinimum { amount: Amount, minimum: Amount },

    #[error("claimed proposal coin {claimed} does not match recomputed {computed}")]
    ProposalCoinMismatch { claimed: CoinId, computed: CoinId },

    #[error("revealed payload hashes to {revealed}, proposal committed to {committed}")]
    ProposedPuzzleMismatch {
        committed: PuzzleHash,
        revealed: PuzzleHash,
    },

    #[error("payload kind {revealed:?} does not match committed kind {committed:?}")]
    PayloadKindMismatch {
        committed: PayloadKind,
        revealed: PayloadKind,
    },

    // Accounting violations.
    #[error("proposed spend of {requested} exceeds locked funds {locked}")]
    TreasuryOverdraw { locked: Amount, requested: Amount },

    #[error("residual {residual} not routed to the excess puzzle hash")]
    ExcessNotRouted { residual: Amount },

    #[error("amount arithmetic overflow")]
    AmountOverflow,

    #[error("merge manifest does not include contribution from coin {coin_id}")]
    MergeMissingContribution { coin_id: CoinId },

    #[error("merge amount for coin {coin_id}: manifest says {manifest}, coin holds {actual}")]
    MergeAmountMismatch {
        coin_id: CoinId,
        manifest: Amount,
        actual: Amount,
    },

    #[error("merge aggregator puzzle {puzzle_hash} is not a treasury funding coin")]
    MergeForeignAggregator { puzzle_hash: PuzzleHash },

    #[error("contribution from coin {coin_id} listed more than once")]
    DuplicateContribution { coin_id: CoinId },

    #[error("merge set has no contributions")]
    EmptyMerge,
}
