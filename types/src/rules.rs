//! Governance rules held by the treasury.
//!
//! Every rule is mutated only through an accepted update proposal; between
//! updates the set is immutable and committed into the treasury's puzzle
//! hash, so any coin that knows the treasury's commitment knows its rules.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// Basis-point denominator: thresholds are expressed out of 10,000.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// The governance parameter set committed into the treasury.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoRules {
    /// Minimum relative height between a proposal's first vote and its close.
    pub proposal_timelock: u64,

    /// Relative height a proposal must have been left unspent before it may
    /// close — guarantees a quiet window with no last-moment votes.
    pub soft_close_length: u64,

    /// Minimum total vote weight required before a proposal may close.
    pub attendance_required: Amount,

    /// Minimum yes-vote proportion in basis points (5100 = 51%).
    pub pass_margin_bps: u64,

    /// Relative height after which a broken proposal may self-destruct,
    /// bypassing the margin checks.
    pub self_destruct_time: u64,

    /// Relative height between consecutive oracle spends of the treasury.
    pub oracle_spend_delay: u64,
}

impl DaoRules {
    /// Whether `total_votes` meets the attendance (quorum) requirement.
    pub fn meets_attendance(&self, total_votes: Amount) -> bool {
        total_votes >= self.attendance_required
    }

    /// Whether `yes_votes` out of `total_votes` meets the pass margin.
    ///
    /// Integer arithmetic with no rounding leniency:
    /// `yes * 10000 >= total * pass_margin_bps`, widened to u128.
    pub fn meets_pass_margin(&self, yes_votes: Amount, total_votes: Amount) -> bool {
        yes_votes.as_u128() * u128::from(BPS_DENOMINATOR)
            >= total_votes.as_u128() * u128::from(self.pass_margin_bps)
    }

    /// Conservative defaults for a small DAO: 51% margin, quorum of 1000
    /// weight, week-scale timelocks (in blocks).
    pub fn covenant_defaults() -> Self {
        Self {
            proposal_timelock: 40,
            soft_close_length: 5,
            attendance_required: Amount::new(1000),
            pass_margin_bps: 5100,
            self_destruct_time: 1000,
            oracle_spend_delay: 10,
        }
    }
}

impl Default for DaoRules {
    fn default() -> Self {
        Self::covenant_defaults()
    }
}
