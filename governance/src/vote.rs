//! Vote records and the commitment messages derived from them.
//!
//! A vote is never stored: it exists only as a message announced by the
//! lockup coin casting it and independently recomputed and asserted by the
//! proposal accepting it. If the two computations disagree on any field the
//! announcement ids differ and the batch is rejected.

use covenant_crypto::blake2b_256_framed;
use covenant_types::{Amount, CoinId, ProposalId};
use serde::{Deserialize, Serialize};

/// Which way a vote counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDirection {
    Yes,
    No,
}

impl VoteDirection {
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 0,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// The ephemeral record of one cast vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal_id: ProposalId,
    pub coin_id: CoinId,
    pub amount: Amount,
    pub direction: VoteDirection,
}

impl VoteRecord {
    /// The announcement message committing to every field of the vote.
    pub fn message(&self) -> Vec<u8> {
        blake2b_256_framed(&[
            self.proposal_id.as_bytes(),
            &self.amount.to_be_bytes(),
            &[self.direction.as_byte()],
            self.coin_id.as_bytes(),
        ])
        .to_vec()
    }
}

/// The announcement message for an ownership transfer: a vote record with
/// every vote field zeroed, leaving only the coin identity.
pub fn ownership_message(coin_id: &CoinId) -> Vec<u8> {
    blake2b_256_framed(&[&[0], &[0], &[0], coin_id.as_bytes()]).to_vec()
}
