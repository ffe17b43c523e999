//! Hashing primitives for the Covenant protocol.
//!
//! Everything in the protocol is named by a Blake2b-256 digest: coins,
//! puzzle commitments, announcements, and module identities. This crate
//! holds the one canonical way each of those digests is computed.

pub mod hash;

pub use hash::{
    blake2b_256, blake2b_256_framed, blake2b_256_multi, coin_announcement_id, coin_id, curry_hash,
    module_hash, puzzle_announcement_id,
};
