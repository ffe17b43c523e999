//! Singleton lineages: uniquely-identified, linearly-succeeding coins.
//!
//! A singleton is a coin lineage tied to a launcher id. The outer singleton
//! commitment wraps an inner puzzle, so every coin in the lineage shares the
//! launcher identity while the inner state evolves spend by spend. Ancestry
//! is proven with a lineage proof that recomputes the parent's coin id.

use covenant_conditions::Condition;
use covenant_crypto::{coin_id, curry_hash, module_hash};
use covenant_types::{Amount, CoinId, LauncherId, PuzzleHash};
use serde::{Deserialize, Serialize};

/// Protocol identity of the singleton outer layer.
pub fn singleton_mod_hash() -> PuzzleHash {
    module_hash("covenant/singleton/v1")
}

/// Protocol identity of the singleton launcher.
pub fn launcher_mod_hash() -> PuzzleHash {
    module_hash("covenant/singleton-launcher/v1")
}

/// The fixed identity half of a singleton: which lineage this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonStruct {
    pub launcher_id: LauncherId,
}

impl SingletonStruct {
    pub fn new(launcher_id: LauncherId) -> Self {
        Self { launcher_id }
    }

    /// Commitment to `(singleton mod, launcher id, launcher mod)` — the
    /// value every singleton-aware puzzle folds into its own commitment.
    pub fn struct_hash(&self) -> PuzzleHash {
        curry_hash(
            &singleton_mod_hash(),
            &[self.launcher_id.as_bytes(), launcher_mod_hash().as_bytes()],
        )
    }
}

/// The full (outer) puzzle commitment of a singleton coin: the singleton
/// layer wrapped around an inner puzzle.
pub fn singleton_puzzle_hash(launcher_id: LauncherId, inner_puzzle_hash: &PuzzleHash) -> PuzzleHash {
    let singleton_struct = SingletonStruct::new(launcher_id);
    curry_hash(
        &singleton_mod_hash(),
        &[
            singleton_struct.struct_hash().as_bytes(),
            inner_puzzle_hash.as_bytes(),
        ],
    )
}

/// Proof that a coin is the direct successor of a specific parent in a
/// singleton lineage: the parent's own parent, inner commitment, and amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageProof {
    pub parent_parent_id: CoinId,
    pub parent_inner_puzzle_hash: PuzzleHash,
    pub parent_amount: Amount,
}

impl LineageProof {
    /// The id of the parent coin this proof describes, within the lineage of
    /// `launcher_id`.
    pub fn parent_id(&self, launcher_id: LauncherId) -> CoinId {
        let parent_puzzle = singleton_puzzle_hash(launcher_id, &self.parent_inner_puzzle_hash);
        coin_id(&self.parent_parent_id, &parent_puzzle, self.parent_amount)
    }

    /// Verify that `claimed_parent` is the id of the parent coin this proof
    /// describes, within the lineage of `launcher_id`.
    pub fn verify(&self, launcher_id: LauncherId, claimed_parent: &CoinId) -> bool {
        self.parent_id(launcher_id) == *claimed_parent
    }
}

/// Wrap an inner spend's conditions with the singleton layer's ancestry
/// assertion: the parent recomputed from the lineage proof must be the
/// spent coin's actual parent, or the batch is rejected.
///
/// Every singleton spend supplies a lineage proof this way; the inner puzzle
/// never sees it.
pub fn singleton_spend(
    launcher_id: LauncherId,
    lineage: &LineageProof,
    mut inner_conditions: Vec<Condition>,
) -> Vec<Condition> {
    inner_conditions.push(Condition::AssertMyParentId {
        parent_id: lineage.parent_id(launcher_id),
    });
    inner_conditions
}
