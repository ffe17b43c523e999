//! Blake2b hashing for coins, puzzle commitments, and announcements.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use covenant_types::{Amount, AnnouncementId, CoinId, PuzzleHash};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices with each part length-prefixed (u64 BE).
///
/// Length prefixing makes the encoding injective: no two distinct field
/// sequences hash alike, which plain concatenation cannot guarantee.
pub fn blake2b_256_framed(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive a coin's id from its three identity fields.
pub fn coin_id(parent_id: &CoinId, puzzle_hash: &PuzzleHash, amount: Amount) -> CoinId {
    CoinId::new(blake2b_256_multi(&[
        parent_id.as_bytes(),
        puzzle_hash.as_bytes(),
        &amount.to_be_bytes(),
    ]))
}

/// The id a ledger assigns to a puzzle announcement:
/// `hash(emitting puzzle commitment ‖ message)`.
pub fn puzzle_announcement_id(puzzle_hash: &PuzzleHash, message: &[u8]) -> AnnouncementId {
    AnnouncementId::new(blake2b_256_multi(&[puzzle_hash.as_bytes(), message]))
}

/// The id a ledger assigns to a coin announcement:
/// `hash(emitting coin id ‖ message)`.
pub fn coin_announcement_id(coin_id: &CoinId, message: &[u8]) -> AnnouncementId {
    AnnouncementId::new(blake2b_256_multi(&[coin_id.as_bytes(), message]))
}

/// The protocol identity of a puzzle module, derived from a versioned tag
/// such as `covenant/lockup/v1`.
///
/// These digests play the role the original system gives to compiled module
/// hashes: fixed, protocol-wide constants that commitment derivations fold in.
pub fn module_hash(tag: &str) -> PuzzleHash {
    PuzzleHash::new(blake2b_256_framed(&[b"covenant/module", tag.as_bytes()]))
}

/// The commitment of a module partially applied to a sequence of fields —
/// the canonical-serialization rendition of currying.
///
/// Fields are length-prefixed, so commitments are injective in both the
/// module identity and every field value.
pub fn curry_hash(module: &PuzzleHash, fields: &[&[u8]]) -> PuzzleHash {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(fields.len() + 2);
    parts.push(b"covenant/curry");
    parts.push(module.as_bytes());
    parts.extend_from_slice(fields);
    PuzzleHash::new(blake2b_256_framed(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"hello covenant");
        let h2 = blake2b_256(b"hello covenant");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        let h1 = blake2b_256(b"hello");
        let h2 = blake2b_256(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn coin_id_sensitive_to_every_field() {
        let parent = CoinId::new([1u8; 32]);
        let puzzle = PuzzleHash::new([2u8; 32]);
        let base = coin_id(&parent, &puzzle, Amount::new(100));
        assert_ne!(base, coin_id(&CoinId::new([3u8; 32]), &puzzle, Amount::new(100)));
        assert_ne!(base, coin_id(&parent, &PuzzleHash::new([3u8; 32]), Amount::new(100)));
        assert_ne!(base, coin_id(&parent, &puzzle, Amount::new(101)));
    }

    #[test]
    fn announcement_id_namespaces_collide_on_raw_bytes() {
        let bytes = [7u8; 32];
        let from_puzzle = puzzle_announcement_id(&PuzzleHash::new(bytes), b"msg");
        let from_coin = coin_announcement_id(&CoinId::new(bytes), b"msg");
        // Same raw bytes, same message — still the same digest shape, so the
        // two namespaces must be kept apart by the batch validator.
        assert_eq!(from_puzzle.as_bytes(), from_coin.as_bytes());
    }

    #[test]
    fn module_hashes_distinct_per_tag() {
        assert_ne!(
            module_hash("covenant/lockup/v1"),
            module_hash("covenant/proposal/v1")
        );
    }

    #[test]
    fn curry_hash_injective_in_field_boundaries() {
        let module = module_hash("covenant/test/v1");
        // "ab" + "c" must not collide with "a" + "bc".
        let h1 = curry_hash(&module, &[b"ab", b"c"]);
        let h2 = curry_hash(&module, &[b"a", b"bc"]);
        assert_ne!(h1, h2);
    }

    #[test]
    fn curry_hash_differs_from_module_hash() {
        let module = module_hash("covenant/test/v1");
        assert_ne!(curry_hash(&module, &[]), module);
    }
}
