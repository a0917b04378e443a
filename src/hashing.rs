//! Deterministic feature hashing.
//!
//! Maps (namespace, feature token) pairs to indices in weight-table address
//! space. The namespace name is hashed first and that value seeds the token
//! hash, so the same token in different namespaces lands on different
//! indices. Interaction terms combine two (or three) feature hashes with a
//! fixed commutative combinator.
//!
//! Hashing is a pure function: the same input always yields the same index
//! for the lifetime of the run, and collisions between distinct tokens are
//! an accepted approximation, never an error.
//!
//! # Sub-model addressing
//!
//! When a model trains two sub-models in one interleaved weight table
//! (see [`crate::igl`]), the hasher reserves the lowest bit of every
//! produced index for sub-model selection. [`WeightKey`] is the typed
//! encode/decode for that scheme: policy indices are even, decoder indices
//! are odd, fixed for the run.

/// 32-bit FNV prime, also the multiplier of the interaction combinator.
pub const FNV_PRIME: u32 = 16777619;

const FNV_OFFSET_BASIS: u32 = 2166136261;

/// Seeded FNV-1a over a byte string.
#[inline]
fn fnv1a(bytes: &[u8], seed: u32) -> u32 {
    let mut hash = seed;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The two sub-models of an interleaved weight table.
///
/// The discriminant is the sub-model bit: policy features occupy even
/// indices, decoder features odd indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubModel {
    /// Context + action features; maps context to action scores.
    Policy = 0,
    /// Context + action + feedback features; maps feedback to a latent
    /// reward signal.
    Decoder = 1,
}

/// Typed address of one weight block in interleaved (sub-model) space.
///
/// `encode`/`decode` are the only place the bit layout lives; raw indices
/// are never aliased across sub-models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightKey {
    /// Index within the sub-model's own address space.
    pub base: u32,
    /// Which sub-model the block belongs to.
    pub sub_model: SubModel,
}

impl WeightKey {
    /// Interleaved table index: the sub-model bit occupies the lowest bit.
    #[inline]
    pub fn encode(self) -> u32 {
        (self.base << 1) | self.sub_model as u32
    }

    /// Inverse of [`encode`](Self::encode).
    #[inline]
    pub fn decode(raw: u32) -> Self {
        let sub_model = if raw & 1 == 0 {
            SubModel::Policy
        } else {
            SubModel::Decoder
        };
        WeightKey {
            base: raw >> 1,
            sub_model,
        }
    }
}

/// Seeded, order-stable feature hasher.
///
/// Raw hashes are full 32-bit values; [`index`](Self::index) masks them
/// into the `num_bits`-wide table address space. In sub-model mode the
/// masked base index is then shifted left by one and tagged with the
/// sub-model bit, so the interleaved table spans `num_bits + 1` bits.
#[derive(Debug, Clone)]
pub struct FeatureHasher {
    num_bits: u32,
    mask: u32,
}

impl FeatureHasher {
    /// Create a hasher producing indices in `[0, 2^num_bits)`.
    pub fn new(num_bits: u32) -> Self {
        debug_assert!((1..=30).contains(&num_bits));
        FeatureHasher {
            num_bits,
            mask: (1u32 << num_bits) - 1,
        }
    }

    /// Table width in bits.
    #[inline]
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Hash a namespace name into the seed for its tokens.
    #[inline]
    pub fn namespace_seed(&self, namespace: &str) -> u32 {
        fnv1a(namespace.as_bytes(), FNV_OFFSET_BASIS)
    }

    /// Hash a feature token under a namespace seed. Returns the raw
    /// (unmasked) hash so interaction terms keep full entropy.
    #[inline]
    pub fn token(&self, namespace_seed: u32, token: &str) -> u32 {
        fnv1a(token.as_bytes(), namespace_seed)
    }

    /// Combine two feature hashes into an interaction-term hash.
    ///
    /// Commutative: `combine(a, b) == combine(b, a)`. Chained pairwise for
    /// cubic terms.
    #[inline]
    pub fn combine(a: u32, b: u32) -> u32 {
        a.wrapping_add(b).wrapping_mul(FNV_PRIME)
    }

    /// Mask a raw hash into single-model table address space.
    #[inline]
    pub fn index(&self, raw: u32) -> u32 {
        raw & self.mask
    }

    /// Address a raw hash, optionally into interleaved sub-model space.
    ///
    /// With `sub_model == None` this is [`index`](Self::index); otherwise
    /// the masked base index is encoded through [`WeightKey`].
    #[inline]
    pub fn address(&self, raw: u32, sub_model: Option<SubModel>) -> u32 {
        let base = raw & self.mask;
        match sub_model {
            None => base,
            Some(sub_model) => WeightKey { base, sub_model }.encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_index() {
        let hasher = FeatureHasher::new(18);
        let seed = hasher.namespace_seed("User");
        assert_eq!(hasher.token(seed, "user=Tom"), hasher.token(seed, "user=Tom"));
    }

    #[test]
    fn namespace_seeds_token_hash() {
        let hasher = FeatureHasher::new(18);
        let user = hasher.namespace_seed("User");
        let action = hasher.namespace_seed("Action");
        assert_ne!(user, action);
        assert_ne!(hasher.token(user, "id=0"), hasher.token(action, "id=0"));
    }

    #[test]
    fn combine_is_commutative() {
        let a = 0xdead_beef;
        let b = 0x1234_5678;
        assert_eq!(FeatureHasher::combine(a, b), FeatureHasher::combine(b, a));
    }

    #[test]
    fn index_respects_mask() {
        let hasher = FeatureHasher::new(10);
        let seed = hasher.namespace_seed("User");
        for token in ["a", "b", "article=music", "time_of_day=morning"] {
            assert!(hasher.index(hasher.token(seed, token)) < 1 << 10);
        }
    }

    #[test]
    fn weight_key_round_trip() {
        for base in [0u32, 1, 7, 1 << 17] {
            for sub_model in [SubModel::Policy, SubModel::Decoder] {
                let key = WeightKey { base, sub_model };
                assert_eq!(WeightKey::decode(key.encode()), key);
            }
        }
    }

    #[test]
    fn policy_even_decoder_odd() {
        let key = |sub_model| WeightKey { base: 21, sub_model };
        assert_eq!(key(SubModel::Policy).encode() & 1, 0);
        assert_eq!(key(SubModel::Decoder).encode() & 1, 1);
        assert_eq!(key(SubModel::Policy).encode() >> 1, 21);
    }
}
