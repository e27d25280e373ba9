//! MurmurHash2 implementation
//!
//! Used by the hash-mod sharding algorithm to spread shard-key values evenly
//! across shards. The hash must stay stable across releases: changing it
//! would silently move existing rows to different shards.

use crate::core::value::ShardingValue;

const M: u32 = 0x5bd1e995;
const R: u8 = 24;

/// Seed used for shard-key hashing
pub const SHARDING_SEED: u32 = 0x9747_b28c;

/// Compute MurmurHash2 for byte data with a given seed
pub fn murmurhash2(data: &[u8], seed: u32) -> u32 {
    let mut h: u32 = seed ^ (data.len() as u32);
    let mut chunks = data.chunks_exact(4);

    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h = h.wrapping_mul(M) ^ k;
    }

    let tail = chunks.remainder();
    if tail.len() >= 3 {
        h ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        h ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        h ^= tail[0] as u32;
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^ (h >> 15)
}

/// Compute MurmurHash2 for string data with a given seed
pub fn murmurhash2_str(s: &str, seed: u32) -> u32 {
    murmurhash2(s.as_bytes(), seed)
}

/// Compute MurmurHash2 for a 64-bit integer with a given seed
pub fn murmurhash2_int64(n: i64, seed: u32) -> u32 {
    murmurhash2(&n.to_le_bytes(), seed)
}

/// Hash a shard-key value with [`SHARDING_SEED`]
pub fn hash_sharding_value(value: &ShardingValue) -> u32 {
    match value {
        ShardingValue::Int(n) => murmurhash2_int64(*n, SHARDING_SEED),
        ShardingValue::Str(s) => murmurhash2_str(s, SHARDING_SEED),
    }
}
