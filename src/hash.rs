// Checksums and fingerprint mixing.
//
// - CRC32 (IEEE, via crc32fast) for header digests and chunk payloads
// - A 32-bit boost-style mixer for order-independent set fingerprints

use crate::format::{DIGEST_LEN, DigestAlgo};

/// Sentinel placed between the input and output groups of an I/O signature.
pub const IO_GROUP_SENTINEL: u32 = 0xDEAD_BEEF;

const GOLDEN_RATIO_32: u32 = 0x9E37_79B9;

/// CRC32 of `data`.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Header digest field for `data` under `algo`.
///
/// CRC32 is stored little-endian in the first four bytes; the rest is zero.
pub fn digest(algo: DigestAlgo, data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    match algo {
        DigestAlgo::None => {}
        DigestAlgo::Crc32 => out[..4].copy_from_slice(&crc32(data).to_le_bytes()),
    }
    out
}

/// Fold `value` into the running hash `h`.
#[inline]
pub fn mix32(h: u32, value: u32) -> u32 {
    h ^ value
        .wrapping_add(GOLDEN_RATIO_32)
        .wrapping_add(h << 6)
        .wrapping_add(h >> 2)
}

/// Order-independent hash of a multiset of u32 values.
///
/// Values are sorted before mixing. An empty list hashes to 0.
pub fn hash_list_u32(values: &[u32]) -> u32 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.into_iter().fold(0, mix32)
}
