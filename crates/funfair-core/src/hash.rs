//! FNV-1a hashing helpers for state checksums.
//!
//! Checksums are compared across peers to detect desynchronization and
//! recorded in replay frames for divergence triage. They are fast
//! equality checks, not cryptographic digests.

/// FNV-1a offset basis for 64-bit.
pub const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
pub fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a byte slice into an FNV-1a hash state.
#[inline]
pub fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed an i32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
pub fn fnv1a_i32(hash: u64, v: i32) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
pub fn fnv1a_u32(hash: u64, v: u32) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
pub fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Feed an i64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
pub fn fnv1a_i64(hash: u64, v: i64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}
