//! Content hashing used by the atom table, object key slots, and the
//! structural interning indices.
//!
//! Prefers hardware CRC32C (SSE4.2 on x86-64, the CRC32 extension on
//! aarch64) and falls back to a 32-bit MurmurHash3 variant everywhere
//! else. `fast_reduce32` is Lemire's multiply-shift trick for mapping a
//! hash into `[0, n)` without a division.

/// Maps `x` into the range `[0, n)` without a modulo.
///
/// Equivalent to `((x as u64 * n as u64) >> 32) as u32`, which is uniform
/// enough for hash-table bucket selection and much cheaper than `x % n`.
#[inline]
#[must_use]
pub fn fast_reduce32(x: u32, n: u32) -> u32 {
    (((x as u64) * (n as u64)) >> 32) as u32
}

/// Hashes `bytes`. Never returns any particular reserved value on its own;
/// callers that need a nonzero sentinel (the atom table does) must remap
/// zero themselves.
#[inline]
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    #[cfg(all(target_arch = "x86_64", target_feature = "sse4.2"))]
    {
        crc32c::hash(bytes)
    }
    #[cfg(all(target_arch = "aarch64", target_feature = "crc"))]
    {
        crc32c::hash(bytes)
    }
    #[cfg(not(any(
        all(target_arch = "x86_64", target_feature = "sse4.2"),
        all(target_arch = "aarch64", target_feature = "crc")
    )))]
    {
        murmur::hash(bytes)
    }
}

/// The sentinel empty-string hash falls through to: a genuine hash of zero
/// would collide with the table's "unused slot" convention in spirit, so
/// the original implementation remaps it to this fixed nonzero value.
pub const EMPTY_STRING_HASH: u32 = 1024;

/// Hashes a string for atom interning, remapping a zero hash to
/// [`EMPTY_STRING_HASH`] (only ever observed for the empty string in
/// practice, but the remap is unconditional to match the reference
/// behavior exactly).
#[inline]
#[must_use]
pub fn hash_str(bytes: &[u8]) -> u32 {
    let h = hash_bytes(bytes);
    if h == 0 {
        EMPTY_STRING_HASH
    } else {
        h
    }
}

#[cfg(any(
    all(target_arch = "x86_64", target_feature = "sse4.2"),
    all(target_arch = "aarch64", target_feature = "crc")
))]
mod crc32c {
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::{_mm_crc32_u32, _mm_crc32_u64, _mm_crc32_u8};

    #[cfg(target_arch = "aarch64")]
    use core::arch::aarch64::{__crc32cb, __crc32cd, __crc32cw};

    pub fn hash(bytes: &[u8]) -> u32 {
        let mut h: u32 = 0;
        let mut chunks = bytes.chunks_exact(8);
        for chunk in &mut chunks {
            let v = u64::from_ne_bytes(chunk.try_into().unwrap());
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `sse4.2` target feature is enabled on this path.
            {
                h = unsafe { _mm_crc32_u64(h as u64, v) as u32 };
            }
            #[cfg(target_arch = "aarch64")]
            // SAFETY: `crc` target feature is enabled on this path.
            {
                h = unsafe { __crc32cd(h, v) };
            }
        }
        let mut rest = chunks.remainder();
        while rest.len() >= 4 {
            let v = u32::from_ne_bytes(rest[..4].try_into().unwrap());
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `sse4.2` target feature is enabled on this path.
            {
                h = unsafe { _mm_crc32_u32(h, v) };
            }
            #[cfg(target_arch = "aarch64")]
            // SAFETY: `crc` target feature is enabled on this path.
            {
                h = unsafe { __crc32cw(h, v) };
            }
            rest = &rest[4..];
        }
        for &b in rest {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `sse4.2` target feature is enabled on this path.
            {
                h = unsafe { _mm_crc32_u8(h, b) };
            }
            #[cfg(target_arch = "aarch64")]
            // SAFETY: `crc` target feature is enabled on this path.
            {
                h = unsafe { __crc32cb(h, b) };
            }
        }
        h
    }
}

mod murmur {
    #[inline]
    fn scramble(mut k: u32) -> u32 {
        k = k.wrapping_mul(0xcc9e_2d51);
        k = k.rotate_left(15);
        k = k.wrapping_mul(0x1b87_3593);
        k
    }

    pub fn hash(bytes: &[u8]) -> u32 {
        let seed: u32 = 4_253_307_714;
        let mut h = seed;
        let mut chunks = bytes.chunks_exact(4);
        for chunk in &mut chunks {
            let k = u32::from_ne_bytes(chunk.try_into().unwrap());
            h ^= scramble(k);
            h = h.rotate_left(13);
            h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
        }
        let rest = chunks.remainder();
        let mut k: u32 = 0;
        for (i, &b) in rest.iter().enumerate().rev() {
            k <<= 8;
            k |= u32::from(b);
            let _ = i;
        }
        h ^= scramble(k);
        h ^= bytes.len() as u32;
        h ^= h >> 16;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2_ae35);
        h ^= h >> 16;
        h
    }
}
