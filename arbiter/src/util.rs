use std::cmp::min;

/// Distance used for unreachable node pairs
pub const INF: u32 = u32::MAX;

/// Adds two hop distances, treating [`INF`] as absorbing.
///
/// # Examples
///
/// ```
/// use arbiter::util::{sum_inf, INF};
/// assert_eq!(sum_inf(2, 3), 5);
/// assert_eq!(sum_inf(INF, 1), INF);
/// assert_eq!(sum_inf(INF - 1, INF - 1), INF - 1);
/// ```
pub fn sum_inf(dist_a: u32, dist_b: u32) -> u32 {
    if dist_a == INF || dist_b == INF {
        INF
    } else {
        min((INF - 1) as u64, dist_a as u64 + dist_b as u64) as u32
    }
}

/// Whether `closer` is exactly one hop nearer to some destination than `farther`.
pub fn is_one_hop_closer(closer: u32, farther: u32) -> bool {
    farther != INF && farther.checked_sub(1) == Some(closer)
}

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// 32-bit MurmurHash3 (x86 variant) over `data`.
///
/// # Examples
///
/// ```
/// assert_eq!(arbiter::util::murmur3_32(b"", 0), 0);
/// assert_eq!(arbiter::util::murmur3_32(b"hello", 0), 0x248b_fa47);
/// ```
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, b) in tail.iter().enumerate() {
            k |= (*b as u32) << (8 * i);
        }
        h ^= scramble(k);
    }

    h ^= data.len() as u32;
    fmix32(h)
}

fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
