//! Fixed-width 2-bit packing of UMI sequences.

/// Longest UMI representable in the packed 64-bit form.
pub const MAX_UMI_LEN: usize = 32;

/// 2-bit encoding: A=00, C=01, G=10, T=11. `None` for ambiguous bases.
#[inline]
const fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Pack a nucleotide sequence into a `u64`, two bits per base, LSB first.
///
/// Returns `None` when the sequence is longer than [`MAX_UMI_LEN`] or
/// contains a character outside the A/C/G/T alphabet. Callers decide how to
/// treat the failure; nothing panics here. No decode is provided, the packed
/// value only serves as a deduplication key.
#[inline]
pub fn encode_umi(seq: &str) -> Option<u64> {
    let bytes = seq.as_bytes();
    if bytes.len() > MAX_UMI_LEN {
        return None;
    }

    let mut packed = 0u64;
    for (i, &base) in bytes.iter().enumerate() {
        packed |= encode_base(base)? << (i * 2);
    }
    Some(packed)
}
