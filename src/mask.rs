//! Character classes and subtree masks.
//!
//! Every byte maps to one of 64 slots. A node's mask has the slot bit set for
//! every byte in its own prefix and below it, so a search can skip a subtree
//! whose mask lacks a byte the query still needs.
//!
//! Slot layout:
//! - `'0'..='9'` -> 0..=9
//! - `'A'..='Z'` -> 10..=35
//! - `'a'..='z'` -> 36..=61
//! - `'.'` -> 62, `'-'` -> 63
//! - anything else -> `byte % 64`
//!
//! Bytes outside the alphabet collide with alphabet slots. A collision only
//! makes a mask test say "maybe" more often; it never causes a wrong skip.

/// Number of distinct character classes.
pub const SLOTS: usize = 64;

const SLOT_TABLE: [u8; 256] = build_slot_table();

const fn build_slot_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = match b {
            b'0'..=b'9' => b - b'0',
            b'A'..=b'Z' => b - b'A' + 10,
            b'a'..=b'z' => b - b'a' + 36,
            b'.' => 62,
            b'-' => 63,
            _ => b % SLOTS as u8,
        };
        i += 1;
    }
    table
}

/// Slot of `byte`, always in `0..64`.
#[inline]
pub fn classify(byte: u8) -> u8 {
    SLOT_TABLE[byte as usize]
}

/// Single-bit mask for `byte`.
#[inline]
pub fn byte_mask(byte: u8) -> u64 {
    1u64 << classify(byte)
}

/// Union of the slot bits of every byte in `bytes`. Empty input gives `0`.
#[inline]
pub fn mask_of(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |mask, &b| mask | byte_mask(b))
}

/// Slots a query byte may match.
///
/// With `case_insensitive` set, an ASCII letter matches both of its cases, so
/// both slots are included. A mask test against this value passes if any of
/// them is present.
#[inline]
pub fn fold_mask(byte: u8, case_insensitive: bool) -> u64 {
    if case_insensitive {
        byte_mask(byte.to_ascii_lowercase()) | byte_mask(byte.to_ascii_uppercase())
    } else {
        byte_mask(byte)
    }
}

/// Byte equality under optional ASCII case folding.
#[inline]
pub(crate) fn eq_byte(a: u8, b: u8, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

/// Child bytes to follow for a query byte: both cases of an ASCII letter when
/// folding, otherwise the byte itself.
#[inline]
pub(crate) fn case_variants(byte: u8, case_insensitive: bool) -> impl Iterator<Item = u8> {
    let (first, second) = if case_insensitive && byte.is_ascii_alphabetic() {
        (byte.to_ascii_lowercase(), Some(byte.to_ascii_uppercase()))
    } else {
        (byte, None)
    };
    std::iter::once(first).chain(second)
}

#[inline]
pub(crate) fn eq_bytes(a: &[u8], b: &[u8], case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}
