//! Random material drawn from the operating system RNG.

use rand::{Rng, RngCore};

/// Characters used in human-typed codes. Omits 0/O and 1/I/L so a code
/// read off a receipt can be typed back without ambiguity.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Returns `N` random bytes.
#[must_use]
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Returns `groups` groups of `group_len` characters from
/// [`CODE_ALPHABET`], joined with `-`.
#[must_use]
pub fn random_code(groups: usize, group_len: usize) -> String {
    let mut rng = rand::rngs::OsRng;
    (0..groups)
        .map(|_| {
            (0..group_len)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Compares two byte strings in time independent of where they differ.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ::constant_time_eq::constant_time_eq(a, b)
}
