use rand::Rng;

/// Default alphabet for `generate`: upper, lower, digits.
pub const ALPHANUMERIC: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Alphabet invitation codes are issued from. Upper + digits only, so the
/// canonical (uppercased) form of a code is the code itself.
pub const CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random string of `length` characters, each drawn uniformly and
/// independently from the default alphanumeric alphabet.
///
/// Zero-length requests are clamped to a single character.
pub fn generate(length: usize) -> String {
    generate_with(ALPHANUMERIC, length)
}

pub fn generate_with(alphabet: &str, length: usize) -> String {
    let symbols = alphabet.as_bytes();
    let mut rng = rand::rng();
    (0..length.max(1))
        .map(|_| symbols[rng.random_range(0..symbols.len())] as char)
        .collect()
}
