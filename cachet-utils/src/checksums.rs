//! Luhn (mod 10) checksum.
//!
//! ```
//! use cachet_utils::luhn;
//!
//! assert!(luhn("4111111111111111"));
//! assert!(!luhn("4111111111111112"));
//! assert!(!luhn("4111-1111"));
//! ```

/// Digit sum of `2 * index`, for the doubled positions.
const DOUBLED_DIGIT_SUM: [u32; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Checks `candidate` against the Luhn algorithm.
///
/// Counting from the rightmost digit, odd positions are added as-is and even
/// positions are doubled (summing the digits of the product). The candidate
/// is valid when the total is a multiple of ten. Any character other than an
/// ASCII digit makes it invalid; an empty string sums to zero and is valid.
pub fn luhn(candidate: &str) -> bool {
    let mut total = 0u32;
    for (position, byte) in candidate.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let digit = u32::from(byte - b'0');
        total += if position % 2 == 0 {
            digit
        } else {
            DOUBLED_DIGIT_SUM[digit as usize]
        };
    }
    total % 10 == 0
}

/// [`luhn`] over the decimal representation of `candidate`.
pub fn luhn_number(candidate: u64) -> bool {
    luhn(&candidate.to_string())
}
