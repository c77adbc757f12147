//! Checksum-based placeholder classifier.
//!
//! Maps image content to a face shape through a 32-bit rolling checksum.
//! The mapping carries no accuracy claim; its only contract is that the
//! same content always yields the same label on every platform.

use crate::types::FaceShape;

/// Only the first this-many code units contribute to the checksum.
const HASH_PREFIX_LEN: usize = 1000;
const HASH_MULTIPLIER: i32 = 31;

/// Rolling checksum over the first 1000 UTF-16 code units of `content`.
///
/// `hash = hash * 31 + unit`, wrapping in two's-complement i32.
pub fn checksum(content: &str) -> i32 {
    rolling_checksum(content.encode_utf16().map(u32::from))
}

/// Classify a string derived from image content (e.g. a data URL).
pub fn hash_classify(content: &str) -> FaceShape {
    shape_for_checksum(checksum(content))
}

/// Classify raw bytes, treating each byte as one code unit.
pub fn hash_classify_bytes(content: &[u8]) -> FaceShape {
    shape_for_checksum(rolling_checksum(content.iter().map(|&b| u32::from(b))))
}

fn rolling_checksum(units: impl Iterator<Item = u32>) -> i32 {
    units.take(HASH_PREFIX_LEN).fold(0i32, |hash, unit| {
        hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(unit as i32)
    })
}

/// `|hash| mod 7`, well-defined for `i32::MIN`.
fn shape_for_checksum(hash: i32) -> FaceShape {
    let index = (hash.unsigned_abs() % FaceShape::ALL.len() as u32) as usize;
    FaceShape::ALL[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_oval() {
        assert_eq!(checksum(""), 0);
        assert_eq!(hash_classify(""), FaceShape::Oval);
        assert_eq!(hash_classify_bytes(&[]), FaceShape::Oval);
    }

    #[test]
    fn test_known_checksums() {
        // 'a' = 97 → 97 % 7 = 6
        assert_eq!(checksum("a"), 97);
        assert_eq!(hash_classify("a"), FaceShape::Triangle);
        // "ab" = 97 * 31 + 98 = 3105 → 3105 % 7 = 4
        assert_eq!(checksum("ab"), 3105);
        assert_eq!(hash_classify("ab"), FaceShape::Diamond);
        // "hello" = 99162322 = 7 * 14166046
        assert_eq!(checksum("hello"), 99_162_322);
        assert_eq!(hash_classify("hello"), FaceShape::Oval);
    }

    #[test]
    fn test_overflow_wraps_like_i32() {
        // Long enough to overflow many times; compare against an i64 reference
        // reduced to i32 after every step.
        let input = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let mut reference: i64 = 0;
        for unit in input.encode_utf16() {
            reference = ((reference * 31 + unit as i64) as i32) as i64;
        }
        assert_eq!(checksum(input) as i64, reference);
    }

    #[test]
    fn test_only_prefix_counts() {
        let base = "x".repeat(HASH_PREFIX_LEN);
        let longer = format!("{base}trailing content that is ignored");
        assert_eq!(checksum(&base), checksum(&longer));
        assert_eq!(hash_classify(&base), hash_classify(&longer));
    }

    #[test]
    fn test_prefix_counts_utf16_units() {
        // U+1F600 is two UTF-16 code units, so 500 of them fill the prefix.
        let emoji = "\u{1F600}".repeat(500);
        let longer = format!("{emoji}z");
        assert_eq!(checksum(&emoji), checksum(&longer));
    }

    #[test]
    fn test_min_hash_index_in_range() {
        // |i32::MIN| = 2147483648 ≡ 2 (mod 7)
        assert_eq!(shape_for_checksum(i32::MIN), FaceShape::Square);
        assert_eq!(shape_for_checksum(-1), FaceShape::Round);
        assert_eq!(shape_for_checksum(i32::MAX), FaceShape::ALL[(i32::MAX % 7) as usize]);
    }

    #[test]
    fn test_deterministic_and_in_range() {
        let inputs = ["", "a", "portrait.jpg", "data:image/jpeg;base64,/9j/4AAQSkZJRg", "ÿØÿà"];
        for input in inputs {
            let first = hash_classify(input);
            for _ in 0..5 {
                assert_eq!(hash_classify(input), first);
            }
            assert!(FaceShape::ALL.contains(&first));
        }
    }

    #[test]
    fn test_bytes_match_latin1_string() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let latin1: String = bytes.iter().map(|&b| b as char).collect();
        assert_eq!(hash_classify_bytes(&bytes), hash_classify(&latin1));
    }
}
