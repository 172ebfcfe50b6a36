//! Allocation-light parsing helpers for evidence text lines.

use memchr::memchr_iter;

/// Fast u64 parsing - no allocation, no error formatting.
///
/// Returns None if the input is empty or contains non-digit characters.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// Split a line on tabs using memchr.
#[inline]
pub fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(8);
    let mut begin = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[begin..tab]);
        begin = tab + 1;
    }
    fields.push(&line[begin..]);
    fields
}

/// Check if a line should be skipped (empty or comment).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    line.is_empty() || line[0] == b'#'
}

/// Check if a line belongs to the `@` header block.
#[inline(always)]
pub fn is_header_line(line: &[u8]) -> bool {
    line.first() == Some(&b'@')
}

/// Parse a 1-based position field.
#[inline]
pub fn parse_position(field: &str, name: &str) -> Result<u64, String> {
    parse_u64_fast(field.as_bytes())
        .ok_or_else(|| format!("Invalid {} position: '{}'", name, field))
}

/// Parse a non-negative count field.
#[inline]
pub fn parse_count(field: &str, name: &str) -> Result<u32, String> {
    parse_u64_fast(field.as_bytes())
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("Invalid {}: '{}'", name, field))
}

/// Parse a count that may be missing (`.` or a negative value such as `-1`).
#[inline]
pub fn parse_optional_count(field: &str) -> Result<Option<u32>, String> {
    if field == "." {
        return Ok(None);
    }
    if let Some(digits) = field.strip_prefix('-') {
        return match parse_u64_fast(digits.as_bytes()) {
            Some(_) => Ok(None),
            None => Err(format!("Invalid count: '{}'", field)),
        };
    }
    parse_count(field, "count").map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_fast() {
        assert_eq!(parse_u64_fast(b"12345"), Some(12345));
        assert_eq!(parse_u64_fast(b"0"), Some(0));
        assert_eq!(parse_u64_fast(b""), None);
        assert_eq!(parse_u64_fast(b"abc"), None);
        assert_eq!(parse_u64_fast(b"123abc"), None);
        assert_eq!(parse_u64_fast(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_u64_fast(b"18446744073709551616"), None);
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("chr1\t100\t0.5\tS1"), vec!["chr1", "100", "0.5", "S1"]);
        assert_eq!(split_fields("chr1"), vec!["chr1"]);
        assert_eq!(split_fields("a\t\tb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_line_classes() {
        assert!(should_skip_line(b""));
        assert!(should_skip_line(b"#Chr\tStart\tEnd"));
        assert!(!should_skip_line(b"chr1\t100\t200"));
        assert!(is_header_line(b"@SQ\tSN:chr1\tLN:100"));
        assert!(!is_header_line(b"chr1\t100"));
    }

    #[test]
    fn test_parse_optional_count() {
        assert_eq!(parse_optional_count("7"), Ok(Some(7)));
        assert_eq!(parse_optional_count("."), Ok(None));
        assert_eq!(parse_optional_count("-1"), Ok(None));
        assert!(parse_optional_count("-x").is_err());
        assert!(parse_optional_count("-").is_err());
        assert!(parse_optional_count("--1").is_err());
        assert!(parse_optional_count("seven").is_err());
    }
}
