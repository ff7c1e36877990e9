//! IFSC code format
//!
//! Four bank letters, a literal `0`, then a six character branch code.

/// Uppercase the raw code; this form is both checked and stored.
pub fn normalize_ifsc(raw: &str) -> String {
    raw.to_uppercase()
}

/// Check a normalized code against `^[A-Z]{4}0[A-Z0-9]{6}$`
pub fn is_valid_ifsc(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 11 {
        return false;
    }

    bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        assert!(is_valid_ifsc("HDFC0ABC123"));
        assert!(is_valid_ifsc("SBIN0001234"));
        assert!(is_valid_ifsc(&normalize_ifsc("icic0xyz789")));
    }

    #[test]
    fn test_fifth_character_must_be_zero() {
        assert!(!is_valid_ifsc("HDFC1ABC123"));
        assert!(!is_valid_ifsc("HDFCOABC123"));
    }

    #[test]
    fn test_length_and_charset() {
        assert!(!is_valid_ifsc(""));
        assert!(!is_valid_ifsc("HDFC0ABC12"));
        assert!(!is_valid_ifsc("HDFC0ABC1234"));
        assert!(!is_valid_ifsc("HD1C0ABC123"));
        assert!(!is_valid_ifsc("HDFC0AB-123"));
        assert!(!is_valid_ifsc("hdfc0abc123"));
        assert!(!is_valid_ifsc(" HDFC0ABC12"));
    }
}
