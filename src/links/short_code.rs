//! Short code generation and input validation

use url::Url;

/// Length of generated short codes
pub const GENERATED_CODE_LENGTH: usize = 6;

/// URL-safe alphabet (64 symbols) used for generated codes
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Schemes that would execute or expose content instead of navigating
const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "vbscript", "file"];

/// Generate a random 6-character URL-safe code
pub fn generate_short_code() -> String {
    (0..GENERATED_CODE_LENGTH)
        .map(|_| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A custom alias must be non-empty, at most `max_length` characters and
/// drawn from the same alphabet as generated codes.
pub fn is_valid_alias(alias: &str, max_length: usize) -> bool {
    !alias.is_empty()
        && alias.len() <= max_length
        && alias.bytes().all(|b| ALPHABET.contains(&b))
}

/// Accepts well-formed absolute URLs, rejecting script-capable schemes
pub fn is_valid_target_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }

    match Url::parse(raw) {
        Ok(url) => !BLOCKED_SCHEMES.contains(&url.scheme()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_url_safe_chars() {
        for _ in 0..200 {
            let code = generate_short_code();
            assert_eq!(code.len(), GENERATED_CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
        }
    }

    #[test]
    fn generated_codes_vary() {
        let a = generate_short_code();
        let differs = (0..20).any(|_| generate_short_code() != a);
        assert!(differs);
    }

    #[test]
    fn alias_validation() {
        assert!(is_valid_alias("promo-2024_x", 64));
        assert!(!is_valid_alias("", 64));
        assert!(!is_valid_alias("has space", 64));
        assert!(!is_valid_alias("slash/inside", 64));
        assert!(!is_valid_alias("ünïcode", 64));
        assert!(!is_valid_alias("abcdef", 5));
        assert!(is_valid_alias("abcde", 5));
    }

    #[test]
    fn url_validation() {
        assert!(is_valid_target_url("https://example.com"));
        assert!(is_valid_target_url("http://localhost:8080/path?q=1#frag"));
        assert!(is_valid_target_url("ftp://files.example.com/a.txt"));
        assert!(is_valid_target_url("mailto:someone@example.com"));

        assert!(!is_valid_target_url(""));
        assert!(!is_valid_target_url("not a url"));
        assert!(!is_valid_target_url("example.com"));
        assert!(!is_valid_target_url("/relative/path"));
        assert!(!is_valid_target_url("javascript:alert(1)"));
        assert!(!is_valid_target_url("JavaScript:alert(1)"));
        assert!(!is_valid_target_url("data:text/html,<b>x</b>"));
    }
}
