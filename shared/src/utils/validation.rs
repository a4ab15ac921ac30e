//! Identity (email) validation and masking utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic address check: one '@', no whitespace, dotted domain
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Maximum length of an address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Normalize an email address for use as a lookup key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is acceptable as an identity
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Mask an email address for logs (e.g., a***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));

        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("space @x.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("@example.com"), "***@example.com");
        assert_eq!(mask_email("garbage"), "***");
    }
}
