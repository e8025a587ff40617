//! One-way hashing of personal identifiers before they leave the service.
//!
//! Advertising platforms match users on SHA-256 digests of normalized values:
//!
//! - Emails are trimmed and lowercased.
//! - Phones are parsed to E.164 and reduced to digits (country code included).
//! - Digests are lowercase hex.
//!
//! Raw values never appear in outbound payloads.
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of a value.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalizes an email for hashing. Returns `None` for blank or malformed input.
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || !domain.contains('.') || normalized.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Normalizes a phone to digits with country code, e.g. `15551234567`.
///
/// Numbers with a leading `+` carry their own country code; only national
/// numbers are parsed in `default_region` (ISO 3166 code).
pub fn normalize_phone(phone: &str, default_region: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return None;
    }

    let region = if trimmed.starts_with('+') {
        None
    } else {
        default_region.parse::<CountryId>().ok()
    };
    let parsed = phonenumber::parse(region, trimmed).ok()?;
    if !phonenumber::is_valid(&parsed) {
        tracing::debug!("Phone number rejected during normalization");
        return None;
    }

    let e164 = parsed.format().mode(Mode::E164).to_string();
    Some(e164.trim_start_matches('+').to_string())
}

/// Normalized and hashed email, if the input is usable.
pub fn hash_email(email: &str) -> Option<String> {
    normalize_email(email).map(|e| sha256_hex(&e))
}

/// Normalized and hashed phone, if the input is usable.
pub fn hash_phone(phone: &str, default_region: &str) -> Option<String> {
    normalize_phone(phone, default_region).map(|p| sha256_hex(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_email_normalized_before_hashing() {
        assert_eq!(
            hash_email("  John.Doe@Example.COM "),
            Some(sha256_hex("john.doe@example.com"))
        );
    }

    #[test]
    fn test_malformed_email_not_hashed() {
        assert_eq!(hash_email(""), None);
        assert_eq!(hash_email("not-an-email"), None);
        assert_eq!(hash_email("user@localhost"), None);
    }

    #[test]
    fn test_phone_normalized_to_e164_digits() {
        assert_eq!(
            normalize_phone("(650) 253-0000", "US"),
            Some("16502530000".to_string())
        );
        assert_eq!(
            normalize_phone("+55 11 98765-4321", "US"),
            Some("5511987654321".to_string())
        );
    }

    #[test]
    fn test_international_phone_ignores_default_region() {
        assert_eq!(
            normalize_phone(" +44 20 7031 3000", "US"),
            Some("442070313000".to_string())
        );
        assert_eq!(
            hash_phone("+55 11 98765-4321", "US"),
            Some(sha256_hex("5511987654321"))
        );
        // National format still uses the default region
        assert_eq!(
            normalize_phone("11 98765-4321", "BR"),
            Some("5511987654321".to_string())
        );
    }

    #[test]
    fn test_invalid_phone_not_hashed() {
        assert_eq!(hash_phone("123", "US"), None);
        assert_eq!(hash_phone("   ", "US"), None);
    }

    #[test]
    fn test_digest_never_contains_raw_value() {
        let digest = hash_email("jane@example.com").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(!digest.contains("jane"));
    }
}
