//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Longest username accepted, in characters.
pub(crate) const MAX_USERNAME_LEN: usize = 80;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Trim and NFC-normalize a username so visually identical names collide.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    if normalized.chars().count() > MAX_USERNAME_LEN {
        return Err(EngineError::InvalidInput(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_composed() {
        assert_eq!(normalize_username("  alice ").unwrap(), "alice");
        // "e" + combining acute accent composes to a single "é".
        assert_eq!(normalize_username("jose\u{0301}").unwrap(), "jos\u{e9}");
    }

    #[test]
    fn username_rejects_empty_and_long() {
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username(&"x".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }
}
