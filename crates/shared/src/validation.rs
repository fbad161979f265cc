//! Common input normalization and validation utilities.

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Normalizes an email address for storage and lookup: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims a required text field, returning `None` when nothing is left.
pub fn trimmed_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims an optional text field; blank input collapses to `None`.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value.and_then(trimmed_non_empty)
}

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Deserializes a string field, treating JSON `null` like a missing value.
///
/// Pair with `#[serde(default)]` so both cases reach validation as `""`.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Member@Example.COM "), "member@example.com");
    }

    #[test]
    fn test_normalize_email_is_idempotent() {
        for _ in 0..10 {
            let email: String = SafeEmail().fake();
            let once = normalize_email(&email);
            assert_eq!(normalize_email(&once), once);
        }
    }

    #[test]
    fn test_trimmed_non_empty() {
        assert_eq!(trimmed_non_empty("  Oldboy "), Some("Oldboy".to_string()));
        assert_eq!(trimmed_non_empty("   "), None);
        assert_eq!(trimmed_non_empty(""), None);
    }

    #[test]
    fn test_trim_optional() {
        assert_eq!(trim_optional(None), None);
        assert_eq!(trim_optional(Some(" \t")), None);
        assert_eq!(
            trim_optional(Some(" 4K please ")),
            Some("4K please".to_string())
        );
    }

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "null_as_empty")]
        genre: String,
    }

    #[test]
    fn test_null_as_empty() {
        let null: Body = serde_json::from_str(r#"{"genre":null}"#).unwrap();
        assert_eq!(null.genre, "");
        let missing: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.genre, "");
        let set: Body = serde_json::from_str(r#"{"genre":"Noir"}"#).unwrap();
        assert_eq!(set.genre, "Noir");
        assert!(serde_json::from_str::<Body>(r#"{"genre":7}"#).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Tenet").is_ok());
        let err = validate_not_blank("  ").unwrap_err();
        assert_eq!(err.code, "blank");
    }
}
