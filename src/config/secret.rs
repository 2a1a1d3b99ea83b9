//! Secure handling of the archive access token
//!
//! The token is held in a `secrecy::Secret`, which zeroes memory on drop and
//! redacts the value from `Debug` output. Callers must go through
//! `expose_secret()` to read it, which in practice only happens when the
//! `Authorization` header is built.
//!
//! # Example
//!
//! ```rust
//! use tripdata::config::secret_token;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_token(Some("ghp_example".to_string())).unwrap();
//! assert_eq!(token.expose_secret().as_ref(), "ghp_example");
//!
//! // Blank values count as no token at all
//! assert!(secret_token(Some("   ".to_string())).is_none());
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Secret string: zeroed on drop, redacted in Debug
pub type SecretString = Secret<SecretValue>;

/// Wrap a string in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wrap an optional token, treating blank values as absent
///
/// Surrounding whitespace is trimmed so a stray newline in a secrets file
/// does not end up inside the `Authorization` header.
pub fn secret_token(value: Option<String>) -> Option<SecretString> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("test-token".to_string());
        assert_eq!(secret.expose_secret(), "test-token");
    }

    #[test]
    fn test_secret_token_trims_and_filters() {
        assert!(secret_token(None).is_none());
        assert!(secret_token(Some(String::new())).is_none());
        assert!(secret_token(Some(" \n".to_string())).is_none());

        let token = secret_token(Some(" abc123\n".to_string())).unwrap();
        assert_eq!(token.expose_secret(), "abc123");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }
}
