//! Secret handling for credentials.
//!
//! The QuickVerse API key must never show up in logs, panic messages or
//! serialized configuration dumps. [`Secret`] keeps it out of all three and
//! wipes the backing memory when dropped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret value that is redacted in logs and debug output.
///
/// # Example
///
/// ```rust
/// use quickverse_common_secret::SecretString;
///
/// let api_key = SecretString::new("qv-abc123".to_string());
/// assert_eq!(api_key.to_string(), "[REDACTED]");
/// assert_eq!(format!("{api_key:?}"), "Secret([REDACTED])");
///
/// // Explicit access required
/// assert_eq!(api_key.expose(), "qv-abc123");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    /// Create a new secret.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the secret value.
    ///
    /// Use this method sparingly and only when necessary.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// True when the secret is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// A short, non-reversible hint for diagnostics: the last four characters
    /// behind a fixed mask, or just the mask for short values.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl<T: Zeroize + Default> Default for Secret<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Zeroize + PartialEq> PartialEq for Secret<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

// Deserialize normally, serialize as redacted
impl<'de, T: Zeroize + Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Secret::new)
    }
}

impl<T: Zeroize + Serialize> Serialize for Secret<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        "[REDACTED]".serialize(serializer)
    }
}

/// Type alias for a secret string.
pub type SecretString = Secret<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_display_and_debug_are_redacted() {
        let secret = SecretString::new("my-api-key".to_string());
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(format!("{:?}", secret), "Secret([REDACTED])");
    }

    #[test]
    fn test_secret_expose() {
        let secret = SecretString::from("my-api-key");
        assert_eq!(secret.expose(), "my-api-key");
    }

    #[test]
    fn test_secret_serialization_is_redacted() {
        let secret = SecretString::from("my-api-key");
        let serialized = serde_json::to_string(&secret).unwrap();
        assert_eq!(serialized, "\"[REDACTED]\"");
    }

    #[test]
    fn test_secret_deserialization() {
        let secret: SecretString = serde_json::from_str("\"my-api-key\"").unwrap();
        assert_eq!(secret.expose(), "my-api-key");
    }

    #[test]
    fn test_blank() {
        assert!(SecretString::default().is_blank());
        assert!(SecretString::from("   ").is_blank());
        assert!(!SecretString::from("k").is_blank());
    }

    #[test]
    fn test_hint() {
        assert_eq!(SecretString::from("short").hint(), "****");
        assert_eq!(SecretString::from("0123456789abcdef").hint(), "****cdef");
    }

    #[test]
    fn test_secret_equality() {
        assert_eq!(SecretString::from("a"), SecretString::from("a"));
        assert_ne!(SecretString::from("a"), SecretString::from("b"));
    }
}
