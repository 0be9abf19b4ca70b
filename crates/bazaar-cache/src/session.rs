//! Session identifiers for anonymous carts.

use serde::{Deserialize, Serialize};

use crate::CacheError;

/// Longest session id accepted from outside.
const MAX_LEN: usize = 128;

/// Identifies the browser or CLI session a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an id without checking it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an externally supplied id.
    ///
    /// Accepts 1 to 128 ASCII letters, digits, `-` and `_` after trimming.
    pub fn parse(id: &str) -> Result<Self, CacheError> {
        let id = id.trim();
        let valid = !id.is_empty()
            && id.len() <= MAX_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(CacheError::InvalidSessionId(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Generate a random id: `sess_` plus 18 random bytes in base64url.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let id = SessionId::generate();
        let s = id.as_str();

        assert!(s.starts_with("sess_"));
        // 18 bytes base64 = 24 chars, plus "sess_"
        assert_eq!(s.len(), 29);
        assert!(SessionId::parse(s).is_ok());
    }

    #[test]
    fn test_generate_uniqueness() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_parse() {
        assert_eq!(SessionId::parse(" default ").unwrap().as_str(), "default");
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("../etc").is_err());
        assert!(SessionId::parse(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = SessionId::new("sess_abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""sess_abc""#);

        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
