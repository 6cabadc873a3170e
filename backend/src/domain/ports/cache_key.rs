//! Response cache keys.
//!
//! A key fingerprints everything that determines a data endpoint's response:
//! the method, the path, the query string with its pairs sorted, and the
//! request body. Identical requests hash to the same key regardless of
//! query parameter order.

use sha2::{Digest, Sha256};
use thiserror::Error;

const KEY_PREFIX: &str = "response:v1:";

/// Cache key used to store and retrieve serialised responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseCacheKey(String);

impl ResponseCacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    ///
    /// # Errors
    ///
    /// Rejects blank keys and keys with surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ResponseCacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ResponseCacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(ResponseCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Fingerprint a request.
    ///
    /// # Examples
    /// ```
    /// use spending_api::domain::ports::ResponseCacheKey;
    ///
    /// let a = ResponseCacheKey::for_request("GET", "/api/v2/x/", "b=2&a=1", b"");
    /// let b = ResponseCacheKey::for_request("GET", "/api/v2/x/", "a=1&b=2", b"");
    /// assert_eq!(a, b);
    /// assert!(a.as_str().starts_with("response:v1:"));
    /// ```
    #[must_use]
    pub fn for_request(method: &str, path: &str, query: &str, body: &[u8]) -> Self {
        let mut pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
        pairs.sort_unstable();
        let query = pairs.join("&");

        let mut hasher = Sha256::new();
        for part in [method.as_bytes(), path.as_bytes(), query.as_bytes()] {
            hasher.update(part);
            hasher.update([0]);
        }
        hasher.update(body);
        Self(format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize())))
    }

    /// Borrow the underlying key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ResponseCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ResponseCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`ResponseCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseCacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("response cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("response cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

#[cfg(test)]
mod tests {
    //! Validates cache key parsing and request fingerprints.
    use super::{ResponseCacheKey, ResponseCacheKeyValidationError};
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn cache_key_rejects_blank(#[case] value: &str) {
        let err = ResponseCacheKey::new(value).expect_err("blank keys rejected");
        assert_eq!(err, ResponseCacheKeyValidationError::Empty);
    }

    #[rstest]
    #[case(" leading")]
    #[case("trailing ")]
    fn cache_key_rejects_whitespace_padding(#[case] value: &str) {
        let err = ResponseCacheKey::new(value).expect_err("padded key rejected");
        assert_eq!(err, ResponseCacheKeyValidationError::ContainsWhitespace);
    }

    #[rstest]
    #[case("POST", "/api/v2/download/count/", "", b"{}".as_slice())]
    #[case("GET", "/api/v2/download/count/", "", b"{\"a\":1}".as_slice())]
    #[case("GET", "/api/v2/recipient/x/", "", b"".as_slice())]
    #[case("GET", "/api/v2/download/count/", "year=all", b"".as_slice())]
    fn fingerprint_covers_every_request_part(
        #[case] method: &str,
        #[case] path: &str,
        #[case] query: &str,
        #[case] body: &[u8],
    ) {
        let baseline = ResponseCacheKey::for_request("GET", "/api/v2/download/count/", "", b"");
        let other = ResponseCacheKey::for_request(method, path, query, body);
        assert_ne!(baseline, other);
    }

    #[rstest]
    fn fingerprint_is_hex_sha256() {
        let key = ResponseCacheKey::for_request("GET", "/", "", b"");
        let digest = key.as_str().trim_start_matches("response:v1:");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
