//! Signing key and comparison primitives
//!
//! Everything that touches a MAC or a secret goes through here so that
//! comparisons are never short-circuiting.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// HS256 signing key, keyed once at startup.
///
/// Each signature clones the keyed MAC state rather than re-running the key
/// schedule from raw bytes.
#[derive(Clone)]
pub struct HmacKey {
    mac: HmacSha256,
    key_len: usize,
}

impl HmacKey {
    /// Shortest accepted key, in bytes
    pub const MIN_KEY_LENGTH: usize = 32;

    /// HMAC-SHA256 output size, in bytes
    pub const DIGEST_LENGTH: usize = 32;

    /// Key the MAC.
    ///
    /// # Errors
    /// [`HmacKeyError::KeyTooShort`] below [`Self::MIN_KEY_LENGTH`] bytes.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let raw = key.as_ref();
        if raw.len() < Self::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                len: raw.len(),
                min: Self::MIN_KEY_LENGTH,
            });
        }
        let mac = HmacSha256::new_from_slice(raw).map_err(|_| HmacKeyError::Rejected)?;
        Ok(Self {
            mac,
            key_len: raw.len(),
        })
    }

    pub fn sign(&self, message: &[u8]) -> [u8; Self::DIGEST_LENGTH] {
        self.mac.clone().chain_update(message).finalize().into_bytes().into()
    }

    /// Recompute the MAC over `message` and compare without early exit.
    ///
    /// A tag of the wrong length never matches.
    pub fn verify(&self, message: &[u8], tag: &[u8]) -> bool {
        constant_time_eq(&self.sign(message), tag)
    }

    pub fn len(&self) -> usize {
        self.key_len
    }

    pub fn is_empty(&self) -> bool {
        self.key_len == 0
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("len", &self.key_len)
            .finish_non_exhaustive()
    }
}

/// Signing key construction failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HmacKeyError {
    #[error("signing key is {len} bytes, at least {min} required")]
    KeyTooShort { len: usize, min: usize },

    #[error("signing key rejected by HMAC-SHA256")]
    Rejected,
}

/// Byte comparison whose running time depends only on the lengths.
///
/// Slices of different length compare unequal; length is not treated as secret.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// [`constant_time_eq`] over UTF-8 bytes
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_equal_slices_match() {
        assert!(constant_time_eq(b"header.payload", b"header.payload"));
        assert!(constant_time_eq(&[], &[]));
    }

    #[test]
    fn test_last_byte_difference_detected() {
        assert!(!constant_time_eq(b"header.payload", b"header.payloaD"));
    }

    #[test]
    fn test_prefix_does_not_match() {
        assert!(!constant_time_eq(b"header", b"header.payload"));
        assert!(!constant_time_str_eq("csrf", "csrf-token"));
        assert!(constant_time_str_eq("csrf-token", "csrf-token"));
    }

    #[test]
    fn test_short_key_rejected() {
        assert_eq!(
            HmacKey::new("too-short").unwrap_err(),
            HmacKeyError::KeyTooShort { len: 9, min: 32 }
        );
        assert!(HmacKey::new(&KEY[..31]).is_err());
        assert_eq!(HmacKey::new(KEY).unwrap().len(), 32);
    }

    #[test]
    fn test_tag_checks() {
        let key = HmacKey::new(KEY).unwrap();
        let tag = key.sign(b"a.b");
        assert!(key.verify(b"a.b", &tag));
        assert!(!key.verify(b"a.c", &tag));
        assert!(!key.verify(b"a.b", &tag[..31]));

        let other = HmacKey::new(b"fedcba9876543210fedcba9876543210").unwrap();
        assert!(!other.verify(b"a.b", &tag));
    }

    #[test]
    fn test_cached_key_matches_fresh_mac() {
        let mut mac = HmacSha256::new_from_slice(KEY).unwrap();
        mac.update(b"payload");
        let fresh: [u8; 32] = mac.finalize().into_bytes().into();

        let key = HmacKey::new(KEY).unwrap();
        assert_eq!(key.sign(b"payload"), fresh);
        assert_eq!(key.sign(b"payload"), fresh);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = HmacKey::new("do-not-print-this-signing-key-material").unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("len: 38"));
        assert!(!debug.contains("do-not-print"));
    }
}
