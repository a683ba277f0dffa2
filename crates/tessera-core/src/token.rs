//! HS256 signed token codec
//!
//! Wire format: `base64url(header).base64url(payload).base64url(hmac)`, with
//! unpadded URL-safe base64 and the MAC computed over the first two segments
//! exactly as they appear in the token. Verification never re-serializes the
//! claims.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use tessera_types::User;

use crate::clock::{Clock, SystemClock};
use crate::crypto::HmacKey;
use crate::TokenError;

/// Signing algorithm tag written into every header
pub const ALGORITHM: &str = "HS256";

/// Token type tag written into every header
pub const TOKEN_TYPE: &str = "JWT";

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
}

/// Claims carried in a token payload.
///
/// An arbitrary JSON object; `iat`, `exp`, `sub` and `user` have accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Issued-at claim (epoch seconds)
    pub const ISSUED_AT: &'static str = "iat";
    /// Expiry claim (epoch seconds)
    pub const EXPIRES_AT: &'static str = "exp";
    /// Subject identifier claim
    pub const SUBJECT: &'static str = "sub";
    /// Structured identity claim
    pub const USER: &'static str = "user";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary claim
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set the subject claim
    #[must_use]
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        self.with(Self::SUBJECT, subject.into())
    }

    /// Set the structured `user` claim
    #[must_use]
    pub fn with_user(self, user: &User) -> Self {
        self.with(Self::USER, serde_json::json!(user))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Issued-at timestamp, if present and integral
    pub fn issued_at(&self) -> Option<i64> {
        self.0.get(Self::ISSUED_AT).and_then(Value::as_i64)
    }

    /// Expiry timestamp, if present and integral
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(Self::EXPIRES_AT).and_then(Value::as_i64)
    }

    /// Subject identifier, if present and a string
    pub fn subject(&self) -> Option<&str> {
        self.0.get(Self::SUBJECT).and_then(Value::as_str)
    }

    /// Deserialize the whole claim set into a typed struct
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TokenError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|_| TokenError::Malformed)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Signs and verifies tokens with a single HMAC key.
///
/// Cheap to clone; safe to share across threads.
#[derive(Clone)]
pub struct TokenCodec {
    key: HmacKey,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec using the wall clock
    pub fn new(key: HmacKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    /// Create a codec with a custom time source
    pub fn with_clock(key: HmacKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// Current time according to this codec's clock
    pub fn now(&self) -> i64 {
        self.clock.now_secs()
    }

    /// Sign claims, stamping `iat = now` and `exp = now + ttl_secs`.
    ///
    /// A zero or negative TTL produces a token that is already expired.
    pub fn sign(&self, claims: Claims, ttl_secs: i64) -> String {
        let now = self.now();
        let mut payload = claims.into_inner();
        payload.insert(Claims::ISSUED_AT.to_string(), Value::from(now));
        payload.insert(
            Claims::EXPIRES_AT.to_string(),
            Value::from(now.saturating_add(ttl_secs)),
        );

        let header_b64 = URL_SAFE_NO_PAD.encode(HEADER_JSON);
        let payload_b64 = URL_SAFE_NO_PAD.encode(Value::Object(payload).to_string());
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = URL_SAFE_NO_PAD.encode(self.key.sign(signing_input.as_bytes()));

        format!("{signing_input}.{signature}")
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in this order, and nothing from the payload is read before
    /// the signature matches:
    /// 1. exactly three `.`-separated segments, else [`TokenError::Malformed`]
    /// 2. constant-time MAC comparison, else [`TokenError::SignatureInvalid`]
    /// 3. header and payload decode as JSON with `alg = HS256`, else [`TokenError::Malformed`]
    /// 4. `iat` and `exp`, when present, are integers, else [`TokenError::Malformed`]
    /// 5. `now < exp` when `exp` is present, else [`TokenError::Expired`]
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        let supplied = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::SignatureInvalid)?;
        if !self.key.verify(signing_input.as_bytes(), &supplied) {
            return Err(TokenError::SignatureInvalid);
        }

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let claims: Claims = decode_segment(payload_b64)?;
        if claims.get(Claims::ISSUED_AT).is_some() && claims.issued_at().is_none() {
            return Err(TokenError::Malformed);
        }
        if let Some(exp) = claims.get(Claims::EXPIRES_AT) {
            let exp = exp.as_i64().ok_or(TokenError::Malformed)?;
            if self.is_expired(exp) {
                return Err(TokenError::Expired);
            }
        }

        Ok(claims)
    }

    /// `now >= expires_at`, on the same clock `verify` uses
    pub fn is_expired(&self, expires_at: i64) -> bool {
        self.now() >= expires_at
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &self.key)
            .field("clock", &self.clock)
            .finish()
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const NOW: i64 = 1_700_000_000;

    fn codec_at(now: i64) -> (TokenCodec, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(now));
        let key = HmacKey::new("0123456789abcdef0123456789abcdef").unwrap();
        (TokenCodec::with_clock(key, clock.clone()), clock)
    }

    /// Re-sign arbitrary header/payload JSON with the test key
    fn forge(codec: &TokenCodec, header: &str, payload: &str) -> String {
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let sig = URL_SAFE_NO_PAD.encode(codec.key.sign(input.as_bytes()));
        format!("{input}.{sig}")
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new().with_subject("user-1").with("scope", "read"), 60);

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.subject(), Some("user-1"));
        assert_eq!(claims.get("scope"), Some(&Value::from("read")));
        assert_eq!(claims.issued_at(), Some(NOW));
        assert_eq!(claims.expires_at(), Some(NOW + 60));
    }

    #[test]
    fn test_header_is_standard_hs256() {
        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new(), 60);
        let header = token.split('.').next().unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(header).unwrap();
        assert_eq!(decoded, HEADER_JSON.as_bytes());
        assert!(!token.contains('='));
    }

    #[test]
    fn test_sign_overrides_caller_timestamps() {
        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new().with("iat", 1).with("exp", i64::MAX), 10);
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.issued_at(), Some(NOW));
        assert_eq!(claims.expires_at(), Some(NOW + 10));
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new(), 60);
        assert_eq!(codec.verify("nodots"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(&format!("{token}.extra")), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_empty_segments_fail_signature() {
        let (codec, _) = codec_at(NOW);
        assert_eq!(codec.verify(".."), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let (codec, _) = codec_at(NOW);
        let mut token = codec.sign(Claims::new(), 60);
        token.truncate(token.len() - 4);
        assert_eq!(codec.verify(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (codec, _) = codec_at(NOW);
        let other = TokenCodec::with_clock(
            HmacKey::new("fedcba9876543210fedcba9876543210").unwrap(),
            Arc::new(FixedClock::new(NOW)),
        );
        let token = other.sign(Claims::new().with_subject("attacker"), 60);
        assert_eq!(codec.verify(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_swapped_payload_rejected() {
        let (codec, _) = codec_at(NOW);
        let honest = codec.sign(Claims::new().with_subject("user-1"), 60);
        let evil = codec.sign(Claims::new().with_subject("admin"), 60);

        let honest_parts: Vec<&str> = honest.split('.').collect();
        let evil_parts: Vec<&str> = evil.split('.').collect();
        let spliced = format!("{}.{}.{}", honest_parts[0], evil_parts[1], honest_parts[2]);
        assert_eq!(codec.verify(&spliced), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_signed_garbage_payload_is_malformed() {
        let (codec, _) = codec_at(NOW);
        assert_eq!(
            codec.verify(&forge(&codec, HEADER_JSON, "not json")),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            codec.verify(&forge(&codec, HEADER_JSON, "[1,2,3]")),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_non_hs256_header_is_malformed() {
        let (codec, _) = codec_at(NOW);
        let token = forge(&codec, r#"{"alg":"none","typ":"JWT"}"#, r#"{"sub":"u"}"#);
        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_non_integer_exp_is_malformed() {
        let (codec, _) = codec_at(NOW);
        let token = forge(&codec, HEADER_JSON, r#"{"sub":"u","exp":"tomorrow"}"#);
        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_non_integer_iat_is_malformed() {
        let (codec, _) = codec_at(NOW);
        let token = forge(&codec, HEADER_JSON, r#"{"sub":"u","iat":"yesterday"}"#);
        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));

        let token = forge(&codec, HEADER_JSON, r#"{"sub":"u","iat":1.5}"#);
        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_with_user_skips_unset_fields() {
        let claims = Claims::new().with_user(&User::new("user-1").with_name("Ada"));
        assert_eq!(
            claims.get(Claims::USER),
            Some(&serde_json::json!({"id": "user-1", "name": "Ada"}))
        );
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let (codec, _) = codec_at(NOW);
        let token = forge(&codec, HEADER_JSON, r#"{"sub":"u"}"#);
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.expires_at(), None);
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new().with_subject("u"), -1);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let (codec, clock) = codec_at(NOW);
        let token = codec.sign(Claims::new(), 0);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));

        let token = codec.sign(Claims::new(), 30);
        clock.set(NOW + 29);
        assert!(codec.verify(&token).is_ok());
        clock.set(NOW + 30);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_is_expired() {
        let (codec, _) = codec_at(NOW);
        assert!(codec.is_expired(NOW));
        assert!(codec.is_expired(NOW - 1));
        assert!(!codec.is_expired(NOW + 1));
    }

    #[test]
    fn test_tampered_signature_checked_before_expiry() {
        let (codec, _) = codec_at(NOW);
        let mut token = codec.sign(Claims::new(), -100);
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });
        assert_eq!(codec.verify(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_with_user_claim() {
        let (codec, _) = codec_at(NOW);
        let user = User::new("user-1").with_email("a@b.c").with_roles(["admin"]);
        let token = codec.sign(Claims::new().with_user(&user), 60);

        let claims = codec.verify(&token).unwrap();
        let decoded: User = serde_json::from_value(claims.get(Claims::USER).unwrap().clone()).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_decode_typed_claims() {
        #[derive(Deserialize)]
        struct Minimal {
            sub: String,
            exp: i64,
        }

        let (codec, _) = codec_at(NOW);
        let token = codec.sign(Claims::new().with_subject("user-9"), 5);
        let typed: Minimal = codec.verify(&token).unwrap().decode().unwrap();
        assert_eq!(typed.sub, "user-9");
        assert_eq!(typed.exp, NOW + 5);
    }
}
