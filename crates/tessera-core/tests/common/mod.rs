//! Shared test fixtures

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use tessera_core::{CookieConfig, FixedClock, HmacKey, TesseraConfig, TokenCodec};

/// 32-byte key shared by every fixture
pub const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";

/// 2023-11-14T22:13:20Z
pub const NOW: i64 = 1_700_000_000;

pub fn test_config() -> TesseraConfig {
    TesseraConfig::new(TEST_KEY, CookieConfig::default()).expect("test config is valid")
}

pub fn fixed_codec(now: i64) -> (TokenCodec, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    let key = HmacKey::new(TEST_KEY).expect("test key is 32 bytes");
    (TokenCodec::with_clock(key, clock.clone()), clock)
}

/// Request headers carrying a single `Cookie` header
pub fn cookie_headers(cookie: &str) -> HashMap<String, String> {
    HashMap::from([("Cookie".to_string(), cookie.to_string())])
}
