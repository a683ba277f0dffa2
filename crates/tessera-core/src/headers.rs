//! Minimal request/response header contracts
//!
//! The core never sees a framework's request or response type. Inbound it
//! needs something that can look up a header by name; outbound it needs
//! something that accepts one `Set-Cookie` header instance per cookie.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Inbound cookie header name
pub const COOKIE: &str = "cookie";

/// Outbound cookie header name
pub const SET_COOKIE: &str = "set-cookie";

/// Read access to inbound request headers
pub trait HeaderSource {
    /// Value of the named header, matched case-insensitively.
    ///
    /// When a transport delivers several `Cookie` header instances the
    /// implementation joins them with `"; "`.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Write access to outbound response headers
pub trait SetCookieSink {
    /// Append one `Set-Cookie` header instance
    fn append_set_cookie(&mut self, value: String);
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).header(name)
    }
}

impl HeaderSource for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        lookup_ignore_case(self.iter(), name)
    }
}

impl HeaderSource for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        lookup_ignore_case(self.iter(), name)
    }
}

fn lookup_ignore_case<'a>(
    mut entries: impl Iterator<Item = (&'a String, &'a String)>,
    name: &str,
) -> Option<Cow<'a, str>> {
    entries
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| Cow::Borrowed(value.as_str()))
}

impl SetCookieSink for Vec<String> {
    fn append_set_cookie(&mut self, value: String) {
        self.push(value);
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::*;
    use http::header::{HeaderMap, HeaderValue, SET_COOKIE};

    impl HeaderSource for HeaderMap {
        fn header(&self, name: &str) -> Option<Cow<'_, str>> {
            let mut values = self.get_all(name).iter().filter_map(|v| v.to_str().ok());
            let first = values.next()?;
            match values.next() {
                None => Some(Cow::Borrowed(first)),
                Some(second) => {
                    let mut joined = format!("{first}; {second}");
                    for value in values {
                        joined.push_str("; ");
                        joined.push_str(value);
                    }
                    Some(Cow::Owned(joined))
                }
            }
        }
    }

    impl SetCookieSink for HeaderMap {
        fn append_set_cookie(&mut self, value: String) {
            match HeaderValue::try_from(value) {
                Ok(value) => {
                    self.append(SET_COOKIE, value);
                }
                Err(e) => {
                    // Unreachable with a validated CookieConfig: values are percent-encoded
                    tracing::error!(error = %e, "Dropping unrepresentable Set-Cookie header");
                }
            }
        }
    }
}
