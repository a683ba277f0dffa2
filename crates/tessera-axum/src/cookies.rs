//! Response parts that write the auth cookies
//!
//! Each part appends one `Set-Cookie` header instance per cookie, so they
//! compose with any other response in a handler's return tuple:
//!
//! ```ignore
//! async fn logout(State(auth): State<SessionAuth>) -> impl IntoResponse {
//!     (ClearAuthCookies::new(&auth), StatusCode::NO_CONTENT)
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::{IntoResponseParts, ResponseParts};

use tessera_core::{CookieMaxAge, CookiePolicy, CookieRole, SetCookieSink};
use tessera_types::AuthTokens;

use crate::state::SessionAuth;

/// Sets the session, refresh and CSRF cookies
#[derive(Debug)]
pub struct SetAuthCookies {
    policy: Arc<CookiePolicy>,
    tokens: AuthTokens,
    max_age: CookieMaxAge,
}

impl SetAuthCookies {
    pub fn new(auth: &SessionAuth, tokens: AuthTokens) -> Self {
        Self {
            policy: auth.policy.clone(),
            tokens,
            max_age: CookieMaxAge::default(),
        }
    }

    /// Give the session and refresh cookies a `Max-Age`
    pub fn with_max_age(mut self, max_age: CookieMaxAge) -> Self {
        self.max_age = max_age;
        self
    }
}

impl IntoResponseParts for SetAuthCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.policy
            .write_set_cookies(res.headers_mut(), &self.tokens, self.max_age);
        Ok(res)
    }
}

/// Expires all three auth cookies
#[derive(Debug, Clone)]
pub struct ClearAuthCookies(Arc<CookiePolicy>);

impl ClearAuthCookies {
    pub fn new(auth: &SessionAuth) -> Self {
        Self(auth.policy.clone())
    }
}

impl IntoResponseParts for ClearAuthCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.0.write_clear_cookies(res.headers_mut());
        Ok(res)
    }
}

/// Sets only the CSRF cookie, e.g. when handing a fresh token to an anonymous client
#[derive(Debug, Clone)]
pub struct SetCsrfCookie {
    policy: Arc<CookiePolicy>,
    token: String,
}

impl SetCsrfCookie {
    pub fn new(auth: &SessionAuth, token: impl Into<String>) -> Self {
        Self {
            policy: auth.policy.clone(),
            token: token.into(),
        }
    }
}

impl IntoResponseParts for SetCsrfCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let cookie = self.policy.build_cookie(CookieRole::Csrf, &self.token, None);
        res.headers_mut().append_set_cookie(cookie);
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::SET_COOKIE, Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use tessera_core::{CookieConfig, TesseraConfig};
    use tower::ServiceExt;

    fn auth() -> SessionAuth {
        let config =
            TesseraConfig::new("0123456789abcdef0123456789abcdef", CookieConfig::default()).unwrap();
        SessionAuth::from_config(&config).unwrap()
    }

    async fn set_cookies(app: Router) -> (StatusCode, Vec<String>) {
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        (response.status(), cookies)
    }

    #[tokio::test]
    async fn test_set_auth_cookies() {
        let auth = auth();
        let app = Router::new().route(
            "/",
            get(move || async move {
                let tokens = AuthTokens::new("acc", "ref", "csrf-tok");
                let max_age = CookieMaxAge {
                    access: Some(900),
                    refresh: Some(86_400),
                };
                (SetAuthCookies::new(&auth, tokens).with_max_age(max_age), "ok")
            }),
        );

        let (status, cookies) = set_cookies(app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cookies,
            vec![
                "at=acc; Path=/; Max-Age=900; SameSite=Lax; Secure; HttpOnly".to_string(),
                "rt=ref; Path=/api; Max-Age=86400; SameSite=Strict; Secure; HttpOnly".to_string(),
                "csrf=csrf-tok; Path=/; SameSite=Lax; Secure".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_auth_cookies() {
        let auth = auth();
        let app = Router::new().route(
            "/",
            get(move || async move {
                (ClearAuthCookies::new(&auth), StatusCode::NO_CONTENT).into_response()
            }),
        );

        let (status, cookies) = set_cookies(app).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
        assert!(cookies[0].starts_with("at=;"));
    }

    #[tokio::test]
    async fn test_set_csrf_cookie() {
        let auth = auth();
        let app = Router::new().route(
            "/",
            get(move || async move { (SetCsrfCookie::new(&auth, "abc"), "ok") }),
        );

        let (_, cookies) = set_cookies(app).await;
        assert_eq!(cookies, vec!["csrf=abc; Path=/; SameSite=Lax; Secure".to_string()]);
    }
}
