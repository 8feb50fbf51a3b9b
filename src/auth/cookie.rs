//! Session cookie binding: writes, reads and clears the signed token.

use crate::auth::jwt::IssuedToken;
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use chrono::{DateTime, Utc};

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::str::FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite policy {}", other)),
        }
    }
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Deployment settings for the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    same_site: SameSite,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        SessionCookie {
            name: name.into(),
            secure,
            same_site: SameSite::Lax,
        }
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// `Set-Cookie` value carrying the issued token; expiry matches the token's.
    pub fn create(&self, issued: &IssuedToken) -> Result<HeaderValue, InvalidHeaderValue> {
        let max_age = (issued.expires_at - Utc::now()).num_seconds().max(0);
        self.build(&issued.token, issued.expires_at, max_age)
    }

    /// Raw token from the request, if the cookie is present and non-empty.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| {
                let (key, val) = pair.trim().split_once('=')?;
                (key.trim() == self.name).then(|| val.trim().to_string())
            })
            .find(|val| !val.is_empty())
    }

    /// `Set-Cookie` value that removes the session. Safe to send without a session.
    pub fn destroy(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build("", DateTime::<Utc>::UNIX_EPOCH, 0)
    }

    fn build(&self, value: &str, expires: DateTime<Utc>, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite={}; Expires={}; Max-Age={}",
            self.name,
            value,
            self.same_site.as_str(),
            expires.format(HTTP_DATE),
            max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}
