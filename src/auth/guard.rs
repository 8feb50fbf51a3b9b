//! Session and admin guards.
//!
//! A request is checked at most once: the first caller decodes the cookie and
//! stores the outcome in the request extensions, later callers reuse it.

use crate::auth::cookie::SessionCookie;
use crate::auth::jwt::{DecodeError, SessionCodec, SessionPayload};
use axum::http::request::Parts;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("No session")]
    NoSession,
    #[error("Invalid session signature")]
    InvalidSignature,
    #[error("Session expired")]
    Expired,
    #[error("Malformed session")]
    Malformed,
    #[error("Admin role required")]
    NotAdmin,
}

impl GuardError {
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::NoSession => "NO_SESSION",
            GuardError::InvalidSignature => "INVALID_SESSION",
            GuardError::Expired => "SESSION_EXPIRED",
            GuardError::Malformed => "MALFORMED_SESSION",
            GuardError::NotAdmin => "NOT_ADMIN",
        }
    }
}

impl From<DecodeError> for GuardError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidSignature => GuardError::InvalidSignature,
            DecodeError::Expired => GuardError::Expired,
            DecodeError::Malformed => GuardError::Malformed,
        }
    }
}

/// Outcome of checking one request's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(Result<SessionPayload, GuardError>);

impl Session {
    /// Decodes the raw cookie value; `None` means no session was sent.
    pub fn resolve(codec: &SessionCodec, token: Option<&str>) -> Self {
        let outcome = match token {
            None => Err(GuardError::NoSession),
            Some(token) => codec.decode(token).map_err(GuardError::from),
        };
        if let Err(err) = &outcome {
            debug!(reason = err.code(), "session rejected");
        }
        Session(outcome)
    }

    pub fn anonymous() -> Self {
        Session(Err(GuardError::NoSession))
    }

    pub fn verify(&self) -> Result<&SessionPayload, GuardError> {
        self.0.as_ref().map_err(|e| *e)
    }

    /// Like [`Session::verify`], additionally requiring the admin role.
    pub fn verify_admin(&self) -> Result<&SessionPayload, GuardError> {
        let payload = self.verify()?;
        if payload.is_admin() {
            Ok(payload)
        } else {
            Err(GuardError::NotAdmin)
        }
    }

    pub fn status(&self) -> AuthStatus {
        match &self.0 {
            Ok(payload) => AuthStatus {
                is_auth: true,
                payload: Some(payload.clone()),
                error: None,
            },
            Err(err) => AuthStatus {
                is_auth: false,
                payload: None,
                error: Some(err.code().to_string()),
            },
        }
    }
}

/// Wire shape of a guard outcome.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_auth: bool,
    pub payload: Option<SessionPayload>,
    pub error: Option<String>,
}

/// Reads and decodes the session cookie once per request.
pub fn verify_session(parts: &mut Parts, cookie: &SessionCookie, codec: &SessionCodec) -> Session {
    if let Some(session) = parts.extensions.get::<Session>() {
        return session.clone();
    }
    let token = cookie.read(&parts.headers);
    let session = Session::resolve(codec, token.as_deref());
    parts.extensions.insert(session.clone());
    session
}
