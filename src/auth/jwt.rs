use crate::core::errors::FreewiseError;
use crate::core::models::user::Role;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use utoipa::ToSchema;

/// What the caller asks to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: String,
    pub role: Role,
}

/// Claims as they travel inside the token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct SessionPayload {
    pub id: String,
    #[serde(default)]
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

impl SessionPayload {
    pub fn claims(&self) -> SessionClaims {
        SessionClaims {
            id: self.id.clone(),
            role: self.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("session signature does not verify")]
    InvalidSignature,
    #[error("session has expired")]
    Expired,
    #[error("session token is malformed")]
    Malformed,
}

/// HS256 signer/verifier for session tokens. Built once from configuration.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        SessionCodec {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<IssuedToken, FreewiseError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| FreewiseError::InternalServerError(format!("Time error: {}", e)))?;
        self.encode_at(claims, now.as_secs())
    }

    pub(crate) fn encode_at(&self, claims: &SessionClaims, issued_at: u64) -> Result<IssuedToken, FreewiseError> {
        let exp = issued_at
            .checked_add(self.ttl.as_secs())
            .ok_or_else(|| FreewiseError::InternalServerError("Session lifetime overflows the clock".to_string()))?;
        let payload = SessionPayload {
            id: claims.id.clone(),
            role: claims.role,
            iat: issued_at,
            exp,
        };
        let expires_at = i64::try_from(exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| FreewiseError::InternalServerError(format!("Expiry out of range: {}", exp)))?;

        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| FreewiseError::InternalServerError(format!("JWT encoding error: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn decode(&self, token: &str) -> Result<SessionPayload, DecodeError> {
        decode::<SessionPayload>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DecodeError::InvalidSignature,
                ErrorKind::ExpiredSignature => DecodeError::Expired,
                _ => DecodeError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> SessionCodec {
        SessionCodec::new(secret.as_bytes(), Duration::from_secs(2 * 60 * 60))
    }

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    #[test]
    fn decode_returns_the_encoded_claims() {
        let codec = codec("test-secret");
        let claims = SessionClaims {
            id: "user-1".to_string(),
            role: Role::Admin,
        };
        let issued = codec.encode(&claims).unwrap();
        let payload = codec.decode(&issued.token).unwrap();
        assert_eq!(payload.claims(), claims);
        assert_eq!(payload.exp - payload.iat, 7200);
        assert_eq!(issued.expires_at.timestamp() as u64, payload.exp);
    }

    #[test]
    fn token_past_its_window_is_expired() {
        let codec = codec("test-secret");
        let claims = SessionClaims {
            id: "user-1".to_string(),
            role: Role::User,
        };
        let issued = codec.encode_at(&claims, now() - 3 * 60 * 60).unwrap();
        assert_eq!(codec.decode(&issued.token), Err(DecodeError::Expired));
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let claims = SessionClaims {
            id: "user-1".to_string(),
            role: Role::User,
        };
        let issued = codec("other-secret").encode(&claims).unwrap();
        assert_eq!(codec("test-secret").decode(&issued.token), Err(DecodeError::InvalidSignature));
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        let codec = SessionCodec::new(b"test-secret", Duration::from_secs(u64::MAX));
        let claims = SessionClaims {
            id: "user-1".to_string(),
            role: Role::User,
        };
        assert!(matches!(
            codec.encode(&claims),
            Err(FreewiseError::InternalServerError(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("test-secret");
        assert_eq!(codec.decode("not-a-token"), Err(DecodeError::Malformed));
        assert_eq!(codec.decode(""), Err(DecodeError::Malformed));
    }
}
