use super::{FreewiseService, persistence};
use crate::auth::jwt::{IssuedToken, SessionClaims};
use crate::core::errors::FreewiseError;
use crate::core::models::user::{Role, User, UserSummary};
use crate::infrastructure::storage::{Storage, StorageError};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a successful login: who logged in and the token to put in the cookie.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserSummary,
    pub session: IssuedToken,
}

impl<S: Storage> FreewiseService<S> {
    /// Creates a plain user. No session is issued; callers log in separately.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserSummary, FreewiseError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(FreewiseError::MissingCredentials);
        }
        self.validate_string_input("username", username, 50)?;

        let user = self.insert_user(username, password, Role::User).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, FreewiseError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(FreewiseError::MissingCredentials);
        }

        let user = self
            .storage
            .get_user_by_username(username)
            .await
            .map_err(persistence("FAILED_TO_LOGIN"))?;
        let user = match user {
            Some(user) if self.hasher.verify(password, &user.password)? => user,
            _ => {
                warn!("login rejected");
                return Err(FreewiseError::InvalidCredentials);
            }
        };

        let session = self.codec.encode(&SessionClaims {
            id: user.id.clone(),
            role: user.role,
        })?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            user: UserSummary::from(&user),
            session,
        })
    }

    /// Creates the configured admin account unless the username is taken.
    /// Returns `None` when nothing was created.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<Option<UserSummary>, FreewiseError> {
        let existing = self
            .storage
            .get_user_by_username(username)
            .await
            .map_err(persistence("FAILED_TO_SEED_ADMIN"))?;
        if existing.is_some() {
            info!(username, "admin user already exists");
            return Ok(None);
        }
        let admin = self.insert_user(username, password, Role::Admin).await?;
        info!(user_id = %admin.id, "created admin user");
        Ok(Some(admin))
    }

    async fn insert_user(&self, username: &str, password: &str, role: Role) -> Result<UserSummary, FreewiseError> {
        let existing = self
            .storage
            .get_user_by_username(username)
            .await
            .map_err(persistence("FAILED_TO_REGISTER"))?;
        if existing.is_some() {
            return Err(FreewiseError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: self.hasher.hash(password)?,
            role,
            default_currency: self.default_currency.clone(),
            created_at: Utc::now(),
        };
        match self.storage.create_user(user).await {
            Ok(user) => Ok(UserSummary::from(&user)),
            // Lost a race with a concurrent registration.
            Err(StorageError::UniqueViolation(_)) => Err(FreewiseError::UsernameTaken(username.to_string())),
            Err(e) => Err(persistence("FAILED_TO_REGISTER")(e)),
        }
    }
}
