mod admin;
mod auth;
mod expenses;
mod groups;

pub use admin::AdminOverview;
pub use auth::LoginOutcome;

use crate::auth::jwt::SessionCodec;
use crate::auth::password::PasswordHasher;
use crate::core::errors::FreewiseError;
use crate::core::models::group::GroupMember;
use crate::infrastructure::storage::{Storage, StorageError};
use tracing::error;

pub struct FreewiseService<S: Storage> {
    storage: S,
    codec: SessionCodec,
    hasher: PasswordHasher,
    default_currency: String,
}

impl<S: Storage> FreewiseService<S> {
    pub fn new(storage: S, codec: SessionCodec, hasher: PasswordHasher, default_currency: String) -> Self {
        FreewiseService {
            storage,
            codec,
            hasher,
            default_currency,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn require_membership(&self, user_id: &str, group_id: &str) -> Result<GroupMember, FreewiseError> {
        self.storage
            .get_membership(user_id, group_id)
            .await
            .map_err(persistence("FAILED_TO_CHECK_MEMBERSHIP"))?
            .ok_or_else(|| FreewiseError::NotAMember(user_id.to_string()))
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), FreewiseError> {
        if value.trim().is_empty() {
            return Err(FreewiseError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(FreewiseError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(FreewiseError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), FreewiseError> {
        if !amount.is_finite() {
            return Err(FreewiseError::invalid_input(
                field,
                "Invalid Amount",
                "Amount must be a finite number",
            ));
        }
        if amount <= 0.0 {
            return Err(FreewiseError::invalid_input(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount > 1_000_000.0 {
            return Err(FreewiseError::invalid_input(
                field,
                "Amount Too Large",
                "Amount cannot exceed 1,000,000",
            ));
        }
        // Tolerate binary noise such as 0.1 + 0.2.
        let cents = amount * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            return Err(FreewiseError::invalid_input(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }
}

/// Checks a three-letter ISO code and returns it upper-cased.
pub(crate) fn validate_currency(currency: &str) -> Result<String, FreewiseError> {
    let code = currency.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FreewiseError::invalid_input(
            "currency",
            "Invalid Currency",
            "Currency must be a three-letter ISO code",
        ));
    }
    Ok(code)
}

/// Logs the store failure and hides its details behind the action code.
pub(crate) fn persistence(action: &'static str) -> impl FnOnce(StorageError) -> FreewiseError {
    move |e| {
        error!(action, error = %e, "storage operation failed");
        FreewiseError::Persistence {
            action,
            details: e.to_string(),
        }
    }
}
