use serde::Serialize;
use thiserror::Error;

use crate::auth::guard::GuardError;
use crate::infrastructure::currency::CurrencyError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

/// Coarse error classes used to pick the HTTP status and log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Authorization,
    NotFound,
    Conflict,
    Persistence,
    Upstream,
    Internal,
}

#[derive(Error, Debug)]
pub enum FreewiseError {
    /// Username and password are both required
    #[error("username and password are required")]
    MissingCredentials,

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Username is already registered
    #[error("Username already exists")]
    UsernameTaken(String),

    /// Unknown username or wrong password, deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session guard rejected the request
    #[error(transparent)]
    Session(#[from] GuardError),

    /// User is not a member of the group
    #[error("User {0} is not a group member")]
    NotAMember(String),

    /// User did not pay for the expense
    #[error("User {0} did not pay for this expense")]
    NotOwner(String),

    /// User is already a member of the group
    #[error("User {0} is already a group member")]
    AlreadyMember(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Group {0} not found")]
    GroupNotFound(String),

    #[error("Expense {0} not found")]
    ExpenseNotFound(String),

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Store failure; only the action code reaches the client
    #[error("Failed to {action}: {details}")]
    Persistence { action: &'static str, details: String },

    /// Internal server error (e.g. token signing or hashing failure)
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl FreewiseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FreewiseError::MissingCredentials | FreewiseError::InvalidInput(..) => ErrorKind::Validation,
            FreewiseError::InvalidCredentials => ErrorKind::Auth,
            FreewiseError::Session(GuardError::NotAdmin) => ErrorKind::Authorization,
            FreewiseError::Session(_) => ErrorKind::Auth,
            FreewiseError::NotAMember(_) | FreewiseError::NotOwner(_) => ErrorKind::Authorization,
            FreewiseError::UsernameTaken(_) | FreewiseError::AlreadyMember(_) => ErrorKind::Conflict,
            FreewiseError::UserNotFound(_) | FreewiseError::GroupNotFound(_) | FreewiseError::ExpenseNotFound(_) => {
                ErrorKind::NotFound
            }
            FreewiseError::Currency(CurrencyError::UnknownCurrency(_)) => ErrorKind::Validation,
            FreewiseError::Currency(_) => ErrorKind::Upstream,
            FreewiseError::Persistence { .. } => ErrorKind::Persistence,
            FreewiseError::InternalServerError(_) => ErrorKind::Internal,
        }
    }

    /// Stable token for client-side branching.
    pub fn code(&self) -> &'static str {
        match self {
            FreewiseError::MissingCredentials => "MISSING_CREDENTIALS",
            FreewiseError::InvalidInput(..) => "INVALID_INPUT",
            FreewiseError::UsernameTaken(_) => "USERNAME_TAKEN",
            FreewiseError::InvalidCredentials => "INVALID_CREDENTIALS",
            FreewiseError::Session(err) => err.code(),
            FreewiseError::NotAMember(_) => "NOT_A_MEMBER",
            FreewiseError::NotOwner(_) => "NOT_OWNER",
            FreewiseError::AlreadyMember(_) => "ALREADY_MEMBER",
            FreewiseError::UserNotFound(_) => "USER_NOT_FOUND",
            FreewiseError::GroupNotFound(_) => "GROUP_NOT_FOUND",
            FreewiseError::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            FreewiseError::Currency(CurrencyError::UnknownCurrency(_)) => "UNKNOWN_CURRENCY",
            FreewiseError::Currency(_) => "EXCHANGE_RATES_UNAVAILABLE",
            FreewiseError::Persistence { action, .. } => action,
            FreewiseError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FreewiseError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.into(),
                description: description.into(),
            },
        )
    }
}
