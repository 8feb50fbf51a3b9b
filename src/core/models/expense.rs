use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub amount: f64,
    /// ISO 4217 code, upper case
    pub currency: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
    pub paid_by_id: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseShare {
    pub id: String,
    pub expense_id: String,
    pub user_id: String,
    pub amount: f64,
    pub is_paid: bool,
    #[schema(value_type = Option<String>, example = "2024-06-01T12:34:56Z")]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewExpense {
    pub group_id: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    #[schema(value_type = Option<String>, example = "2024-06-01T12:34:56Z")]
    pub date: Option<DateTime<Utc>>,
}

/// Editable fields of an expense. Shares are left untouched.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct ExpenseUpdate {
    pub description: String,
    pub amount: f64,
    pub currency: String,
}
