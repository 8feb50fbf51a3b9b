use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::expense::Expense;
use super::user::Role;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

/// Join row between a user and a group, unique per `(user_id, group_id)`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupMember {
    pub user_id: String,
    pub group_id: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberView {
    pub user_id: String,
    pub username: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseView {
    #[serde(flatten)]
    pub expense: Expense,
    pub paid_by_username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<MemberView>,
    pub expenses: Vec<ExpenseView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserWithGroups {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub default_currency: String,
    pub groups: Vec<Group>,
}

/// What happened to the group after a member left it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeaveOutcome {
    Left { remaining_members: usize },
    GroupDeleted { expenses_removed: usize },
}
