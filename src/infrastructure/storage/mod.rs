use crate::core::models::{
    expense::{Expense, ExpenseShare},
    group::{Group, GroupMember, LeaveOutcome},
    user::User,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A unique key (username, membership pair, id) is already taken
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Row referenced by a write does not exist
    #[error("Missing row: {0}")]
    MissingRow(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence for users, groups, memberships, expenses and shares.
///
/// Methods that touch several rows are atomic: either every row changes or
/// none does.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, StorageError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    /// All users ordered by username.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Inserts the group and its first member together.
    async fn create_group_with_member(&self, group: Group, member: GroupMember) -> Result<Group, StorageError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, StorageError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StorageError>;
    async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, StorageError>;

    async fn add_member(&self, member: GroupMember) -> Result<GroupMember, StorageError>;
    async fn get_membership(&self, user_id: &str, group_id: &str) -> Result<Option<GroupMember>, StorageError>;
    async fn list_group_members(&self, group_id: &str) -> Result<Vec<GroupMember>, StorageError>;
    async fn list_memberships(&self) -> Result<Vec<GroupMember>, StorageError>;
    /// Removes the membership; when nobody is left the group, its expenses and
    /// their shares go with it.
    async fn leave_group(&self, user_id: &str, group_id: &str) -> Result<LeaveOutcome, StorageError>;

    async fn create_expense(&self, expense: Expense) -> Result<Expense, StorageError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, StorageError>;
    async fn update_expense(&self, expense: Expense) -> Result<Expense, StorageError>;
    /// Deletes the expense and its shares; returns the number of shares removed.
    async fn delete_expense(&self, expense_id: &str) -> Result<usize, StorageError>;
    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<Expense>, StorageError>;
    async fn list_expenses(&self) -> Result<Vec<Expense>, StorageError>;

    async fn create_expense_share(&self, share: ExpenseShare) -> Result<ExpenseShare, StorageError>;
    async fn list_expense_shares(&self) -> Result<Vec<ExpenseShare>, StorageError>;
}

pub mod in_memory;
