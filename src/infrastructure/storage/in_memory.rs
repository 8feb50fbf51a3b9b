use crate::core::models::{
    expense::{Expense, ExpenseShare},
    group::{Group, GroupMember, LeaveOutcome},
    user::User,
};
use crate::infrastructure::storage::{Storage, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    users_by_username: HashMap<String, String>,
    groups: HashMap<String, Group>,
    // (user_id, group_id) -> membership
    members: HashMap<(String, String), GroupMember>,
    expenses: HashMap<String, Expense>,
    shares: HashMap<String, ExpenseShare>,
}

impl Tables {
    fn member_count(&self, group_id: &str) -> usize {
        self.members.values().filter(|m| m.group_id == group_id).count()
    }

    fn remove_expense(&mut self, expense_id: &str) -> usize {
        self.expenses.remove(expense_id);
        let before = self.shares.len();
        self.shares.retain(|_, s| s.expense_id != expense_id);
        before - self.shares.len()
    }
}

/// Single-lock store: every write takes the one write guard, so multi-row
/// writes are all-or-nothing.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }
}

fn newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users_by_username.contains_key(&user.username) {
            return Err(StorageError::UniqueViolation(format!("username {}", user.username)));
        }
        if tables.users.contains_key(&user.id) {
            return Err(StorageError::UniqueViolation(format!("user id {}", user.id)));
        }
        tables.users_by_username.insert(user.username.clone(), user.id.clone());
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users_by_username
            .get(username)
            .and_then(|id| tables.users.get(id).cloned()))
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_group_with_member(&self, group: Group, member: GroupMember) -> Result<Group, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.groups.contains_key(&group.id) {
            return Err(StorageError::UniqueViolation(format!("group id {}", group.id)));
        }
        if member.group_id != group.id {
            return Err(StorageError::MissingRow(format!("group {}", member.group_id)));
        }
        if !tables.users.contains_key(&member.user_id) {
            return Err(StorageError::MissingRow(format!("user {}", member.user_id)));
        }
        tables.groups.insert(group.id.clone(), group.clone());
        tables
            .members
            .insert((member.user_id.clone(), member.group_id.clone()), member);
        Ok(group)
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StorageError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    async fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>, StorageError> {
        let tables = self.tables.read().await;
        let mut memberships: Vec<&GroupMember> = tables.members.values().filter(|m| m.user_id == user_id).collect();
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(memberships
            .into_iter()
            .filter_map(|m| tables.groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn add_member(&self, member: GroupMember) -> Result<GroupMember, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&member.group_id) {
            return Err(StorageError::MissingRow(format!("group {}", member.group_id)));
        }
        if !tables.users.contains_key(&member.user_id) {
            return Err(StorageError::MissingRow(format!("user {}", member.user_id)));
        }
        let key = (member.user_id.clone(), member.group_id.clone());
        if tables.members.contains_key(&key) {
            return Err(StorageError::UniqueViolation(format!(
                "membership ({}, {})",
                member.user_id, member.group_id
            )));
        }
        tables.members.insert(key, member.clone());
        Ok(member)
    }

    async fn get_membership(&self, user_id: &str, group_id: &str) -> Result<Option<GroupMember>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .get(&(user_id.to_string(), group_id.to_string()))
            .cloned())
    }

    async fn list_group_members(&self, group_id: &str) -> Result<Vec<GroupMember>, StorageError> {
        let tables = self.tables.read().await;
        let mut members: Vec<GroupMember> = tables
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn list_memberships(&self) -> Result<Vec<GroupMember>, StorageError> {
        let tables = self.tables.read().await;
        let mut members: Vec<GroupMember> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn leave_group(&self, user_id: &str, group_id: &str) -> Result<LeaveOutcome, StorageError> {
        let mut tables = self.tables.write().await;
        if tables
            .members
            .remove(&(user_id.to_string(), group_id.to_string()))
            .is_none()
        {
            return Err(StorageError::MissingRow(format!("membership ({}, {})", user_id, group_id)));
        }

        let remaining_members = tables.member_count(group_id);
        if remaining_members > 0 {
            return Ok(LeaveOutcome::Left { remaining_members });
        }

        tables.groups.remove(group_id);
        let expense_ids: Vec<String> = tables
            .expenses
            .values()
            .filter(|e| e.group_id == group_id)
            .map(|e| e.id.clone())
            .collect();
        for expense_id in &expense_ids {
            tables.remove_expense(expense_id);
        }
        Ok(LeaveOutcome::GroupDeleted {
            expenses_removed: expense_ids.len(),
        })
    }

    async fn create_expense(&self, expense: Expense) -> Result<Expense, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&expense.group_id) {
            return Err(StorageError::MissingRow(format!("group {}", expense.group_id)));
        }
        if tables.expenses.contains_key(&expense.id) {
            return Err(StorageError::UniqueViolation(format!("expense id {}", expense.id)));
        }
        tables.expenses.insert(expense.id.clone(), expense.clone());
        Ok(expense)
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.expenses.get(expense_id).cloned())
    }

    async fn update_expense(&self, expense: Expense) -> Result<Expense, StorageError> {
        let mut tables = self.tables.write().await;
        match tables.expenses.get_mut(&expense.id) {
            Some(existing) => {
                *existing = expense.clone();
                Ok(expense)
            }
            None => Err(StorageError::MissingRow(format!("expense {}", expense.id))),
        }
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<usize, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.expenses.contains_key(expense_id) {
            return Err(StorageError::MissingRow(format!("expense {}", expense_id)));
        }
        Ok(tables.remove_expense(expense_id))
    }

    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<Expense>, StorageError> {
        let tables = self.tables.read().await;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        newest_first(&mut expenses);
        Ok(expenses)
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        let tables = self.tables.read().await;
        let mut expenses: Vec<Expense> = tables.expenses.values().cloned().collect();
        newest_first(&mut expenses);
        Ok(expenses)
    }

    async fn create_expense_share(&self, share: ExpenseShare) -> Result<ExpenseShare, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.expenses.contains_key(&share.expense_id) {
            return Err(StorageError::MissingRow(format!("expense {}", share.expense_id)));
        }
        if tables.shares.contains_key(&share.id) {
            return Err(StorageError::UniqueViolation(format!("share id {}", share.id)));
        }
        tables.shares.insert(share.id.clone(), share.clone());
        Ok(share)
    }

    async fn list_expense_shares(&self) -> Result<Vec<ExpenseShare>, StorageError> {
        let tables = self.tables.read().await;
        let mut shares: Vec<ExpenseShare> = tables.shares.values().cloned().collect();
        shares.sort_by(|a, b| a.expense_id.cmp(&b.expense_id).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(shares)
    }
}
