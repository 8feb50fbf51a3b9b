use super::{FreewiseService, persistence};
use crate::auth::guard::Session;
use crate::core::errors::FreewiseError;
use crate::core::models::group::{
    ExpenseView, Group, GroupDetail, GroupMember, LeaveOutcome, MemberView, UserWithGroups,
};
use crate::infrastructure::storage::{Storage, StorageError};
use chrono::Utc;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

impl<S: Storage> FreewiseService<S> {
    /// Dashboard data for the caller.
    pub async fn get_user_with_groups(&self, session: &Session) -> Result<UserWithGroups, FreewiseError> {
        let caller = session.verify()?;
        let user = self
            .storage
            .get_user(&caller.id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_USER"))?
            .ok_or_else(|| FreewiseError::UserNotFound(caller.id.clone()))?;
        let groups = self
            .storage
            .list_user_groups(&user.id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_USER"))?;

        Ok(UserWithGroups {
            id: user.id,
            username: user.username,
            role: user.role,
            default_currency: user.default_currency,
            groups,
        })
    }

    /// Creates the group with the caller as its first member, atomically.
    pub async fn create_group(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, FreewiseError> {
        let caller = session.verify()?;
        self.validate_string_input("name", name, 100)?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        if let Some(description) = description {
            self.validate_string_input("description", description, 500)?;
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.map(String::from),
            created_at: now,
        };
        let member = GroupMember {
            user_id: caller.id.clone(),
            group_id: group.id.clone(),
            joined_at: now,
        };

        let group = self
            .storage
            .create_group_with_member(group, member)
            .await
            .map_err(persistence("FAILED_TO_CREATE_GROUP"))?;
        info!(group_id = %group.id, user_id = %caller.id, "group created");
        Ok(group)
    }

    /// Group page: the group, its members and its expenses. Members only.
    /// Outsiders get `NotAMember` whether or not the group exists.
    pub async fn get_group(&self, session: &Session, group_id: &str) -> Result<GroupDetail, FreewiseError> {
        let caller = session.verify()?;
        self.require_membership(&caller.id, group_id).await?;
        let group = self
            .storage
            .get_group(group_id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_GROUP"))?
            .ok_or_else(|| FreewiseError::GroupNotFound(group_id.to_string()))?;

        let memberships = self
            .storage
            .list_group_members(group_id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_GROUP"))?;
        let expenses = self
            .storage
            .list_group_expenses(group_id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_GROUP"))?;

        // Payers may have left the group, so resolve names from the user table.
        let mut usernames: HashMap<String, String> = HashMap::new();
        for user_id in memberships
            .iter()
            .map(|m| &m.user_id)
            .chain(expenses.iter().map(|e| &e.paid_by_id))
        {
            if usernames.contains_key(user_id) {
                continue;
            }
            let username = self
                .storage
                .get_user(user_id)
                .await
                .map_err(persistence("FAILED_TO_FETCH_GROUP"))?
                .map(|u| u.username)
                .unwrap_or_default();
            usernames.insert(user_id.clone(), username);
        }

        let members = memberships
            .into_iter()
            .map(|m| MemberView {
                username: usernames.get(&m.user_id).cloned().unwrap_or_default(),
                user_id: m.user_id,
                joined_at: m.joined_at,
            })
            .collect();
        let expenses = expenses
            .into_iter()
            .map(|expense| ExpenseView {
                paid_by_username: usernames.get(&expense.paid_by_id).cloned().unwrap_or_default(),
                expense,
            })
            .collect();

        Ok(GroupDetail {
            group,
            members,
            expenses,
        })
    }

    /// Invite acceptance.
    pub async fn join_group(&self, session: &Session, group_id: &str) -> Result<GroupMember, FreewiseError> {
        let caller = session.verify()?;
        self.storage
            .get_group(group_id)
            .await
            .map_err(persistence("FAILED_TO_JOIN_GROUP"))?
            .ok_or_else(|| FreewiseError::GroupNotFound(group_id.to_string()))?;

        let existing = self
            .storage
            .get_membership(&caller.id, group_id)
            .await
            .map_err(persistence("FAILED_TO_JOIN_GROUP"))?;
        if existing.is_some() {
            return Err(FreewiseError::AlreadyMember(caller.id.clone()));
        }

        let member = GroupMember {
            user_id: caller.id.clone(),
            group_id: group_id.to_string(),
            joined_at: Utc::now(),
        };
        match self.storage.add_member(member).await {
            Ok(member) => {
                info!(group_id, user_id = %caller.id, "member joined group");
                Ok(member)
            }
            Err(StorageError::UniqueViolation(_)) => Err(FreewiseError::AlreadyMember(caller.id.clone())),
            Err(StorageError::MissingRow(_)) => Err(FreewiseError::GroupNotFound(group_id.to_string())),
            Err(e) => Err(persistence("FAILED_TO_JOIN_GROUP")(e)),
        }
    }

    /// Removes the caller from the group. The group and its expenses are
    /// deleted only when nobody is left.
    pub async fn leave_group(&self, session: &Session, group_id: &str) -> Result<LeaveOutcome, FreewiseError> {
        let caller = session.verify()?;
        self.require_membership(&caller.id, group_id).await?;

        let outcome = match self.storage.leave_group(&caller.id, group_id).await {
            Ok(outcome) => outcome,
            // Membership vanished between the check and the delete.
            Err(StorageError::MissingRow(_)) => return Err(FreewiseError::NotAMember(caller.id.clone())),
            Err(e) => return Err(persistence("FAILED_TO_LEAVE_GROUP")(e)),
        };
        match &outcome {
            LeaveOutcome::Left { remaining_members } => {
                info!(group_id, user_id = %caller.id, remaining_members, "member left group")
            }
            LeaveOutcome::GroupDeleted { expenses_removed } => {
                info!(group_id, user_id = %caller.id, expenses_removed, "last member left, group deleted")
            }
        }
        Ok(outcome)
    }
}
