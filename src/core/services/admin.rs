use super::{FreewiseService, persistence};
use crate::auth::guard::Session;
use crate::core::errors::FreewiseError;
use crate::core::models::{
    expense::{Expense, ExpenseShare},
    group::{Group, GroupMember},
    user::UserSummary,
};
use crate::infrastructure::storage::Storage;
use serde::Serialize;
use utoipa::ToSchema;

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminOverview {
    pub users: Vec<UserSummary>,
    pub groups: Vec<Group>,
    pub memberships: Vec<GroupMember>,
    pub expenses: Vec<Expense>,
    pub expense_shares: Vec<ExpenseShare>,
}

// Full listings, unpaginated.
impl<S: Storage> FreewiseService<S> {
    pub async fn get_all_users(&self, session: &Session) -> Result<Vec<UserSummary>, FreewiseError> {
        session.verify_admin()?;
        let users = self
            .storage
            .list_users()
            .await
            .map_err(persistence("FAILED_TO_FETCH_USERS"))?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    pub async fn get_all_groups(&self, session: &Session) -> Result<Vec<Group>, FreewiseError> {
        session.verify_admin()?;
        self.storage
            .list_groups()
            .await
            .map_err(persistence("FAILED_TO_FETCH_GROUPS"))
    }

    pub async fn get_all_group_memberships(&self, session: &Session) -> Result<Vec<GroupMember>, FreewiseError> {
        session.verify_admin()?;
        self.storage
            .list_memberships()
            .await
            .map_err(persistence("FAILED_TO_FETCH_MEMBERSHIPS"))
    }

    pub async fn get_all_expenses(&self, session: &Session) -> Result<Vec<Expense>, FreewiseError> {
        session.verify_admin()?;
        self.storage
            .list_expenses()
            .await
            .map_err(persistence("FAILED_TO_FETCH_EXPENSES"))
    }

    pub async fn get_all_expense_shares(&self, session: &Session) -> Result<Vec<ExpenseShare>, FreewiseError> {
        session.verify_admin()?;
        self.storage
            .list_expense_shares()
            .await
            .map_err(persistence("FAILED_TO_FETCH_SHARES"))
    }

    pub async fn admin_overview(&self, session: &Session) -> Result<AdminOverview, FreewiseError> {
        let (users, groups, memberships, expenses, expense_shares) = futures::try_join!(
            self.get_all_users(session),
            self.get_all_groups(session),
            self.get_all_group_memberships(session),
            self.get_all_expenses(session),
            self.get_all_expense_shares(session),
        )?;
        Ok(AdminOverview {
            users,
            groups,
            memberships,
            expenses,
            expense_shares,
        })
    }
}
