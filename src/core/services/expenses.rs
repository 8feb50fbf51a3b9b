use super::{FreewiseService, persistence, validate_currency};
use crate::auth::guard::Session;
use crate::core::errors::FreewiseError;
use crate::core::models::expense::{Expense, ExpenseUpdate, NewExpense};
use crate::infrastructure::storage::{Storage, StorageError};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

impl<S: Storage> FreewiseService<S> {
    /// Records an expense paid by the caller. The caller must belong to the group.
    pub async fn create_expense(&self, session: &Session, input: NewExpense) -> Result<Expense, FreewiseError> {
        let caller = session.verify()?;
        self.require_membership(&caller.id, &input.group_id).await?;
        self.validate_string_input("description", &input.description, 200)?;
        self.validate_amount_input("amount", input.amount)?;
        let currency = validate_currency(&input.currency)?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            group_id: input.group_id,
            description: input.description.trim().to_string(),
            amount: input.amount,
            currency,
            date: input.date.unwrap_or(now),
            paid_by_id: caller.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let expense = match self.storage.create_expense(expense).await {
            Ok(expense) => expense,
            Err(StorageError::MissingRow(_)) => return Err(FreewiseError::NotAMember(caller.id.clone())),
            Err(e) => return Err(persistence("FAILED_TO_CREATE_EXPENSE")(e)),
        };
        info!(expense_id = %expense.id, group_id = %expense.group_id, "expense created");
        Ok(expense)
    }

    /// Changes description, amount and currency. Shares are not recomputed.
    pub async fn update_expense(
        &self,
        session: &Session,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<Expense, FreewiseError> {
        let caller = session.verify()?;
        let mut expense = self.owned_expense(&caller.id, expense_id).await?;
        self.validate_string_input("description", &update.description, 200)?;
        self.validate_amount_input("amount", update.amount)?;
        let currency = validate_currency(&update.currency)?;

        expense.description = update.description.trim().to_string();
        expense.amount = update.amount;
        expense.currency = currency;
        expense.updated_at = Utc::now();

        let expense = match self.storage.update_expense(expense).await {
            Ok(expense) => expense,
            Err(StorageError::MissingRow(_)) => return Err(FreewiseError::ExpenseNotFound(expense_id.to_string())),
            Err(e) => return Err(persistence("FAILED_TO_UPDATE_EXPENSE")(e)),
        };
        info!(expense_id, "expense updated");
        Ok(expense)
    }

    /// Deletes the expense and its shares in one step. Payer only.
    pub async fn delete_expense(&self, session: &Session, expense_id: &str) -> Result<Expense, FreewiseError> {
        let caller = session.verify()?;
        let expense = self.owned_expense(&caller.id, expense_id).await?;

        let shares_removed = match self.storage.delete_expense(expense_id).await {
            Ok(count) => count,
            Err(StorageError::MissingRow(_)) => return Err(FreewiseError::ExpenseNotFound(expense_id.to_string())),
            Err(e) => return Err(persistence("FAILED_TO_DELETE_EXPENSE")(e)),
        };
        info!(expense_id, shares_removed, "expense deleted");
        Ok(expense)
    }

    async fn owned_expense(&self, user_id: &str, expense_id: &str) -> Result<Expense, FreewiseError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await
            .map_err(persistence("FAILED_TO_FETCH_EXPENSE"))?
            .ok_or_else(|| FreewiseError::ExpenseNotFound(expense_id.to_string()))?;
        if expense.paid_by_id != user_id {
            return Err(FreewiseError::NotOwner(user_id.to_string()));
        }
        Ok(expense)
    }
}
