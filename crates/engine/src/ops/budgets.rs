use std::collections::HashMap;

use sea_orm::ActiveValue;
use serde_json::json;

use crate::{
    Budget, BudgetWithSpend, NewBudget, ResultEngine, records, window::MonthWindow,
};

use super::{Engine, add_minor, validate_as};

impl Engine {
    /// Create the budget of a category. A category holds at most one budget;
    /// a second create is `ExistingKey`, never an overwrite.
    pub async fn create_budget(&self, cmd: NewBudget) -> ResultEngine<Budget> {
        validate_as(&self.schemas.budget_new, &cmd)?;
        self.validate_user(&cmd.user_id).await?;

        let budget = Budget {
            user_id: cmd.user_id,
            category: cmd.category,
            monthly_limit_minor: cmd.monthly_limit_minor,
            description: cmd.description,
            created_at: records::now_millis(),
        };
        self.store
            .put_if_absent(records::ActiveModel::from(&budget), "budget")
            .await?;
        tracing::debug!(
            user_id = %budget.user_id,
            category = %budget.category,
            "budget created"
        );
        Ok(budget)
    }

    /// Every budget of the user, sorted by category, with what was spent in
    /// its category. Spend covers the requested month when both `year` and
    /// `month` are given, all time otherwise.
    pub async fn list_budgets(
        &self,
        user_id: &str,
        year: Option<i32>,
        month: Option<u32>,
    ) -> ResultEngine<Vec<BudgetWithSpend>> {
        self.validate_user(user_id).await?;
        let window = MonthWindow::from_query(year, month, self.month_bounds)?;

        let mut budgets = self
            .store
            .query_by_user(user_id, None)
            .await?
            .into_iter()
            .filter(records::Model::is_budget)
            .map(Budget::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        budgets.sort_by(|a, b| a.category.cmp(&b.category));

        let mut spent: HashMap<String, i64> = HashMap::new();
        for tx in self.transactions_in(user_id, window.as_ref()).await? {
            let total = spent.entry(tx.category).or_default();
            *total = add_minor(*total, tx.amount_minor)?;
        }

        Ok(budgets
            .into_iter()
            .map(|budget| BudgetWithSpend {
                total_spent_minor: spent.get(&budget.category).copied().unwrap_or(0),
                budget,
            })
            .collect())
    }

    /// Replace the monthly limit of an existing budget.
    pub async fn update_budget(
        &self,
        user_id: &str,
        category: &str,
        monthly_limit_minor: i64,
    ) -> ResultEngine<()> {
        let payload = json!({
            "user_id": user_id,
            "category": category,
            "monthly_limit_minor": monthly_limit_minor,
        });
        self.schemas.budget_update.validate(&payload)?;
        self.validate_user(user_id).await?;

        let changes = records::ActiveModel {
            monthly_limit_minor: ActiveValue::Set(Some(monthly_limit_minor)),
            ..Default::default()
        };
        self.store
            .update_if_exists(
                &records::user_pk(user_id),
                &records::budget_sk(category),
                changes,
                "budget",
            )
            .await
    }

    /// Delete a budget. Deleting one that does not exist succeeds.
    pub async fn delete_budget(&self, user_id: &str, category: &str) -> ResultEngine<()> {
        self.validate_user(user_id).await?;
        self.store
            .delete(&records::user_pk(user_id), &records::budget_sk(category))
            .await
    }

    pub(super) async fn find_budget(
        &self,
        user_id: &str,
        category: &str,
    ) -> ResultEngine<Option<Budget>> {
        self.store
            .get(&records::user_pk(user_id), &records::budget_sk(category))
            .await?
            .map(Budget::try_from)
            .transpose()
    }
}
