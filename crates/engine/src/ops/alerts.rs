use chrono::{DateTime, Utc};

use crate::{ResultEngine, notify::BudgetAlert, window::MonthWindow};

use super::{Engine, add_minor, total_minor};

impl Engine {
    /// Decide whether a pending expense pushes its category over budget.
    ///
    /// The month-to-date total sums every transaction of the category, as the
    /// budget listing does, and excludes the pending expense, so the trigger
    /// is `total + amount > limit`. Every qualifying expense yields an alert,
    /// not only the first one to cross the limit.
    pub async fn check_budget(
        &self,
        user_id: &str,
        category: &str,
        amount_minor: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<BudgetAlert>> {
        let Some(budget) = self.find_budget(user_id, category).await? else {
            tracing::debug!(user_id, category, "no budget for category");
            return Ok(None);
        };

        let window = MonthWindow::containing(now, self.month_bounds)?;
        let total_spent_minor = total_minor(
            self.transactions_in(user_id, Some(&window))
                .await?
                .iter()
                .filter(|tx| tx.category == category)
                .map(|tx| tx.amount_minor),
        )?;

        if add_minor(total_spent_minor, amount_minor)? <= budget.monthly_limit_minor {
            return Ok(None);
        }

        Ok(Some(BudgetAlert {
            user_id: user_id.to_string(),
            recipient: self.alert_recipient.clone(),
            category: category.to_string(),
            monthly_limit_minor: budget.monthly_limit_minor,
            total_spent_minor,
            transaction_amount_minor: amount_minor,
        }))
    }

    /// Run the budget check for a pending expense. A failed check is logged
    /// and treated as no alert.
    pub(super) async fn pending_alert(
        &self,
        user_id: &str,
        category: &str,
        amount_minor: i64,
        now: DateTime<Utc>,
    ) -> Option<BudgetAlert> {
        match self.check_budget(user_id, category, amount_minor, now).await {
            Ok(alert) => alert,
            Err(err) => {
                tracing::error!(user_id, category, "budget check failed: {err}");
                None
            }
        }
    }

    /// Hand `alert` to the notifier, waiting at most the configured alert
    /// timeout. Failures are logged and dropped.
    pub(super) async fn deliver_alert(&self, alert: &BudgetAlert) {
        let user_id = alert.user_id.as_str();
        let category = alert.category.as_str();
        tracing::info!(
            user_id,
            category,
            monthly_limit_minor = alert.monthly_limit_minor,
            total_spent_minor = alert.total_spent_minor,
            "budget exceeded"
        );
        match tokio::time::timeout(self.alert_timeout, self.notifier.notify(alert)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(user_id, category, "budget alert delivery failed: {err}");
            }
            Err(_) => {
                tracing::error!(
                    user_id,
                    category,
                    timeout_ms = self.alert_timeout.as_millis() as u64,
                    "budget alert delivery timed out"
                );
            }
        }
    }
}
