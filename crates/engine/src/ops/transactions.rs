use sea_orm::ActiveValue;
use serde_json::Value;

use crate::{
    EngineError, NewTransaction, ResultEngine, Transaction, TransactionKind, TransactionPatch,
    UpdateOutcome, records,
    transactions::new_transaction_id,
    window::MonthWindow,
};

use super::{Engine, total_minor, validate_as};

/// Filters for listing transactions.
///
/// The month window only applies when both `year` and `month` are set.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub kind: Option<TransactionKind>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Listed transactions with totals computed over exactly that set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
}

impl TransactionList {
    fn from_transactions(transactions: Vec<Transaction>) -> ResultEngine<Self> {
        let sum_of = |kind: TransactionKind| {
            total_minor(
                transactions
                    .iter()
                    .filter(|tx| tx.kind == kind)
                    .map(|tx| tx.amount_minor),
            )
        };
        let total_income_minor = sum_of(TransactionKind::Income)?;
        let total_expense_minor = sum_of(TransactionKind::Expense)?;
        Ok(Self {
            transactions,
            total_income_minor,
            total_expense_minor,
        })
    }
}

impl Engine {
    /// Record a transaction for an existing user.
    ///
    /// Expenses are checked against the category budget before the write and
    /// any alert is delivered after it. Neither step can fail the write.
    pub async fn create_transaction(&self, cmd: NewTransaction) -> ResultEngine<Transaction> {
        validate_as(&self.schemas.transaction_new, &cmd)?;
        self.validate_user(&cmd.user_id).await?;

        let now = records::now_millis();
        let alert = if cmd.kind == TransactionKind::Expense {
            self.pending_alert(&cmd.user_id, &cmd.category, cmd.amount_minor, now)
                .await
        } else {
            None
        };

        let tx = Transaction {
            transaction_id: new_transaction_id(),
            user_id: cmd.user_id,
            kind: cmd.kind,
            amount_minor: cmd.amount_minor,
            category: cmd.category,
            description: cmd.description,
            source_account: cmd.source_account,
            destination_account: cmd.destination_account,
            created_at: now,
        };
        self.store.put(records::ActiveModel::from(&tx)).await?;
        tracing::debug!(
            user_id = %tx.user_id,
            transaction_id = %tx.transaction_id,
            kind = tx.kind.as_str(),
            "transaction recorded"
        );

        if let Some(alert) = alert {
            self.deliver_alert(&alert).await;
        }
        Ok(tx)
    }

    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<TransactionList> {
        self.validate_user(user_id).await?;
        let window = MonthWindow::from_query(filter.year, filter.month, self.month_bounds)?;
        let transactions = self
            .transactions_in(user_id, window.as_ref())
            .await?
            .into_iter()
            .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
            .collect();
        TransactionList::from_transactions(transactions)
    }

    /// Apply `patch` to an existing transaction.
    ///
    /// An empty patch touches nothing and reports [`UpdateOutcome::NoChanges`].
    pub async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<UpdateOutcome> {
        let mut payload = serde_json::to_value(&patch)
            .map_err(|err| EngineError::Internal(format!("cannot encode payload: {err}")))?;
        if let Value::Object(fields) = &mut payload {
            fields.insert("user_id".to_string(), Value::from(user_id));
            fields.insert("transaction_id".to_string(), Value::from(transaction_id));
        }
        self.schemas.transaction_patch.validate(&payload)?;
        self.validate_user(user_id).await?;

        if patch.is_empty() {
            return Ok(UpdateOutcome::NoChanges);
        }

        let changes = records::ActiveModel {
            kind: set_some(patch.kind.map(|kind| kind.as_str().to_string())),
            amount_minor: set_some(patch.amount_minor),
            category: set_some(patch.category),
            description: set_some(patch.description),
            source_account: set_some(patch.source_account),
            destination_account: set_some(patch.destination_account),
            ..Default::default()
        };
        self.store
            .update_if_exists(
                &records::user_pk(user_id),
                &records::transaction_sk(transaction_id),
                changes,
                "transaction",
            )
            .await?;
        Ok(UpdateOutcome::Updated)
    }

    /// Delete a transaction. Deleting one that does not exist succeeds.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> ResultEngine<()> {
        self.validate_user(user_id).await?;
        self.store
            .delete(
                &records::user_pk(user_id),
                &records::transaction_sk(transaction_id),
            )
            .await
    }

    /// Transactions of `user_id` in `window`, oldest first. Budgets sharing
    /// the index are skipped.
    pub(super) async fn transactions_in(
        &self,
        user_id: &str,
        window: Option<&MonthWindow>,
    ) -> ResultEngine<Vec<Transaction>> {
        self.store
            .query_by_user(user_id, window)
            .await?
            .into_iter()
            .filter(records::Model::is_transaction)
            .map(Transaction::try_from)
            .collect()
    }
}

fn set_some<T>(value: Option<T>) -> ActiveValue<Option<T>>
where
    Option<T>: Into<sea_orm::Value>,
{
    match value {
        Some(value) => ActiveValue::Set(Some(value)),
        None => ActiveValue::NotSet,
    }
}
