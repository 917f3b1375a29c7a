//! Delivery of budget alerts.
//!
//! The engine only decides *that* an alert is due; a [`Notifier`] decides
//! where it goes. Delivery errors are reported back to the caller, which
//! logs and drops them.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde::Serialize;

use crate::{EngineError, ResultEngine};

/// A spending threshold crossed by a new expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetAlert {
    pub user_id: String,
    pub recipient: String,
    pub category: String,
    pub monthly_limit_minor: i64,
    /// Month-to-date spend before the expense that raised the alert.
    pub total_spent_minor: i64,
    pub transaction_amount_minor: i64,
}

impl BudgetAlert {
    pub fn subject(&self) -> String {
        format!("Budget exceeded for {}", self.category)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    async fn notify(&self, alert: &BudgetAlert) -> ResultEngine<()>;
}

/// Writes alerts to the log and nothing else.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &BudgetAlert) -> ResultEngine<()> {
        tracing::warn!(
            user_id = %alert.user_id,
            recipient = %alert.recipient,
            category = %alert.category,
            monthly_limit_minor = alert.monthly_limit_minor,
            total_spent_minor = alert.total_spent_minor,
            transaction_amount_minor = alert.transaction_amount_minor,
            "{}",
            alert.subject()
        );
        Ok(())
    }
}

/// POSTs each alert as JSON to a fixed URL.
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// `timeout` bounds the whole request, from connect to the response.
    pub fn new(url: impl Into<String>, timeout: Duration) -> ResultEngine<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EngineError::Internal(format!("cannot build webhook client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &BudgetAlert) -> ResultEngine<()> {
        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|err| EngineError::Internal(format!("alert delivery failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Internal(format!(
                "alert webhook answered {status}"
            )));
        }
        tracing::debug!(url = %self.url, category = %alert.category, "alert delivered");
        Ok(())
    }
}

/// Keeps every alert in memory. Cloned handles share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<BudgetAlert>>>,
    failing: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails after recording the alert.
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<BudgetAlert> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, alert: &BudgetAlert) -> ResultEngine<()> {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(alert.clone()),
            Err(poisoned) => poisoned.into_inner().push(alert.clone()),
        }
        if self.failing {
            return Err(EngineError::Internal("notifier unavailable".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> BudgetAlert {
        BudgetAlert {
            user_id: "u-1".to_string(),
            recipient: "alerts@example.com".to_string(),
            category: "Food".to_string(),
            monthly_limit_minor: 20_000,
            total_spent_minor: 18_000,
            transaction_amount_minor: 3_000,
        }
    }

    #[tokio::test]
    async fn memory_notifier_shares_buffer_between_clones() {
        let notifier = MemoryNotifier::new();
        let handle = notifier.clone();
        notifier.notify(&alert()).await.unwrap();
        assert_eq!(handle.sent(), vec![alert()]);
    }

    #[tokio::test]
    async fn failing_notifier_still_records() {
        let notifier = MemoryNotifier::failing();
        assert!(notifier.notify(&alert()).await.is_err());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn webhook_gives_up_on_silent_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
            drop(socket);
        });

        let notifier =
            WebhookNotifier::new(format!("http://{addr}/alerts"), Duration::from_millis(200))
                .unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), notifier.notify(&alert()))
            .await
            .expect("request timeout applies");
        assert!(matches!(outcome, Err(EngineError::Internal(_))));
        server.abort();
    }

    #[test]
    fn subject_names_category() {
        assert_eq!(alert().subject(), "Budget exceeded for Food");
    }
}
