use std::{sync::Arc, time::Duration};

use chrono::TimeDelta;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::{
    CategoryConfig, EngineError, ResultEngine, Schemas,
    auth::TokenSigner,
    notify::{LogNotifier, Notifier},
    store::RecordStore,
    validation::Schema,
    window::MonthBounds,
};

mod access;
mod alerts;
mod analytics;
mod budgets;
mod transactions;
mod users;

pub use analytics::{CategoryBreakdown, CategoryShare};
pub use transactions::{TransactionList, TransactionListFilter};
pub use users::{Registration, Session};

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
pub const DEFAULT_ALERT_RECIPIENT: &str = "alerts@pocketbook.local";
pub const DEFAULT_ALERT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug)]
pub struct Engine {
    store: RecordStore,
    categories: CategoryConfig,
    schemas: Schemas,
    notifier: Arc<dyn Notifier>,
    tokens: TokenSigner,
    month_bounds: MonthBounds,
    alert_recipient: String,
    alert_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn categories(&self) -> &CategoryConfig {
        &self.categories
    }

    /// Payload schemas built from the configured categories.
    pub fn schemas(&self) -> &Schemas {
        &self.schemas
    }

    pub fn month_bounds(&self) -> MonthBounds {
        self.month_bounds
    }
}

/// Run `schema` against the wire shape of a typed command.
fn validate_as<T: Serialize>(schema: &Schema, value: &T) -> ResultEngine<()> {
    let payload = serde_json::to_value(value)
        .map_err(|err| EngineError::Internal(format!("cannot encode payload: {err}")))?;
    schema.validate(&payload)
}

/// Add two money amounts in minor units. Overflow is a validation error.
fn add_minor(total: i64, amount: i64) -> ResultEngine<i64> {
    total
        .checked_add(amount)
        .ok_or_else(|| EngineError::Validation("amount total is out of range".to_string()))
}

fn total_minor(amounts: impl IntoIterator<Item = i64>) -> ResultEngine<i64> {
    amounts.into_iter().try_fold(0, add_minor)
}

fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    categories: CategoryConfig,
    notifier: Arc<dyn Notifier>,
    token_secret: Option<String>,
    token_ttl: TimeDelta,
    month_bounds: MonthBounds,
    alert_recipient: String,
    alert_timeout: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            categories: CategoryConfig::default(),
            notifier: Arc::new(LogNotifier),
            token_secret: None,
            token_ttl: TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            month_bounds: MonthBounds::default(),
            alert_recipient: DEFAULT_ALERT_RECIPIENT.to_string(),
            alert_timeout: Duration::from_secs(DEFAULT_ALERT_TIMEOUT_SECS),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Categories accepted by transactions and budgets. Defaults to the
    /// built-in set.
    pub fn categories(mut self, categories: CategoryConfig) -> EngineBuilder {
        self.categories = categories;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Secret used to sign credentials. Required.
    pub fn token_secret(mut self, secret: impl Into<String>) -> EngineBuilder {
        self.token_secret = Some(secret.into());
        self
    }

    pub fn token_ttl(mut self, ttl: TimeDelta) -> EngineBuilder {
        self.token_ttl = ttl;
        self
    }

    pub fn month_bounds(mut self, bounds: MonthBounds) -> EngineBuilder {
        self.month_bounds = bounds;
        self
    }

    /// Address every budget alert is sent to.
    pub fn alert_recipient(mut self, recipient: impl Into<String>) -> EngineBuilder {
        self.alert_recipient = recipient.into();
        self
    }

    /// Longest wait for one alert delivery. The transaction is already
    /// stored when delivery starts.
    pub fn alert_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.alert_timeout = timeout;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let secret = self
            .token_secret
            .ok_or_else(|| EngineError::Internal("token secret is not configured".to_string()))?;
        let tokens = TokenSigner::new(&secret, self.token_ttl)?;
        let schemas = Schemas::new(&self.categories);
        Ok(Engine {
            store: RecordStore::new(self.database),
            categories: self.categories,
            schemas,
            notifier: self.notifier,
            tokens,
            month_bounds: self.month_bounds,
            alert_recipient: self.alert_recipient,
            alert_timeout: self.alert_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_fail_instead_of_wrapping() {
        assert_eq!(total_minor([1_250, 750, 3]).unwrap(), 2_003);
        assert_eq!(total_minor(std::iter::empty()).unwrap(), 0);
        assert_eq!(
            total_minor([i64::MAX, 1]).unwrap_err(),
            EngineError::Validation("amount total is out of range".to_string())
        );
        assert!(add_minor(i64::MAX - 1, 1).is_ok());
    }
}
