//! Command structs for engine write operations.
//!
//! These types group parameters for transaction and budget writes, keeping
//! call sites readable and avoiding long argument lists.

use serde::Serialize;

use crate::TransactionKind;

/// Record a new transaction.
///
/// Serializes to the same shape the create payload is validated in.
#[derive(Clone, Debug, Serialize)]
pub struct NewTransaction {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount_minor: i64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount_minor,
            category: category.into(),
            description: description.into(),
            source_account: None,
            destination_account: None,
        }
    }

    #[must_use]
    pub fn source_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = Some(account.into());
        self
    }

    #[must_use]
    pub fn destination_account(mut self, account: impl Into<String>) -> Self {
        self.destination_account = Some(account.into());
        self
    }
}

/// Partial update of an existing transaction.
///
/// Only these fields can change; `created_at` and the owner are fixed.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransactionPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<String>,
}

impl TransactionPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn source_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = Some(account.into());
        self
    }

    #[must_use]
    pub fn destination_account(mut self, account: impl Into<String>) -> Self {
        self.destination_account = Some(account.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount_minor.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.source_account.is_none()
            && self.destination_account.is_none()
    }
}

/// Create a monthly budget for an expense category.
#[derive(Clone, Debug, Serialize)]
pub struct NewBudget {
    pub user_id: String,
    pub category: String,
    pub monthly_limit_minor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewBudget {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        category: impl Into<String>,
        monthly_limit_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            category: category.into(),
            monthly_limit_minor,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of an update that may legitimately do nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NoChanges,
}
