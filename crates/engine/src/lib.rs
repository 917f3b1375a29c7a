//! Pocketbook engine: users, transactions, monthly budgets and the alerts
//! raised when an expense pushes a category over its budget.
//!
//! Everything is stored in a single `records` table keyed by
//! `(pk, sk)`: profiles, transactions and budgets share a user partition.

pub use auth::{AccessPolicy, Effect, Identity};
pub use budgets::{Budget, BudgetWithSpend};
pub use categories::{Category, CategoryConfig, FALLBACK_COLOR};
pub use commands::{NewBudget, NewTransaction, TransactionPatch, UpdateOutcome};
pub use error::EngineError;
pub use ops::{
    CategoryBreakdown, CategoryShare, DEFAULT_ALERT_RECIPIENT, DEFAULT_ALERT_TIMEOUT_SECS,
    DEFAULT_TOKEN_TTL_MINUTES, Engine, EngineBuilder, Registration, Session, TransactionList, TransactionListFilter,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::{User, UserProfile};
pub use validation::{MAX_AMOUNT_MINOR, Schema, Schemas};
pub use window::{MonthBounds, MonthWindow};

pub mod auth;
mod budgets;
mod categories;
mod commands;
mod error;
pub mod notify;
mod ops;
mod records;
mod store;
mod transactions;
mod users;
mod validation;
mod window;

type ResultEngine<T> = Result<T, EngineError>;
