use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Schema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use api_types::Message;
pub use server::{AUTH_COOKIE, ServerState, app, run, run_with_listener, spawn_with_listener};

mod analytics;
mod budgets;
mod server;
mod transactions;
mod users;

pub mod types {
    pub mod user {
        pub use api_types::user::{AuthResponse, LoginUser, RegisterUser, SessionResponse, UserView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionDelete, TransactionKind, TransactionListResponse,
            TransactionNew, TransactionPatch, TransactionQuery, TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{BudgetDelete, BudgetNew, BudgetQuery, BudgetUpdate, BudgetView};
    }

    pub mod analytics {
        pub use api_types::analytics::{AnalyticsQuery, AnalyticsResponse, CategoryShare};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Internal(reason) => {
            tracing::error!("internal error: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Message { message })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Check `payload` against `schema`, then decode it.
fn decode_validated<T: DeserializeOwned>(schema: &Schema, payload: Value) -> Result<T, ServerError> {
    schema.validate(&payload)?;
    serde_json::from_value(payload).map_err(|err| ServerError::Generic(err.to_string()))
}

/// `"a is required"`, `"a and b are required"`, for the keys that are absent.
fn missing_keys(keys: &[(&str, bool)]) -> ServerError {
    let missing: Vec<&str> = keys
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    let verb = if missing.len() > 1 { "are" } else { "is" };
    ServerError::Generic(format!("{} {verb} required", missing.join(" and ")))
}
