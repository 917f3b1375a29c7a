//! Transactions API endpoints

use api_types::{
    Message,
    transaction::{
        TransactionCreated, TransactionDelete, TransactionKind as ApiKind,
        TransactionListResponse, TransactionNew, TransactionPatch, TransactionQuery,
        TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::{Identity, NewTransaction, TransactionListFilter, UpdateOutcome};
use serde_json::Value;

use crate::{ServerError, decode_validated, missing_keys, server::ServerState};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

pub(crate) fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        transaction_id: tx.transaction_id,
        user_id: tx.user_id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        category: tx.category,
        description: tx.description,
        created_at: tx.created_at,
        source_account: tx.source_account,
        destination_account: tx.destination_account,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let engine = &state.engine;
    let payload: TransactionNew = decode_validated(&engine.schemas().transaction_new, payload)?;
    engine.ensure_owner(&identity, &payload.user_id)?;

    let mut cmd = NewTransaction::new(
        payload.user_id,
        engine_kind(payload.kind),
        payload.amount_minor,
        payload.category,
        payload.description,
    );
    cmd.source_account = payload.source_account;
    cmd.destination_account = payload.destination_account;

    let tx = engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            message: "Transaction added successfully".to_string(),
            transaction_id: tx.transaction_id,
            created_at: tx.created_at,
        }),
    ))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let Some(user_id) = query.user_id else {
        return Err(missing_keys(&[("user_id", false)]));
    };
    let engine = &state.engine;
    engine.ensure_owner(&identity, &user_id)?;

    let filter = TransactionListFilter {
        kind: query.kind.map(engine_kind),
        year: query.year,
        month: query.month,
    };
    let listed = engine.list_transactions(&user_id, &filter).await?;

    Ok(Json(TransactionListResponse {
        transactions: listed.transactions.into_iter().map(view).collect(),
        total_income_minor: listed.total_income_minor,
        total_expense_minor: listed.total_expense_minor,
    }))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> Result<Response, ServerError> {
    let engine = &state.engine;
    let payload: TransactionPatch = decode_validated(&engine.schemas().transaction_patch, payload)?;
    engine.ensure_owner(&identity, &payload.user_id)?;

    let patch = engine::TransactionPatch {
        kind: payload.kind.map(engine_kind),
        amount_minor: payload.amount_minor,
        category: payload.category,
        description: payload.description,
        source_account: payload.source_account,
        destination_account: payload.destination_account,
    };
    let outcome = engine
        .update_transaction(&payload.user_id, &payload.transaction_id, patch)
        .await?;

    Ok(match outcome {
        UpdateOutcome::Updated => Json(Message::new("Transaction updated successfully")).into_response(),
        UpdateOutcome::NoChanges => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionDelete>,
) -> Result<Json<Message>, ServerError> {
    let (Some(user_id), Some(transaction_id)) = (&query.user_id, &query.transaction_id) else {
        return Err(missing_keys(&[
            ("user_id", query.user_id.is_some()),
            ("transaction_id", query.transaction_id.is_some()),
        ]));
    };
    let engine = &state.engine;
    engine.ensure_owner(&identity, user_id)?;
    engine.delete_transaction(user_id, transaction_id).await?;
    Ok(Json(Message::new("Transaction deleted successfully")))
}
