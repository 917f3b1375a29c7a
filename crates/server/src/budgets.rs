//! Budgets API endpoints

use api_types::{
    Message,
    budget::{BudgetDelete, BudgetNew, BudgetQuery, BudgetUpdate, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{Identity, NewBudget};
use serde_json::Value;

use crate::{ServerError, decode_validated, missing_keys, server::ServerState};

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let engine = &state.engine;
    let payload: BudgetNew = decode_validated(&engine.schemas().budget_new, payload)?;
    engine.ensure_owner(&identity, &payload.user_id)?;

    let mut cmd = NewBudget::new(payload.user_id, payload.category, payload.monthly_limit_minor);
    cmd.description = payload.description;
    engine.create_budget(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new("Budget created successfully")),
    ))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let Some(user_id) = query.user_id else {
        return Err(missing_keys(&[("user_id", false)]));
    };
    let engine = &state.engine;
    engine.ensure_owner(&identity, &user_id)?;

    let budgets = engine
        .list_budgets(&user_id, query.year, query.month)
        .await?
        .into_iter()
        .map(|entry| BudgetView {
            user_id: entry.budget.user_id,
            category: entry.budget.category,
            monthly_limit_minor: entry.budget.monthly_limit_minor,
            description: entry.budget.description,
            created_at: entry.budget.created_at,
            total_spent_minor: entry.total_spent_minor,
        })
        .collect();
    Ok(Json(budgets))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<Value>,
) -> Result<Json<Message>, ServerError> {
    let engine = &state.engine;
    let payload: BudgetUpdate = decode_validated(&engine.schemas().budget_update, payload)?;
    engine.ensure_owner(&identity, &payload.user_id)?;
    engine
        .update_budget(&payload.user_id, &payload.category, payload.monthly_limit_minor)
        .await?;
    Ok(Json(Message::new("Budget updated successfully")))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetDelete>,
) -> Result<Json<Message>, ServerError> {
    let (Some(user_id), Some(category)) = (&query.user_id, &query.category) else {
        return Err(missing_keys(&[
            ("user_id", query.user_id.is_some()),
            ("category", query.category.is_some()),
        ]));
    };
    let engine = &state.engine;
    engine.ensure_owner(&identity, user_id)?;
    engine.delete_budget(user_id, category).await?;
    Ok(Json(Message::new("Budget deleted successfully")))
}
