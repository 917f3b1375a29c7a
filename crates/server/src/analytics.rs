use api_types::analytics::{AnalyticsQuery, AnalyticsResponse, CategoryShare};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{Identity, TransactionKind};

use crate::{ServerError, missing_keys, server::ServerState, transactions::engine_kind};

/// Per-category breakdown of one transaction type, expenses by default.
pub async fn get(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ServerError> {
    let Some(user_id) = query.user_id else {
        return Err(missing_keys(&[("user_id", false)]));
    };
    let engine = &state.engine;
    engine.ensure_owner(&identity, &user_id)?;

    let kind = query.kind.map_or(TransactionKind::Expense, engine_kind);
    let breakdown = engine
        .category_breakdown(&user_id, kind, query.year, query.month)
        .await?;

    Ok(Json(AnalyticsResponse {
        categories: breakdown
            .categories
            .into_iter()
            .map(|share| CategoryShare {
                name: share.name,
                amount_minor: share.amount_minor,
                percentage: share.percentage,
                color: share.color,
            })
            .collect(),
        total_minor: breakdown.total_minor,
    }))
}
