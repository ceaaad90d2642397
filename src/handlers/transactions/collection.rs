use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::database::models::Transaction;
use crate::database::SelectFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

use super::input::TransactionInput;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one owner
    pub user_id: Option<String>,
}

/// GET <prefix> - all transactions, newest first
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Transaction>> {
    let filter = match query.user_id.filter(|id| !id.is_empty()) {
        Some(owner) => SelectFilter::by_owner(owner),
        None => SelectFilter::all(),
    };
    let rows = state.store.select(&filter).await?;
    Ok(ApiResponse::success(rows))
}

/// POST <prefix> - create a transaction
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(input) = payload?;
    let record = input.into_new(Utc::now())?;

    let stored = state.store.insert(record).await?;
    info!("Created transaction {} ({} {})", stored.id, stored.kind, stored.amount);
    Ok(ApiResponse::created(stored))
}
