use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::database::models::{Transaction, TransactionId};
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

use super::input::TransactionInput;

/// GET <prefix>/:id - a single transaction
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Transaction> {
    let record = state.store.fetch_one(&TransactionId::from(id)).await?;
    Ok(ApiResponse::success(record))
}

/// PUT <prefix>/:id - partial update; the id itself never changes
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(input) = payload?;
    let patch = input.into_patch()?;

    let record = state.store.update(&TransactionId::from(id), patch).await?;
    info!("Updated transaction {}", record.id);
    Ok(ApiResponse::success(record))
}

/// DELETE <prefix>/:id - remove a transaction, 204 with no body
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = TransactionId::from(id);
    state.store.delete(&id).await?;
    info!("Deleted transaction {}", id);
    Ok(ApiResponse::no_content())
}
