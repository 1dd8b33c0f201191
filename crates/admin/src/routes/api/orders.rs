//! Order export.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use shopdesk_core::OrderId;

use crate::components::data_table::parse_ids;
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::OrderExportRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub ids: String,
}

/// Export rows for the selected live orders, oldest first.
///
/// # Errors
///
/// Returns 400 if no order IDs were given.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<Vec<OrderExportRow>>, AppError> {
    let ids: Vec<OrderId> = parse_ids(&query.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no orders selected".to_string()));
    }
    let rows = OrderRepository::new(state.pool()).export(&ids).await?;
    tracing::info!(requested = ids.len(), exported = rows.len(), "orders exported");
    Ok(Json(rows))
}
