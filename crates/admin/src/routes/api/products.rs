//! Product price lookup for the order form.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use shopdesk_core::{Price, ProductId};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::state::AppState;

/// The price a new order line would capture.
#[derive(Debug, Serialize)]
pub struct PriceSnapshot {
    pub product_id: ProductId,
    pub price: Price,
}

/// Current price of a live product.
///
/// # Errors
///
/// Returns 404 if the product does not exist or is trashed.
#[instrument(skip(state))]
pub async fn price(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<PriceSnapshot>, AppError> {
    let price = ProductRepository::new(state.pool())
        .price(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(PriceSnapshot {
        product_id: id,
        price,
    }))
}
