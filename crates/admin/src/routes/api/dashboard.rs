//! Dashboard and navigation counters.

use axum::{Json, extract::State};
use tracing::instrument;

use shopdesk_core::MonthlyChart;

use crate::db::stats::{self, DashboardStats, NavigationBadges};
use crate::error::AppError;
use crate::state::AppState;

/// Live customers, live products and pending orders.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(stats::dashboard_stats(state.pool()).await?))
}

/// `{"labels": ["Jan", ...], "data": [..12 counts]}` for the current year.
#[instrument(skip(state))]
pub async fn products_per_month(
    State(state): State<AppState>,
) -> Result<Json<MonthlyChart>, AppError> {
    let series = stats::products_this_year(state.pool()).await?;
    Ok(Json(series.into()))
}

#[instrument(skip(state))]
pub async fn badges(State(state): State<AppState>) -> Result<Json<NavigationBadges>, AppError> {
    Ok(Json(stats::navigation_badges(state.pool()).await?))
}
