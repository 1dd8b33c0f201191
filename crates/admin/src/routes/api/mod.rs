//! JSON API route handlers for admin.
//!
//! ```text
//! GET /api/dashboard/stats               - Dashboard counters
//! GET /api/dashboard/products-per-month  - This year's product chart
//! GET /api/navigation/badges             - Navigation badges
//! GET /api/products/{id}/price           - Current price of a live product
//! GET /api/orders/export?ids=1,2         - Export rows for selected orders
//! ```

pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard::stats))
        .route(
            "/dashboard/products-per-month",
            get(dashboard::products_per_month),
        )
        .route("/navigation/badges", get(dashboard::badges))
        .route("/products/{id}/price", get(products::price))
        .route("/orders/export", get(orders::export))
}
