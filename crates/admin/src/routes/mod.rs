//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database reachable)
//!
//! # Dashboard
//! GET  /                       - Counters and products-per-month chart
//!
//! # Resources (brands, categories, products, customers, orders)
//! GET  /{resource}             - Listing (search, filters, sort, page, trash)
//! GET  /{resource}/new         - Create form
//! POST /{resource}             - Create
//! GET  /{resource}/{id}        - Detail
//! GET  /{resource}/{id}/edit   - Edit form
//! POST /{resource}/{id}        - Update
//! POST /{resource}/{id}/delete - Soft delete
//! POST /{resource}/{id}/restore - Restore
//! POST /{resource}/bulk-delete - Soft delete `ids=1,2,3`
//! GET  /brands/{id}/products/new - Product form for a brand
//!
//! # API
//! /api/...                     - See [`api`]
//!
//! # Files
//! /static                      - Admin assets
//! /uploads                     - Product images (`ADMIN_UPLOAD_DIR`)
//! ```
//!
//! Writes redirect with 303 on success. A form that fails validation is
//! rendered again with HTTP 422 and the errors inline.

pub mod api;
pub mod brands;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod views;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Directory of the admin's own CSS and JS.
pub const STATIC_DIR: &str = "crates/admin/static";

/// All page and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .nest("/brands", brands::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
        .nest("/api", api::router())
}

/// The complete application: health checks, routes, file serving and
/// request tracing.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config().upload_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/uploads", uploads)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;

    /// State over a pool that can never connect.
    fn unreachable_state() -> AppState {
        let url = "postgres://shopdesk@127.0.0.1:1/shopdesk";
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy(url)
            .unwrap();
        let config = AdminConfig {
            database_url: SecretString::from(url),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: url::Url::parse("http://127.0.0.1:3001").unwrap(),
            upload_dir: PathBuf::from("storage/uploads"),
            stats_refresh_secs: 15,
            page_size: 25,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        };
        AppState::new(config, pool)
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app(unreachable_state())
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_is_ok_without_database() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        assert_eq!(status_of("/health/ready").await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_database_failure_is_a_generic_500() {
        assert_eq!(
            status_of("/api/dashboard/stats").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        assert_eq!(status_of("/nowhere").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_without_ids_is_bad_request() {
        assert_eq!(status_of("/api/orders/export").await, StatusCode::BAD_REQUEST);
    }
}
