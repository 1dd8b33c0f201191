//! Dashboard counters, the monthly product chart and navigation badges.
//!
//! Every value is recomputed per call; nothing here is cached.

use chrono::{Datelike, Utc};
use serde::Serialize;
use sqlx::PgPool;

use shopdesk_core::{BadgeStyle, MonthlySeries, OrderStatus};

use super::RepositoryError;

/// Counters shown on the dashboard stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub customers: i64,
    pub products: i64,
    pub pending_orders: i64,
}

/// Badges rendered next to the navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationBadges {
    pub processing_orders: i64,
    pub order_badge: BadgeStyle,
    pub products: i64,
}

/// Live customers, live products and live pending orders.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, RepositoryError> {
    let (customers, products, pending_orders): (i64, i64, i64) = sqlx::query_as(
        r"
        SELECT
            (SELECT COUNT(*) FROM shop.customer WHERE deleted_at IS NULL),
            (SELECT COUNT(*) FROM shop.product WHERE deleted_at IS NULL),
            (SELECT COUNT(*) FROM shop.orders WHERE deleted_at IS NULL AND status = $1)
        ",
    )
    .bind(OrderStatus::Pending)
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        customers,
        products,
        pending_orders,
    })
}

/// Live orders with the given status.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_orders_with_status(
    pool: &PgPool,
    status: OrderStatus,
) -> Result<i64, RepositoryError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shop.orders WHERE deleted_at IS NULL AND status = $1",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Live products created in each month of `year` (UTC), densely filled.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn products_per_month(pool: &PgPool, year: i32) -> Result<MonthlySeries, RepositoryError> {
    let rows: Vec<(i32, i64)> = sqlx::query_as(
        r"
        SELECT EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int AS month, COUNT(*)
        FROM shop.product
        WHERE deleted_at IS NULL
          AND EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int = $1
        GROUP BY month
        ",
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(MonthlySeries::from_month_counts(rows.into_iter().filter_map(
        |(month, count)| u32::try_from(month).ok().map(|month| (month, count)),
    )))
}

/// [`products_per_month`] for the current UTC year.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn products_this_year(pool: &PgPool) -> Result<MonthlySeries, RepositoryError> {
    products_per_month(pool, Utc::now().year()).await
}

/// Processing-order badge and live product count.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn navigation_badges(pool: &PgPool) -> Result<NavigationBadges, RepositoryError> {
    let (processing_orders, products): (i64, i64) = sqlx::query_as(
        r"
        SELECT
            (SELECT COUNT(*) FROM shop.orders WHERE deleted_at IS NULL AND status = $1),
            (SELECT COUNT(*) FROM shop.product WHERE deleted_at IS NULL)
        ",
    )
    .bind(OrderStatus::Processing)
    .fetch_one(pool)
    .await?;

    Ok(NavigationBadges {
        processing_orders,
        order_badge: BadgeStyle::for_processing_orders(processing_orders),
        products,
    })
}
