//! Store counters, as shown on the dashboard.

use chrono::{Datelike, Utc};

use shopdesk_admin::db::stats;
use shopdesk_core::OrderStatus;

use super::{CommandError, connect};

/// Log the dashboard counters, order counts per status and the monthly
/// product breakdown for `year`.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn run(year: Option<i32>) -> Result<(), CommandError> {
    let pool = connect().await?;
    let year = year.unwrap_or_else(|| Utc::now().year());

    let counters = stats::dashboard_stats(&pool).await?;
    let badges = stats::navigation_badges(&pool).await?;

    tracing::info!("Store Statistics");
    tracing::info!("================");
    tracing::info!("Customers: {}", counters.customers);
    tracing::info!("Products: {}", counters.products);
    tracing::info!("Orders by status:");
    for status in OrderStatus::ALL {
        let count = stats::count_orders_with_status(&pool, status).await?;
        tracing::info!("  {}: {count}", status.label());
    }
    tracing::info!("Order badge: {}", badges.order_badge.as_str());

    let series = stats::products_per_month(&pool, year).await?;
    tracing::info!("Products created in {year}: {}", series.total());
    for (label, count) in series.labels().into_iter().zip(series.counts()) {
        tracing::info!("  {label}: {count}");
    }

    Ok(())
}
