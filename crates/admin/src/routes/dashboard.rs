//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use chrono::{Datelike, Utc};
use tracing::instrument;

use shopdesk_core::MonthlySeries;

use super::views::Shell;
use crate::db::stats::{self, DashboardStats};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// One bar of the products-per-month chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub label: &'static str,
    pub count: i64,
    /// Height relative to the busiest month, 0-100.
    pub percent: i64,
}

/// Bars for a series, scaled to its largest month.
#[must_use]
pub fn chart_bars(series: &MonthlySeries) -> Vec<ChartBar> {
    let counts = series.counts();
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    series
        .labels()
        .into_iter()
        .zip(counts)
        .map(|(label, count)| ChartBar {
            label,
            count,
            percent: count * 100 / peak,
        })
        .collect()
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub shell: Shell,
    pub stats: DashboardStats,
    pub year: i32,
    pub chart: Vec<ChartBar>,
    pub products_this_year: i64,
    /// Seconds between counter refreshes; 0 disables polling.
    pub refresh_secs: u64,
}

/// Dashboard: counters and this year's product chart.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = stats::dashboard_stats(state.pool()).await?;
    let series = stats::products_this_year(state.pool()).await?;

    Ok(DashboardTemplate {
        shell: Shell::load(&state, "/").await?,
        stats,
        year: Utc::now().year(),
        chart: chart_bars(&series),
        products_this_year: series.total(),
        refresh_secs: state.config().stats_refresh_secs,
    })
}

/// Create the dashboard routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_bars_scale_to_peak() {
        let series = MonthlySeries::from_month_counts([(1, 2), (3, 4)]);
        let bars = chart_bars(&series);
        assert_eq!(bars.len(), 12);
        assert_eq!(bars[0].label, "Jan");
        assert_eq!(bars[0].percent, 50);
        assert_eq!(bars[2].percent, 100);
        assert_eq!(bars[11].count, 0);
    }

    #[test]
    fn test_chart_bars_empty_year() {
        let bars = chart_bars(&MonthlySeries::default());
        assert!(bars.iter().all(|b| b.count == 0 && b.percent == 0));
    }
}
