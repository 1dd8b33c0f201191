//! Dense per-month series for dashboard charts.

use serde::{Deserialize, Serialize};

/// Short month names, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Twelve counts, one per calendar month, with missing months filled as zero.
///
/// ```
/// use shopdesk_core::MonthlySeries;
///
/// let series = MonthlySeries::from_month_counts([(1, 5), (3, 1)]);
/// assert_eq!(series.counts()[..4], [5, 0, 1, 0]);
/// assert_eq!(series.total(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlySeries {
    counts: [i64; 12],
}

impl MonthlySeries {
    /// Build from `(month, count)` pairs where `month` is 1-12.
    ///
    /// Pairs for the same month are summed; months outside 1-12 are ignored.
    #[must_use]
    pub fn from_month_counts(pairs: impl IntoIterator<Item = (u32, i64)>) -> Self {
        let mut counts = [0_i64; 12];
        for (month, count) in pairs {
            if let Some(slot) = month
                .checked_sub(1)
                .and_then(|idx| counts.get_mut(idx as usize))
            {
                *slot += count;
            }
        }
        Self { counts }
    }

    /// Month labels aligned with [`Self::counts`].
    #[must_use]
    pub const fn labels(&self) -> [&'static str; 12] {
        MONTH_LABELS
    }

    /// Per-month counts, January first.
    #[must_use]
    pub const fn counts(&self) -> [i64; 12] {
        self.counts
    }

    /// Sum across all months.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }
}

/// Chart payload: `{"labels": [...], "data": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyChart {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

impl From<MonthlySeries> for MonthlyChart {
    fn from(series: MonthlySeries) -> Self {
        Self {
            labels: MONTH_LABELS.iter().map(|l| (*l).to_owned()).collect(),
            data: series.counts.to_vec(),
        }
    }
}

impl Serialize for MonthlySeries {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MonthlyChart::from(*self).serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_year_is_twelve_zeros() {
        let series = MonthlySeries::from_month_counts([]);
        assert_eq!(series.counts(), [0; 12]);
        assert_eq!(series.labels().len(), 12);
        assert_eq!(series.total(), 0);
    }

    #[test]
    fn test_sparse_months_fill_densely() {
        // Rows as a GROUP BY month query returns them: only months with data.
        let series = MonthlySeries::from_month_counts([(1, 5), (3, 1), (12, 2)]);
        let mut expected = [0; 12];
        expected[0] = 5;
        expected[2] = 1;
        expected[11] = 2;
        assert_eq!(series.counts(), expected);
        assert_eq!(series.labels()[2], "Mar");
    }

    #[test]
    fn test_out_of_range_months_ignored() {
        let series = MonthlySeries::from_month_counts([(0, 4), (13, 2), (12, 7), (12, 1)]);
        assert_eq!(series.total(), 8);
        assert_eq!(series.counts()[11], 8);
    }

    #[test]
    fn test_serializes_as_chart_payload() {
        let series = MonthlySeries::from_month_counts([(2, 3)]);
        let json = serde_json::to_value(series).unwrap();
        assert_eq!(json["labels"][0], "Jan");
        assert_eq!(json["labels"][11], "Dec");
        assert_eq!(json["data"][1], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 12);
    }
}
