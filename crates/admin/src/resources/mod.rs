//! Per-entity screen definitions.
//!
//! Each module describes one resource: its listing ([`DataTableConfig`]), its
//! create/edit form ([`FormSchema`]), how a record becomes a table row, detail
//! rows and edit-form values, and how a validated submission becomes the
//! repository input type.
//!
//! [`DataTableConfig`]: crate::components::DataTableConfig
//! [`FormSchema`]: crate::components::FormSchema

pub mod brands;
pub mod categories;
pub mod customers;
pub mod orders;
pub mod products;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::components::ValidationErrors;
use crate::models::SelectOption;

/// One label/value line of a detail page.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

impl DetailRow {
    #[must_use]
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A single-field error, for values that passed validation but failed typed
/// extraction.
pub(crate) fn invalid(key: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(key, format!("The {} is invalid.", key.replace('_', " ")));
    errors
}

pub(crate) fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

pub(crate) fn checkbox(value: bool) -> &'static str {
    if value { "on" } else { "" }
}

pub(crate) fn date(value: NaiveDate) -> String {
    value.format("%b %-d, %Y").to_string()
}

pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

/// Select options of an enum's `ALL` list.
pub(crate) fn enum_options<T: Copy>(
    all: &[T],
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> Vec<SelectOption> {
    all.iter()
        .map(|&v| SelectOption::new(value(v), label(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_the_field() {
        let errors = invalid("brand_id");
        assert_eq!(errors.get("brand_id"), Some("The brand id is invalid."));
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(checkbox(false), "");
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or_default();
        assert_eq!(date(day), "Jan 5, 2026");
    }
}
