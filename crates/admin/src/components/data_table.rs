//! Data table component types.
//!
//! These types describe a listing screen: its columns, filters and bulk
//! actions, plus the query parameters a listing request carries. Rows are
//! rendered generically from [`TableRow`] cells.

use std::collections::HashMap;

use serde::Serialize;

use crate::components::form::OptionView;
use crate::db::{PageRequest, Paged, Scope, Sort, SortDirection, SortKey};

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Key sent as `?sort=` when the column is sortable.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
    /// Yes / no / any.
    Ternary,
}

/// Filter definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Filter parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filter type.
    pub filter_type: FilterType,
    /// Placeholder text (for text inputs).
    pub placeholder: Option<String>,
    /// Available options (for select and ternary filters).
    pub options: Vec<FilterOption>,
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: Some(placeholder.to_string()),
            options: vec![],
        }
    }

    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: None,
            options,
        }
    }

    /// Create a ternary filter; the empty value means "any".
    #[must_use]
    pub fn ternary(key: &str, label: &str, true_label: &str, false_label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Ternary,
            placeholder: None,
            options: vec![
                FilterOption::new("true", true_label),
                FilterOption::new("false", false_label),
            ],
        }
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAction {
    /// Path segment the selected IDs are posted to, e.g. `bulk-delete`.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Whether this is a destructive action.
    pub destructive: bool,
}

impl BulkAction {
    /// Create a new bulk action.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            destructive: false,
        }
    }

    /// Mark this action as destructive.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    /// The soft-delete bulk action every listing carries.
    #[must_use]
    pub fn delete() -> Self {
        Self::new("bulk-delete", "Delete selected").destructive()
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier; also the URL prefix (`/brands`).
    pub table_id: String,
    /// Page heading.
    pub title: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Bulk action definitions.
    pub bulk_actions: Vec<BulkAction>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Whether to show bulk action bar.
    pub has_bulk_actions: bool,
    /// Whether to show filter panel.
    pub has_filters: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, title: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            title: title.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            search_placeholder: "Search...".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            has_bulk_actions: false,
            has_filters: false,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.has_filters = true;
        self.filters.push(filter);
        self
    }

    /// Add a bulk action.
    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.has_bulk_actions = true;
        self.bulk_actions.push(action);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Base path of the resource, e.g. `/brands`.
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("/{}", self.table_id)
    }

    /// Whether `key` names a sortable column.
    #[must_use]
    pub fn is_sortable(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.sortable && c.key == key)
    }
}

/// One rendered table row.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub id: i64,
    /// Display text per column, aligned with [`DataTableConfig::columns`].
    pub cells: Vec<String>,
    pub trashed: bool,
}

impl TableRow {
    #[must_use]
    pub const fn new(id: i64, cells: Vec<String>, trashed: bool) -> Self {
        Self { id, cells, trashed }
    }
}

/// Query parameters of a listing request.
///
/// Reserved keys are `search`, `sort`, `dir`, `page` and `trashed`; every
/// other key is treated as a filter value.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    params: HashMap<String, String>,
}

impl ListParams {
    /// Wrap raw query parameters. Empty values are dropped.
    #[must_use]
    pub fn new(params: HashMap<String, String>) -> Self {
        let params = params
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { params }
    }

    /// Raw value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Search text, if any.
    #[must_use]
    pub fn search(&self) -> Option<String> {
        self.get("search").map(ToString::to_string)
    }

    /// Ternary filter value: `Some(true)`, `Some(false)` or `None` for any.
    #[must_use]
    pub fn ternary(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some("true" | "1") => Some(true),
            Some("false" | "0") => Some(false),
            _ => None,
        }
    }

    /// Parse a filter value, ignoring values that do not parse.
    #[must_use]
    pub fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Live rows or the trash.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::from_param(self.get("trashed"))
    }

    /// Requested sort, falling back to the key's default.
    #[must_use]
    pub fn sort<K: SortKey>(&self) -> Sort<K> {
        Sort::from_params(self.get("sort"), self.get("dir"))
    }

    /// Requested page.
    #[must_use]
    pub fn page(&self, per_page: i64) -> PageRequest {
        PageRequest::new(self.parsed("page"), per_page)
    }

    /// Query string with `key` replaced by `value` (or removed when `None`).
    ///
    /// Changing anything other than the page resets to the first page.
    #[must_use]
    pub fn query_with(&self, key: &str, value: Option<&str>) -> String {
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .filter(|(k, _)| k.as_str() != key && (key == "page" || k.as_str() != "page"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(value) = value {
            pairs.push((key, value));
        }
        pairs.sort_unstable();

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(pairs);
        let query = serializer.finish();
        if query.is_empty() {
            String::new()
        } else {
            format!("?{query}")
        }
    }
}

/// A sortable header link.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    pub label: String,
    /// Link toggling the sort on this column; `None` if not sortable.
    pub href: Option<String>,
    /// `asc`/`desc` when the listing is currently sorted by this column.
    pub active: Option<&'static str>,
}

impl HeaderView {
    /// Sort indicator for the header, empty when not sorted by it.
    #[must_use]
    pub fn arrow(&self) -> &'static str {
        match self.active {
            Some("asc") => "\u{2191}",
            Some(_) => "\u{2193}",
            None => "",
        }
    }
}

/// A filter control with its current value applied.
#[derive(Debug, Clone, Serialize)]
pub struct FilterView {
    pub key: String,
    pub label: String,
    pub is_text: bool,
    pub placeholder: String,
    pub value: String,
    pub options: Vec<OptionView>,
}

/// Everything the generic listing template renders.
#[derive(Debug, Clone)]
pub struct TableView {
    pub config: DataTableConfig,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<TableRow>,
    pub total: i64,
    pub page: i64,
    pub page_count: i64,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub search: String,
    pub filters: Vec<FilterView>,
    pub trashed: bool,
    pub trash_href: String,
}

impl TableView {
    /// Assemble the view from a page of records already converted to rows.
    #[must_use]
    pub fn build<T, K: SortKey>(
        config: DataTableConfig,
        params: &ListParams,
        paged: &Paged<T>,
        rows: Vec<TableRow>,
    ) -> Self {
        let sort: Sort<K> = params.sort();
        let base = config.base_path();

        let headers = config
            .columns
            .iter()
            .map(|column| {
                let is_active = column.sortable && column.key == sort.key.key();
                let dir = if is_active {
                    sort.direction.flipped()
                } else {
                    SortDirection::Asc
                };
                let href = column.sortable.then(|| {
                    let with_sort = ListParams {
                        params: {
                            let mut p = params.params.clone();
                            p.insert("sort".to_string(), column.key.clone());
                            p
                        },
                    };
                    format!("{base}{}", with_sort.query_with("dir", Some(dir.as_param())))
                });
                HeaderView {
                    label: column.label.clone(),
                    href,
                    active: is_active.then(|| sort.direction.as_param()),
                }
            })
            .collect();

        let filters = config
            .filters
            .iter()
            .map(|f| {
                let value = params.get(&f.key).unwrap_or_default().to_string();
                FilterView {
                    key: f.key.clone(),
                    label: f.label.clone(),
                    is_text: f.filter_type == FilterType::Text,
                    placeholder: f.placeholder.clone().unwrap_or_default(),
                    options: f
                        .options
                        .iter()
                        .map(|o| OptionView {
                            selected: o.value == value,
                            value: o.value.clone(),
                            label: o.label.clone(),
                        })
                        .collect(),
                    value,
                }
            })
            .collect();

        let trashed = params.scope() == Scope::Trashed;
        let trash_href = format!(
            "{base}{}",
            params.query_with("trashed", (!trashed).then_some("only"))
        );

        let prev_href = paged.has_prev().then(|| {
            let prev = (paged.page - 1).to_string();
            format!("{base}{}", params.query_with("page", Some(&prev)))
        });
        let next_href = paged.has_next().then(|| {
            let next = (paged.page + 1).to_string();
            format!("{base}{}", params.query_with("page", Some(&next)))
        });

        Self {
            headers,
            rows,
            total: paged.total,
            page: paged.page,
            page_count: paged.page_count(),
            prev_href,
            next_href,
            search: params.search().unwrap_or_default(),
            filters,
            trashed,
            trash_href,
            config,
        }
    }
}

/// Parse a comma-separated ID list such as `?ids=1,2,3`. Invalid entries are
/// skipped.
#[must_use]
pub fn parse_ids<T: std::str::FromStr>(ids: &str) -> Vec<T> {
    ids.split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrandSort;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        ListParams::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_ternary_filter_values() {
        let p = params(&[("is_visible", "true"), ("is_featured", "false"), ("x", "maybe")]);
        assert_eq!(p.ternary("is_visible"), Some(true));
        assert_eq!(p.ternary("is_featured"), Some(false));
        assert_eq!(p.ternary("x"), None);
        assert_eq!(p.ternary("missing"), None);
    }

    #[test]
    fn test_empty_params_are_dropped() {
        let p = params(&[("search", "  "), ("brand_id", "")]);
        assert_eq!(p.search(), None);
        assert_eq!(p.get("brand_id"), None);
    }

    #[test]
    fn test_query_with_resets_page() {
        let p = params(&[("search", "red shoes"), ("page", "3")]);
        assert_eq!(p.query_with("sort", Some("name")), "?search=red+shoes&sort=name");
        assert_eq!(p.query_with("page", Some("4")), "?page=4&search=red+shoes");
        assert_eq!(params(&[]).query_with("trashed", None), "");
    }

    #[test]
    fn test_page_from_query_string() {
        assert_eq!(params(&[("page", "3")]).page(25).offset(), 50);
        assert_eq!(params(&[("page", "-7")]).page(25).page, 1);
        let huge = params(&[("page", "9223372036854775807")]).page(25);
        assert_eq!(huge.offset(), i64::MAX);
    }

    #[test]
    fn test_parse_ids_skips_garbage() {
        let ids: Vec<i64> = parse_ids("1, 2,x,,40");
        assert_eq!(ids, vec![1, 2, 40]);
    }

    #[test]
    fn test_table_view_headers_flip_active_sort() {
        let config = DataTableConfig::new("brands", "Brands")
            .column(TableColumn::sortable("name", "Name"))
            .column(TableColumn::new("color", "Color"));
        let p = params(&[("sort", "name"), ("dir", "asc")]);
        let paged: Paged<()> = Paged {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 25,
        };

        let view = TableView::build::<(), BrandSort>(config, &p, &paged, vec![]);

        assert_eq!(view.headers[0].active, Some("asc"));
        assert_eq!(
            view.headers[0].href.as_deref(),
            Some("/brands?dir=desc&sort=name")
        );
        assert!(view.headers[1].href.is_none());
        assert_eq!(view.trash_href, "/brands?dir=asc&sort=name&trashed=only");
        assert!(view.prev_href.is_none());
        assert_eq!(view.headers[0].arrow(), "\u{2191}");
        assert_eq!(view.headers[1].arrow(), "");
    }

    #[test]
    fn test_table_view_filters_carry_current_value() {
        let config = DataTableConfig::new("products", "Products")
            .filter(TableFilter::ternary("is_visible", "Visibility", "Visible", "Hidden"))
            .filter(TableFilter::text("sku", "SKU", "Any SKU"));
        let p = params(&[("is_visible", "false")]);
        let paged: Paged<()> = Paged {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 25,
        };

        let view = TableView::build::<(), BrandSort>(config, &p, &paged, vec![]);

        let visibility = &view.filters[0];
        assert!(!visibility.is_text);
        let selected: Vec<_> = visibility
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["false"]);

        assert!(view.filters[1].is_text);
        assert_eq!(view.filters[1].placeholder, "Any SKU");
        assert_eq!(view.filters[1].value, "");
    }
}
