//! Page shell and the generic resource templates.
//!
//! Every resource renders through the same three templates: a listing, a
//! create/edit form and a detail page. Handlers only fill in the pieces.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use shopdesk_core::BadgeStyle;

use crate::components::form::OptionView;
use crate::components::{FieldView, FormInput, FormSchema, TableView, ValidationErrors};
use crate::db::stats::{self, NavigationBadges};
use crate::error::AppError;
use crate::filters;
use crate::models::{OrderItem, ProductOption};
use crate::resources::DetailRow;
use crate::resources::orders::ItemRowView;
use crate::state::AppState;

/// Navigation entries, in menu order.
pub const NAV: [(&str, &str); 6] = [
    ("/", "Dashboard"),
    ("/brands", "Brands"),
    ("/categories", "Categories"),
    ("/products", "Products"),
    ("/customers", "Customers"),
    ("/orders", "Orders"),
];

/// Layout data shared by every page.
#[derive(Debug, Clone)]
pub struct Shell {
    pub current_path: &'static str,
    pub badges: NavigationBadges,
}

impl Shell {
    /// Load the navigation badges for this request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the counts cannot be read.
    pub async fn load(state: &AppState, current_path: &'static str) -> Result<Self, AppError> {
        let badges = stats::navigation_badges(state.pool()).await?;
        Ok(Self {
            current_path,
            badges,
        })
    }

    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }

    /// Menu entries with their badges.
    #[must_use]
    pub fn nav(&self) -> Vec<NavLink> {
        NAV.iter()
            .map(|&(href, label)| {
                let badge = match href {
                    "/orders" => Some(self.badges.processing_orders),
                    "/products" => Some(self.badges.products),
                    _ => None,
                };
                NavLink {
                    href,
                    label,
                    active: self.is_active(href),
                    badge,
                    urgent: href == "/orders" && self.badges.order_badge == BadgeStyle::Urgent,
                }
            })
            .collect()
    }
}

/// One rendered menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
    pub badge: Option<i64>,
    pub urgent: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Resource listing.
#[derive(Template, WebTemplate)]
#[template(path = "resource/index.html")]
pub struct IndexTemplate {
    pub shell: Shell,
    pub table: TableView,
}

/// Create/edit form. `repeater` is set for orders only.
#[derive(Template, WebTemplate)]
#[template(path = "resource/form.html")]
pub struct FormTemplate {
    pub shell: Shell,
    pub title: String,
    pub action: String,
    pub cancel_href: String,
    pub fields: Vec<FieldView>,
    pub error_count: usize,
    pub repeater: Option<Repeater>,
}

impl FormTemplate {
    #[must_use]
    pub fn new(
        shell: Shell,
        title: impl Into<String>,
        action: impl Into<String>,
        cancel_href: impl Into<String>,
        schema: &FormSchema,
        input: &FormInput,
        errors: &ValidationErrors,
    ) -> Self {
        Self {
            shell,
            title: title.into(),
            action: action.into(),
            cancel_href: cancel_href.into(),
            fields: schema.fields_view(input, errors),
            error_count: errors.len(),
            repeater: None,
        }
    }

    #[must_use]
    pub fn with_repeater(mut self, repeater: Repeater) -> Self {
        self.repeater = Some(repeater);
        self
    }
}

/// Order line repeater.
#[derive(Debug, Clone)]
pub struct Repeater {
    pub rows: Vec<RepeaterRow>,
}

/// One repeater row with its product choices.
#[derive(Debug, Clone)]
pub struct RepeaterRow {
    pub line: ItemRowView,
    pub options: Vec<OptionView>,
}

impl Repeater {
    /// Pair each row with the live products, keeping a stored line's own
    /// product selectable after it has been trashed.
    #[must_use]
    pub fn new(rows: Vec<ItemRowView>, products: &[ProductOption]) -> Self {
        let rows = rows
            .into_iter()
            .map(|line| {
                let mut options: Vec<OptionView> = products
                    .iter()
                    .map(|p| {
                        let value = p.id.to_string();
                        OptionView {
                            selected: value == line.product_id,
                            label: format!("{} ({})", p.name, p.price),
                            value,
                        }
                    })
                    .collect();
                if !line.product_id.is_empty() && !options.iter().any(|o| o.selected) {
                    options.insert(
                        0,
                        OptionView {
                            value: line.product_id.clone(),
                            label: line.product_name.clone(),
                            selected: true,
                        },
                    );
                }
                RepeaterRow { line, options }
            })
            .collect();
        Self { rows }
    }
}

/// Record detail page.
#[derive(Template, WebTemplate)]
#[template(path = "resource/show.html")]
pub struct ShowTemplate {
    pub shell: Shell,
    pub title: String,
    pub base_path: String,
    pub id: i64,
    pub rows: Vec<DetailRow>,
    /// Order lines; empty for other resources.
    pub items: Vec<OrderItem>,
    pub related: Option<Related>,
}

/// A relation table on a detail page.
#[derive(Debug, Clone)]
pub struct Related {
    pub title: String,
    pub table: TableView,
    pub new_href: String,
    pub new_label: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// `ids=1,2,3` from a bulk action form.
#[derive(Debug, Deserialize)]
pub struct BulkForm {
    #[serde(default)]
    pub ids: String,
}

/// Re-render a form with HTTP 422.
pub fn unprocessable(template: FormTemplate) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// 303 to `path`.
pub fn see_other(path: &str) -> Response {
    Redirect::to(path).into_response()
}

/// Map a missing record to a 404 naming it.
pub fn found<T>(record: Option<T>, what: &str) -> Result<T, AppError> {
    record.ok_or_else(|| AppError::NotFound(what.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shell(processing_orders: i64) -> Shell {
        Shell {
            current_path: "/orders",
            badges: NavigationBadges {
                processing_orders,
                order_badge: BadgeStyle::for_processing_orders(processing_orders),
                products: 7,
            },
        }
    }

    #[test]
    fn test_nav_marks_current_section() {
        let nav = shell(0).nav();
        assert_eq!(nav.len(), NAV.len());
        let active: Vec<_> = nav.iter().filter(|l| l.active).map(|l| l.href).collect();
        assert_eq!(active, vec!["/orders"]);
    }

    #[test]
    fn test_nav_badges() {
        let nav = shell(3).nav();
        let orders = nav.iter().find(|l| l.href == "/orders").unwrap();
        assert_eq!(orders.badge, Some(3));
        assert!(!orders.urgent);
        let products = nav.iter().find(|l| l.href == "/products").unwrap();
        assert_eq!(products.badge, Some(7));
        assert!(nav.iter().find(|l| l.href == "/brands").unwrap().badge.is_none());
    }

    #[test]
    fn test_nav_order_badge_turns_urgent_at_ten() {
        let orders = |n| shell(n).nav().into_iter().find(|l| l.href == "/orders").unwrap();
        assert!(!orders(9).urgent);
        assert!(orders(10).urgent);
    }

    #[test]
    fn test_repeater_keeps_trashed_stored_product() {
        let products = vec![ProductOption {
            id: "1".parse().unwrap(),
            name: "Mug".to_string(),
            price: "12.50".parse().unwrap(),
        }];
        let row = |product_id: &str, product_name: &str| ItemRowView {
            id: String::new(),
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            quantity: "1".to_string(),
            unit_price: String::new(),
            total: String::new(),
            product_error: None,
            quantity_error: None,
        };

        let repeater = Repeater::new(vec![row("1", "Mug"), row("9", "Retired lamp")], &products);
        assert_eq!(repeater.rows[0].options.len(), 1);
        assert_eq!(repeater.rows[0].options[0].label, "Mug (12.50)");
        assert!(repeater.rows[0].options[0].selected);

        let retired = &repeater.rows[1].options;
        assert_eq!(retired.len(), 2);
        assert_eq!(retired[0].value, "9");
        assert!(retired[0].selected);
        assert!(!retired[1].selected);
    }
}
