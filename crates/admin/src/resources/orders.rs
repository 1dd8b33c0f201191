//! Order screens and the order-items repeater.
//!
//! Lines are submitted as three repeated fields aligned by position:
//! `item_id` (empty for new lines), `item_product_id` and `item_quantity`.
//! The unit price is never taken from the form. It is resolved server-side:
//! a stored line whose product is unchanged keeps its stored price, any other
//! line snapshots the product's current price.

use rust_decimal::Decimal;
use serde::Serialize;

use shopdesk_core::{CustomerId, OrderItemId, OrderStatus, Price, ProductId, line_total};

use crate::components::{
    BulkAction, DataTableConfig, FieldKind, FilterOption, FormField, FormInput, FormSchema,
    ListParams, TableColumn, TableFilter, TableRow, ValidationErrors,
};
use crate::models::{
    Order, OrderFilter, OrderInput, OrderItem, OrderItemInput, OrderSummary, ProductOption, SelectOption,
};

use super::{DetailRow, enum_options, invalid, timestamp};

pub const ITEM_ID: &str = "item_id";
pub const ITEM_PRODUCT: &str = "item_product_id";
pub const ITEM_QUANTITY: &str = "item_quantity";

#[must_use]
pub fn table_config() -> DataTableConfig {
    let statuses = OrderStatus::ALL
        .iter()
        .map(|s| FilterOption::new(s.as_str(), s.label()))
        .collect();

    DataTableConfig::new("orders", "Orders")
        .column(TableColumn::sortable("number", "Number"))
        .column(TableColumn::sortable("customer", "Customer"))
        .column(TableColumn::sortable("status", "Status"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::sortable("created_at", "Order Date"))
        .filter(TableFilter::select("status", "Status", statuses))
        .bulk_action(BulkAction::new("export", "Export selected"))
        .bulk_action(BulkAction::delete())
        .search_placeholder("Search by order number or customer...")
        .empty_state("No orders yet", None)
}

#[must_use]
pub fn filter(params: &ListParams) -> OrderFilter {
    OrderFilter {
        search: params.search(),
        status: params.parsed("status"),
        scope: params.scope(),
    }
}

/// Order header fields over the live customers.
#[must_use]
pub fn form_schema(customers: Vec<SelectOption>) -> FormSchema {
    FormSchema::new(vec![
        FormField::new("customer_id", "customer", FieldKind::Select)
            .required()
            .options(customers),
        FormField::new("shipping_price", "shipping costs", FieldKind::Price)
            .required()
            .default_value("0.00"),
        FormField::new("status", "status", FieldKind::Select)
            .required()
            .default_value(OrderStatus::default().as_str())
            .options(enum_options(&OrderStatus::ALL, |s| s.as_str(), |s| s.label())),
        FormField::new("notes", "notes", FieldKind::Markdown),
    ])
}

#[must_use]
pub fn row(order: &OrderSummary) -> TableRow {
    TableRow::new(
        order.id.as_i64(),
        vec![
            order.number.to_string(),
            order.customer_name.clone(),
            order.status.label().to_string(),
            order.item_count.to_string(),
            timestamp(order.created_at),
        ],
        order.deleted_at.is_some(),
    )
}

#[must_use]
pub fn detail(order: &Order) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Number", order.number.as_str()),
        DetailRow::new("Customer", &order.customer_name),
        DetailRow::new("Status", order.status.label()),
        DetailRow::new("Shipping costs", order.shipping_price.to_string()),
        DetailRow::new("Items total", order.items_total().to_string()),
        DetailRow::new("Grand total", order.grand_total().to_string()),
        DetailRow::new("Notes", order.notes.clone().unwrap_or_default()),
        DetailRow::new("Order date", timestamp(order.created_at)),
    ]
}

/// Stored header values and lines for the edit form.
#[must_use]
pub fn form_values(order: &Order) -> FormInput {
    let mut input = FormInput::from_pairs([
        ("customer_id", order.customer_id.to_string()),
        ("shipping_price", order.shipping_price.to_string()),
        ("status", order.status.as_str().to_string()),
        ("notes", order.notes.clone().unwrap_or_default()),
    ]);
    input.set_all(ITEM_ID, order.items.iter().map(|i| i.id.to_string()).collect());
    input.set_all(
        ITEM_PRODUCT,
        order.items.iter().map(|i| i.product_id.to_string()).collect(),
    );
    input.set_all(
        ITEM_QUANTITY,
        order.items.iter().map(|i| i.quantity.to_string()).collect(),
    );
    input
}

// =============================================================================
// Repeater
// =============================================================================

/// One submitted line before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: Option<OrderItemId>,
    pub product: String,
    pub quantity: String,
}

/// Split the repeated item fields into drafts, skipping blank rows.
#[must_use]
pub fn item_drafts(input: &FormInput) -> Vec<ItemDraft> {
    let ids = input.all(ITEM_ID);
    let products = input.all(ITEM_PRODUCT);
    let quantities = input.all(ITEM_QUANTITY);
    let rows = ids.len().max(products.len()).max(quantities.len());

    (0..rows)
        .map(|i| {
            let field = |values: &[String]| {
                values
                    .get(i)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default()
            };
            ItemDraft {
                id: field(ids).parse().ok(),
                product: field(products),
                quantity: field(quantities),
            }
        })
        .filter(|d| d.id.is_some() || !d.product.is_empty() || !d.quantity.is_empty())
        .collect()
}

/// Validate drafts and resolve each line's unit price.
///
/// `live_products` are the products a line may newly select; `stored` are the
/// order's current lines (empty on create). A stored line keeps its product
/// even if that product has since been trashed, as long as it is unchanged.
///
/// # Errors
///
/// Returns errors keyed `items.{index}.product_id` / `items.{index}.quantity`.
pub fn resolve_items(
    drafts: &[ItemDraft],
    live_products: &[ProductOption],
    stored: &[OrderItem],
) -> Result<Vec<OrderItemInput>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut items = Vec::with_capacity(drafts.len());

    for (index, draft) in drafts.iter().enumerate() {
        let product_key = format!("items.{index}.product_id");
        let quantity_key = format!("items.{index}.quantity");

        let quantity = match draft.quantity.parse::<i32>() {
            Ok(q) if q >= 1 => Some(q),
            Ok(_) => {
                errors.add(&quantity_key, "The quantity must be at least 1.");
                None
            }
            Err(_) if draft.quantity.is_empty() => {
                errors.add(&quantity_key, "The quantity field is required.");
                None
            }
            Err(_) => {
                errors.add(&quantity_key, "The quantity must be an integer.");
                None
            }
        };

        if draft.product.is_empty() {
            errors.add(&product_key, "The product field is required.");
            continue;
        }
        let Ok(product_id) = draft.product.parse::<ProductId>() else {
            errors.add(&product_key, "The selected product is invalid.");
            continue;
        };

        let stored_line = draft
            .id
            .and_then(|id| stored.iter().find(|item| item.id == id));
        let unit_price = match stored_line {
            Some(line) if line.product_id == product_id => Some(line.unit_price),
            _ => live_products
                .iter()
                .find(|p| p.id == product_id)
                .map(|p| p.price),
        };
        let Some(unit_price) = unit_price else {
            errors.add(&product_key, "The selected product is invalid.");
            continue;
        };

        if let Some(quantity) = quantity {
            items.push(OrderItemInput {
                id: stored_line.map(|line| line.id),
                product_id,
                quantity,
                unit_price,
            });
        }
    }

    errors.into_result().map(|()| items)
}

/// Order header and resolved lines from a prepared, validated submission.
///
/// # Errors
///
/// Returns an error naming the first header field that cannot be converted.
pub fn to_input(
    input: &FormInput,
    items: Vec<OrderItemInput>,
) -> Result<OrderInput, ValidationErrors> {
    let customer_id: CustomerId = input
        .parse("customer_id")
        .ok_or_else(|| invalid("customer_id"))?;
    let shipping_price =
        Price::parse(input.value("shipping_price")).map_err(|_| invalid("shipping_price"))?;
    let status: OrderStatus = input.parse("status").ok_or_else(|| invalid("status"))?;

    Ok(OrderInput {
        customer_id,
        shipping_price,
        status,
        notes: input.text("notes"),
        items,
    })
}

/// A repeater row as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRowView {
    pub id: String,
    pub product_id: String,
    /// Label of a stored line's product; covers products no longer live.
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
    pub product_error: Option<String>,
    pub quantity_error: Option<String>,
}

/// Rows for the repeater, with a display price and total where known.
///
/// A trailing blank row is always appended for adding a line.
#[must_use]
pub fn item_rows_view(
    drafts: &[ItemDraft],
    live_products: &[ProductOption],
    stored: &[OrderItem],
    errors: &ValidationErrors,
) -> Vec<ItemRowView> {
    let mut rows: Vec<ItemRowView> = drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            let product_id = draft.product.parse::<ProductId>().ok();
            let stored_line = draft
                .id
                .and_then(|id| stored.iter().find(|item| item.id == id));
            let price = match (stored_line, product_id) {
                (Some(line), Some(pid)) if line.product_id == pid => Some(line.unit_price),
                (_, Some(pid)) => live_products.iter().find(|p| p.id == pid).map(|p| p.price),
                _ => None,
            };
            let total = match (price, draft.quantity.parse::<i32>()) {
                (Some(price), Ok(quantity)) => line_total(quantity, price).round_dp(2),
                _ => Decimal::ZERO,
            };

            ItemRowView {
                id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
                product_id: draft.product.clone(),
                product_name: stored_line
                    .map(|line| line.product_name.clone())
                    .unwrap_or_default(),
                quantity: draft.quantity.clone(),
                unit_price: price.map(|p| p.to_string()).unwrap_or_default(),
                total: total.to_string(),
                product_error: errors
                    .get(&format!("items.{index}.product_id"))
                    .map(ToString::to_string),
                quantity_error: errors
                    .get(&format!("items.{index}.quantity"))
                    .map(ToString::to_string),
            }
        })
        .collect();

    rows.push(ItemRowView {
        id: String::new(),
        product_id: String::new(),
        product_name: String::new(),
        quantity: "1".to_string(),
        unit_price: String::new(),
        total: String::new(),
        product_error: None,
        quantity_error: None,
    });
    rows
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    fn live() -> Vec<ProductOption> {
        vec![
            ProductOption {
                id: ProductId::new(1),
                name: "Mug".to_string(),
                price: price("12.00"),
            },
            ProductOption {
                id: ProductId::new(2),
                name: "Poster".to_string(),
                price: price("30.00"),
            },
        ]
    }

    fn stored_line(id: i64, product: i64, unit_price: &str) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            product_id: ProductId::new(product),
            product_name: "Old".to_string(),
            quantity: 1,
            unit_price: price(unit_price),
        }
    }

    fn draft(id: Option<i64>, product: &str, quantity: &str) -> ItemDraft {
        ItemDraft {
            id: id.map(OrderItemId::new),
            product: product.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[test]
    fn test_item_drafts_align_by_position_and_skip_blanks() {
        let input = FormInput::from_pairs([
            (ITEM_ID, "7"),
            (ITEM_PRODUCT, "1"),
            (ITEM_QUANTITY, "2"),
            (ITEM_ID, ""),
            (ITEM_PRODUCT, "2"),
            (ITEM_QUANTITY, "5"),
            (ITEM_ID, ""),
            (ITEM_PRODUCT, ""),
            (ITEM_QUANTITY, ""),
        ]);
        let drafts = item_drafts(&input);
        assert_eq!(drafts, vec![draft(Some(7), "1", "2"), draft(None, "2", "5")]);
    }

    #[test]
    fn test_new_line_snapshots_current_price() {
        let items = resolve_items(&[draft(None, "2", "3")], &live(), &[]).unwrap();
        assert_eq!(items[0].unit_price, price("30.00"));
        assert_eq!(items[0].id, None);
    }

    #[test]
    fn test_unchanged_line_keeps_stored_price() {
        // Product 1 now costs 12.00 but the line was priced at 9.50.
        let stored = [stored_line(7, 1, "9.50")];
        let items = resolve_items(&[draft(Some(7), "1", "4")], &live(), &stored).unwrap();
        assert_eq!(items[0].unit_price, price("9.50"));
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[0].id, Some(OrderItemId::new(7)));
    }

    #[test]
    fn test_changed_product_takes_new_price() {
        let stored = [stored_line(7, 1, "9.50")];
        let items = resolve_items(&[draft(Some(7), "2", "1")], &live(), &stored).unwrap();
        assert_eq!(items[0].unit_price, price("30.00"));
    }

    #[test]
    fn test_unchanged_line_with_trashed_product_is_kept() {
        let stored = [stored_line(7, 99, "5.00")];
        let items = resolve_items(&[draft(Some(7), "99", "1")], &live(), &stored).unwrap();
        assert_eq!(items[0].product_id, ProductId::new(99));
    }

    #[test]
    fn test_trashed_product_cannot_be_newly_selected() {
        let errors = resolve_items(&[draft(None, "99", "1")], &live(), &[]).unwrap_err();
        assert_eq!(
            errors.get("items.0.product_id"),
            Some("The selected product is invalid.")
        );
    }

    #[test]
    fn test_foreign_line_id_is_treated_as_new() {
        let items = resolve_items(&[draft(Some(8), "1", "1")], &live(), &[]).unwrap();
        assert_eq!(items[0].id, None);
        assert_eq!(items[0].unit_price, price("12.00"));
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let errors = resolve_items(
            &[draft(None, "1", "0"), draft(None, "1", ""), draft(None, "", "x")],
            &live(),
            &[],
        )
        .unwrap_err();
        assert_eq!(
            errors.get("items.0.quantity"),
            Some("The quantity must be at least 1.")
        );
        assert_eq!(
            errors.get("items.1.quantity"),
            Some("The quantity field is required.")
        );
        assert_eq!(
            errors.get("items.2.product_id"),
            Some("The product field is required.")
        );
    }

    #[test]
    fn test_rows_view_computes_totals() {
        let stored = [stored_line(7, 1, "9.50")];
        let rows = item_rows_view(
            &[draft(Some(7), "1", "3"), draft(None, "2", "2")],
            &live(),
            &stored,
            &ValidationErrors::new(),
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].unit_price, "9.50");
        assert_eq!(rows[0].total, "28.50");
        assert_eq!(rows[1].total, "60.00");
        assert_eq!(rows[2].quantity, "1");
        assert!(rows[2].id.is_empty());
    }
}
