//! Order domain models.
//!
//! Line totals are never stored. [`OrderItem::total`] and the order totals are
//! recomputed from quantity and unit price every time they are read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopdesk_core::{
    CustomerId, LineItem, OrderId, OrderItemId, OrderNumber, OrderStatus, Price, ProductId,
};

use crate::db::{Scope, SortKey};

/// An order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Assigned from the order number sequence at creation; immutable.
    pub number: OrderNumber,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub shipping_price: Price,
    pub status: OrderStatus,
    /// Markdown source.
    pub notes: Option<String>,
    /// Lines in form order.
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of line totals.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::total).sum()
    }

    /// Line totals plus shipping.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        let lines: Vec<LineItem> = self.items.iter().map(OrderItem::line).collect();
        LineItem::grand_total(&lines, self.shipping_price)
    }
}

/// One order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    /// Product price captured when the product was chosen for this line.
    pub unit_price: Price,
}

impl OrderItem {
    #[must_use]
    pub const fn line(&self) -> LineItem {
        LineItem {
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }

    /// `quantity × unit_price`, for display.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.line().total()
    }
}

/// Listing row.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub number: OrderNumber,
    pub customer_name: String,
    pub status: OrderStatus,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated order fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInput {
    pub customer_id: CustomerId,
    pub shipping_price: Price,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub items: Vec<OrderItemInput>,
}

/// One submitted line. `id` is set for lines that already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemInput {
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Resolved snapshot: the stored price when the product is unchanged,
    /// otherwise the product's current price.
    pub unit_price: Price,
}

/// One row of the order export.
#[derive(Debug, Clone, Serialize)]
pub struct OrderExportRow {
    pub number: String,
    pub customer: String,
    pub status: OrderStatus,
    pub shipping_price: Price,
    pub items_total: Decimal,
    pub grand_total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order listing filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Matches order number or customer name.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub scope: Scope,
}

/// Sortable order columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    Number,
    Customer,
    Status,
    #[default]
    CreatedAt,
}

impl SortKey for OrderSort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "number" => Some(Self::Number),
            "customer" => Some(Self::Customer),
            "status" => Some(Self::Status),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Customer => "customer",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Number => "o.number",
            Self::Customer => "c.name",
            Self::Status => "o.status",
            Self::CreatedAt => "o.created_at",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: &str) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Widget".to_string(),
            quantity,
            unit_price: Price::parse(price).unwrap(),
        }
    }

    #[test]
    fn test_order_totals_are_recomputed_from_lines() {
        let mut order = Order {
            id: OrderId::new(1),
            number: OrderNumber::from_sequence(1),
            customer_id: CustomerId::new(1),
            customer_name: "Ada".to_string(),
            shipping_price: Price::parse("5").unwrap(),
            status: OrderStatus::Pending,
            notes: None,
            items: vec![item(2, "10.00"), item(3, "1.50")],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        assert_eq!(order.items_total(), "24.50".parse::<Decimal>().unwrap());
        assert_eq!(order.grand_total(), "29.50".parse::<Decimal>().unwrap());

        order.items[1].quantity = 1;
        assert_eq!(order.items_total(), "21.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_order_sort_default_is_newest_column() {
        assert_eq!(OrderSort::default().column(), "o.created_at");
        assert_eq!(OrderSort::from_key("customer"), Some(OrderSort::Customer));
        assert_eq!(OrderSort::from_key("total"), None);
    }
}
