//! Order repository.
//!
//! An order and its lines are always written together in one transaction.
//! Order numbers come from `shop.order_number_seq` and are never updated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use shopdesk_core::{
    CustomerId, LineItem, OrderId, OrderItemId, OrderNumber, OrderStatus, Price, ProductId,
};

use super::{PageRequest, Paged, RepositoryError, Sort, Table, like_pattern, map_unique_violation};
use crate::models::{
    Order, OrderExportRow, OrderFilter, OrderInput, OrderItem, OrderItemInput, OrderSort,
    OrderSummary,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    number: String,
    customer_id: i64,
    customer_name: String,
    shipping_price: Price,
    status: OrderStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            number: OrderNumber::from_stored(self.number),
            customer_id: CustomerId::new(self.customer_id),
            customer_name: self.customer_name,
            shipping_price: self.shipping_price,
            status: self.status,
            notes: self.notes,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i32,
    unit_price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: i64,
    number: String,
    customer_name: String,
    status: OrderStatus,
    item_count: i64,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            number: OrderNumber::from_stored(row.number),
            customer_name: row.customer_name,
            status: row.status,
            item_count: row.item_count,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

const ORDER_COLUMNS: &str = r"
    o.id, o.number, o.customer_id, c.name AS customer_name, o.shipping_price,
    o.status, o.notes, o.created_at, o.updated_at, o.deleted_at
";

const ORDER_FROM: &str = "shop.orders o JOIN shop.customer c ON c.id = o.customer_id";

const ITEM_COLUMNS: &str = r"
    i.id, i.order_id, i.product_id, p.name AS product_name, i.quantity, i.unit_price
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        sort: Sort<OrderSort>,
        page: PageRequest,
    ) -> Result<Paged<OrderSummary>, RepositoryError> {
        let predicate = format!(
            "{} AND ($1::text IS NULL OR o.number ILIKE $1 OR c.name ILIKE $1) \
             AND ($2::shop.order_status IS NULL OR o.status = $2)",
            filter.scope.predicate("o")
        );
        let search = filter.search.as_deref().map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {ORDER_FROM} WHERE {predicate}"))
                .bind(&search)
                .bind(filter.status)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            r"
            SELECT o.id, o.number, c.name AS customer_name, o.status,
                   (SELECT COUNT(*) FROM shop.order_item i WHERE i.order_id = o.id) AS item_count,
                   o.created_at, o.deleted_at
            FROM {ORDER_FROM}
            WHERE {predicate}
            ORDER BY {} LIMIT $3 OFFSET $4
            ",
            sort.order_by("o")
        );
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&sql)
            .bind(&search)
            .bind(filter.status)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a live order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM {ORDER_FROM} WHERE o.id = $1 AND o.deleted_at IS NULL"
        );
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.items(id).await?;
        Ok(Some(row.into_order(items)))
    }

    /// Lines of an order in form order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_item i \
             JOIN shop.product p ON p.id = i.product_id \
             WHERE i.order_id = $1 ORDER BY i.position, i.id"
        );
        let rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(id.as_i64())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create an order and its lines, allocating the next order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(&self, input: &OrderInput) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('shop.order_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let sequence = u64::try_from(sequence).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative order sequence value {sequence}"))
        })?;
        let number = OrderNumber::from_sequence(sequence);

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO shop.orders (customer_id, number, shipping_price, status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(input.customer_id.as_i64())
        .bind(number.as_str())
        .bind(input.shipping_price)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for (position, item) in input.items.iter().enumerate() {
            insert_item(&mut tx, id, position, item).await?;
        }
        tx.commit().await?;

        tracing::debug!(id, %number, items = input.items.len(), "order created");
        self.get(OrderId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a live order and synchronise its lines.
    ///
    /// Lines whose ID is absent from `input.items` are removed, submitted lines
    /// with an ID are updated in place, and lines without one are inserted.
    /// The order number is never touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this ID.
    pub async fn update(&self, id: OrderId, input: &OrderInput) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE shop.orders
            SET customer_id = $2, shipping_price = $3, status = $4, notes = $5
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            ",
        )
        .bind(id.as_i64())
        .bind(input.customer_id.as_i64())
        .bind(input.shipping_price)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let kept: Vec<i64> = input
            .items
            .iter()
            .filter_map(|item| item.id.map(|id| id.as_i64()))
            .collect();
        sqlx::query("DELETE FROM shop.order_item WHERE order_id = $1 AND NOT (id = ANY($2))")
            .bind(id.as_i64())
            .bind(&kept)
            .execute(&mut *tx)
            .await?;

        for (position, item) in input.items.iter().enumerate() {
            let Some(item_id) = item.id else {
                insert_item(&mut tx, id.as_i64(), position, item).await?;
                continue;
            };
            let result = sqlx::query(
                r"
                UPDATE shop.order_item
                SET product_id = $3, quantity = $4, unit_price = $5, position = $6
                WHERE id = $1 AND order_id = $2
                ",
            )
            .bind(item_id.as_i64())
            .bind(id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(position_value(position))
            .execute(&mut *tx)
            .await?;

            // A line ID from another order is treated as a new line.
            if result.rows_affected() == 0 {
                insert_item(&mut tx, id.as_i64(), position, item).await?;
            }
        }
        tx.commit().await?;

        tracing::debug!(%id, items = input.items.len(), "order updated");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Export rows for the given live orders, oldest first.
    ///
    /// Unknown or trashed IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn export(&self, ids: &[OrderId]) -> Result<Vec<OrderExportRow>, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(OrderId::as_i64).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM {ORDER_FROM} \
             WHERE o.id = ANY($1) AND o.deleted_at IS NULL ORDER BY o.created_at, o.id"
        );
        let orders = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_item i \
             JOIN shop.product p ON p.id = i.product_id \
             WHERE i.order_id = ANY($1)"
        );
        let items = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut lines: HashMap<i64, Vec<LineItem>> = HashMap::new();
        for item in items {
            lines.entry(item.order_id).or_default().push(LineItem {
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let order_lines = lines.remove(&order.id).unwrap_or_default();
                let items_total: Decimal = order_lines.iter().map(LineItem::total).sum();
                OrderExportRow {
                    number: order.number,
                    customer: order.customer_name,
                    status: order.status,
                    shipping_price: order.shipping_price,
                    items_total,
                    grand_total: LineItem::grand_total(&order_lines, order.shipping_price),
                    created_at: order.created_at,
                }
            })
            .collect())
    }

    /// Soft delete an order. Its lines stay attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this ID.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        super::soft_delete(self.pool, Table::Order, id.as_i64()).await
    }

    /// Soft delete several orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete_many(&self, ids: &[OrderId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(OrderId::as_i64).collect();
        super::soft_delete_many(self.pool, Table::Order, &ids).await
    }

    /// Restore a trashed order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no trashed order has this ID.
    pub async fn restore(&self, id: OrderId) -> Result<(), RepositoryError> {
        super::restore(self.pool, Table::Order, id.as_i64()).await
    }
}

fn position_value(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    order_id: i64,
    position: usize,
    item: &OrderItemInput,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.order_item (order_id, product_id, position, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(order_id)
    .bind(item.product_id.as_i64())
    .bind(position_value(position))
    .bind(item.quantity)
    .bind(item.unit_price)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
