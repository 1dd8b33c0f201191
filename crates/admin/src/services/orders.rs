//! Order submissions.
//!
//! The header is validated against the form schema and the repeated lines
//! against the live products; both sets of errors are reported together.

use sqlx::PgPool;

use shopdesk_core::OrderId;

use super::SubmitError;
use crate::components::{FormInput, FormMode, FormSchema, ValidationErrors};
use crate::db::{CustomerRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::{Order, OrderItem, OrderItemInput, ProductOption, SelectOption};
use crate::resources::orders::{form_schema, item_drafts, resolve_items, to_input};

/// Everything the order form needs to render or validate.
#[derive(Debug, Clone)]
pub struct OrderForm {
    pub schema: FormSchema,
    /// Live products a line may select.
    pub products: Vec<ProductOption>,
    /// Lines already stored on the edited order.
    pub stored: Vec<OrderItem>,
}

impl OrderForm {
    /// Load live customers and products. When editing, the order's own
    /// customer stays selectable even if it has since been trashed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn load(pool: &PgPool, current: Option<&Order>) -> Result<Self, RepositoryError> {
        let mut customers = CustomerRepository::new(pool).options().await?;
        if let Some(order) = current {
            let value = order.customer_id.to_string();
            if !customers.iter().any(|c| c.value == value) {
                customers.push(SelectOption::new(value, order.customer_name.clone()));
            }
        }

        Ok(Self {
            schema: form_schema(customers),
            products: ProductRepository::new(pool).options().await?,
            stored: current.map(|o| o.items.clone()).unwrap_or_default(),
        })
    }

    /// Validate the header and lines of a raw submission.
    ///
    /// # Errors
    ///
    /// Returns every header and line error at once.
    pub fn resolve(
        &self,
        raw: &FormInput,
        mode: FormMode,
    ) -> Result<(FormInput, Vec<OrderItemInput>), ValidationErrors> {
        let input = self.schema.prepare(raw, mode);
        let mut errors = self.schema.validate(&input, mode).err().unwrap_or_default();

        let items = match resolve_items(&item_drafts(raw), &self.products, &self.stored) {
            Ok(items) => items,
            Err(item_errors) => {
                errors.merge(item_errors);
                Vec::new()
            }
        };

        errors.into_result().map(|()| (input, items))
    }
}

/// Create an order with its lines under the next order number.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for header or line errors.
pub async fn create(pool: &PgPool, raw: &FormInput) -> Result<Order, SubmitError> {
    let form = OrderForm::load(pool, None).await?;
    let (input, items) = form.resolve(raw, FormMode::Create)?;
    let order = to_input(&input, items)?;

    let created = OrderRepository::new(pool).create(&order).await?;
    tracing::info!(id = %created.id, number = %created.number, "order created");
    Ok(created)
}

/// Update an order's header and reconcile its lines.
///
/// Unchanged lines keep their captured unit price.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for header or line errors, or
/// `SubmitError::Repository` with `NotFound` if the order is not live.
pub async fn update(pool: &PgPool, id: OrderId, raw: &FormInput) -> Result<Order, SubmitError> {
    let repo = OrderRepository::new(pool);
    let current = repo.get(id).await?.ok_or(RepositoryError::NotFound)?;

    let form = OrderForm::load(pool, Some(&current)).await?;
    let (input, items) = form.resolve(raw, FormMode::Edit)?;
    let order = to_input(&input, items)?;

    let updated = repo.update(id, &order).await?;
    tracing::info!(%id, lines = updated.items.len(), "order updated");
    Ok(updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::orders::{ITEM_ID, ITEM_PRODUCT, ITEM_QUANTITY};
    use shopdesk_core::{OrderItemId, Price, ProductId};

    fn form(stored: Vec<OrderItem>) -> OrderForm {
        OrderForm {
            schema: form_schema(vec![SelectOption::new(1, "Ada <ada@example.com>")]),
            products: vec![ProductOption {
                id: ProductId::new(5),
                name: "Trail Runner".into(),
                price: Price::parse("20.00").unwrap(),
            }],
            stored,
        }
    }

    fn header() -> Vec<(&'static str, &'static str)> {
        vec![
            ("customer_id", "1"),
            ("shipping_price", "4.50"),
            ("status", "pending"),
        ]
    }

    #[test]
    fn test_header_and_line_errors_reported_together() {
        let mut pairs = header();
        pairs.retain(|(k, _)| *k != "customer_id");
        pairs.extend([(ITEM_PRODUCT, "5"), (ITEM_QUANTITY, "0")]);

        let errors = form(Vec::new())
            .resolve(&FormInput::from_pairs(pairs), FormMode::Create)
            .unwrap_err();
        assert!(errors.get("customer_id").is_some());
        assert_eq!(errors.get("items.0.quantity"), Some("The quantity must be at least 1."));
    }

    #[test]
    fn test_stored_line_keeps_price_after_product_trashed() {
        let stored = vec![OrderItem {
            id: OrderItemId::new(70),
            product_id: ProductId::new(9),
            product_name: "Retired".into(),
            quantity: 2,
            unit_price: Price::parse("12.00").unwrap(),
        }];
        let mut pairs = header();
        pairs.extend([(ITEM_ID, "70"), (ITEM_PRODUCT, "9"), (ITEM_QUANTITY, "3")]);

        let (_, items) = form(stored)
            .resolve(&FormInput::from_pairs(pairs), FormMode::Edit)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price.to_string(), "12.00");
        assert_eq!(items[0].quantity, 3);
    }
}
