//! Integration tests for orders.
//!
//! Require a `PostgreSQL` database in `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use shopdesk_admin::components::FormInput;
use shopdesk_admin::db::{OrderRepository, ProductRepository};
use shopdesk_admin::models::{Customer, Order, Product};
use shopdesk_admin::services::{self, SubmitError};
use shopdesk_core::OrderStatus;
use shopdesk_integration_tests::{create_customer, create_product, test_pool};

/// Order form with one line per `(product, quantity)`; `ids` carries the
/// stored line IDs when editing.
fn order_form(customer: &Customer, lines: &[(&Product, &str)], ids: &[String]) -> FormInput {
    let mut pairs = vec![
        ("customer_id".to_string(), customer.id.to_string()),
        ("shipping_price".to_string(), "4.99".to_string()),
        ("status".to_string(), "pending".to_string()),
    ];
    for (index, (product, quantity)) in lines.iter().enumerate() {
        let id = ids.get(index).cloned().unwrap_or_default();
        pairs.push(("item_id".to_string(), id));
        pairs.push(("item_product_id".to_string(), product.id.to_string()));
        pairs.push(("item_quantity".to_string(), (*quantity).to_string()));
    }
    FormInput::from_pairs(pairs)
}

fn line_ids(order: &Order) -> Vec<String> {
    order.items.iter().map(|item| item.id.to_string()).collect()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_numbers_are_distinct_and_increasing() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;

    let first = services::orders::create(&pool, &order_form(&customer, &[], &[]))
        .await
        .unwrap();
    let second = services::orders::create(&pool, &order_form(&customer, &[], &[]))
        .await
        .unwrap();

    assert_ne!(first.number, second.number);
    assert!(first.number < second.number);
    assert_eq!(first.status, OrderStatus::Pending);
    assert!(first.items.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_line_captures_price_at_creation() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let product = create_product(&pool, "12.50").await;

    let order = services::orders::create(&pool, &order_form(&customer, &[(&product, "3")], &[]))
        .await
        .unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price.to_string(), "12.50");
    assert_eq!(order.items[0].total().to_string(), "37.50");

    // Repricing the product leaves the stored line alone.
    let product = ProductRepository::new(&pool)
        .get(product.id)
        .await
        .unwrap()
        .unwrap();
    let mut edit = shopdesk_admin::resources::products::form_values(&product);
    edit.set("price", "99.00");
    services::products::update(&pool, product.id, &edit)
        .await
        .unwrap();

    let stored = OrderRepository::new(&pool).get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.items[0].unit_price.to_string(), "12.50");
    assert_eq!(
        ProductRepository::new(&pool).price(product.id).await.unwrap().unwrap().to_string(),
        "99.00"
    );

    // Re-saving the order with the same line keeps the captured price.
    let ids = line_ids(&stored);
    let resaved = services::orders::update(
        &pool,
        order.id,
        &order_form(&customer, &[(&product, "4")], &ids),
    )
    .await
    .unwrap();
    assert_eq!(resaved.items.len(), 1);
    assert_eq!(resaved.items[0].id, stored.items[0].id);
    assert_eq!(resaved.items[0].quantity, 4);
    assert_eq!(resaved.items[0].unit_price.to_string(), "12.50");
    assert_eq!(resaved.number, order.number);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_update_reconciles_lines() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let mug = create_product(&pool, "10.00").await;
    let kettle = create_product(&pool, "30.00").await;

    let order = services::orders::create(
        &pool,
        &order_form(&customer, &[(&mug, "1"), (&kettle, "2")], &[]),
    )
    .await
    .unwrap();
    assert_eq!(order.items.len(), 2);

    // Keep the kettle line, drop the mug line, add a new mug line.
    let kettle_line = order.items.iter().find(|i| i.product_id == kettle.id).unwrap();
    let updated = services::orders::update(
        &pool,
        order.id,
        &order_form(
            &customer,
            &[(&kettle, "2"), (&mug, "5")],
            &[kettle_line.id.to_string(), String::new()],
        ),
    )
    .await
    .unwrap();

    assert_eq!(updated.items.len(), 2);
    assert!(updated.items.iter().any(|i| i.id == kettle_line.id));
    let new_mug = updated.items.iter().find(|i| i.product_id == mug.id).unwrap();
    assert_eq!(new_mug.quantity, 5);
    assert!(order.items.iter().all(|i| i.id != new_mug.id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invalid_lines_write_nothing() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let product = create_product(&pool, "5.00").await;

    let err = services::orders::create(&pool, &order_form(&customer, &[(&product, "0")], &[]))
        .await
        .unwrap_err();
    let SubmitError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert!(errors.get("items.0.quantity").is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_export_lists_selected_orders() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let product = create_product(&pool, "2.00").await;
    let order = services::orders::create(&pool, &order_form(&customer, &[(&product, "2")], &[]))
        .await
        .unwrap();

    let rows = OrderRepository::new(&pool).export(&[order.id]).await.unwrap();
    assert_eq!(rows.len(), 1);
    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["number"], order.number.as_str());
}
