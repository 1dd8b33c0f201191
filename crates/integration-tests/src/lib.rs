//! Integration tests for Shopdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-backed tests (migrations are applied automatically)
//! DATABASE_URL=postgres://localhost/shopdesk_test \
//!     cargo test -p shopdesk-integration-tests -- --ignored
//!
//! # HTTP smoke tests also need a running server
//! cargo run -p shopdesk-admin &
//! ADMIN_BASE_URL=http://localhost:3001 \
//!     cargo test -p shopdesk-integration-tests --test http -- --ignored
//! ```
//!
//! Tests share one database, so every record they create carries a unique
//! suffix from [`unique`] and counters are compared as deltas.
//!
//! # Test Files
//!
//! - `catalog` - Brands, categories and products
//! - `customers` - Customer validation and uniqueness
//! - `orders` - Order numbers, lines and price capture
//! - `stats` - Dashboard counters and chart
//! - `http` - Routes against a running server

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use shopdesk_admin::components::FormInput;
use shopdesk_admin::models::{Brand, Category, Customer, Product};
use shopdesk_admin::services;

/// Connect to the test database and apply migrations.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Base URL of a running admin server.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// `prefix` plus a random suffix, so parallel tests never collide.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix} {}", &id[..8])
}

/// Form input from literal pairs.
#[must_use]
pub fn form(pairs: &[(&str, &str)]) -> FormInput {
    FormInput::from_pairs(pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())))
}

pub fn brand_form(name: &str) -> FormInput {
    form(&[
        ("name", name),
        ("url", "https://brand.example"),
        ("is_visible", "on"),
    ])
}

pub async fn create_brand(pool: &PgPool, name: &str) -> Brand {
    services::brands::create(pool, &brand_form(name))
        .await
        .expect("brand should be created")
}

pub async fn create_category(pool: &PgPool, name: &str) -> Category {
    services::categories::create(pool, &form(&[("name", name)]))
        .await
        .expect("category should be created")
}

pub fn product_form(name: &str, sku: &str, price: &str, brand: &Brand, category: &Category) -> FormInput {
    let brand_id = brand.id.to_string();
    let category_id = category.id.to_string();
    form(&[
        ("name", name),
        ("sku", sku),
        ("price", price),
        ("quantity", "10"),
        ("product_type", "deliverable"),
        ("is_visible", "on"),
        ("brand_id", &brand_id),
        ("category_ids", &category_id),
    ])
}

/// A product under a fresh brand and category.
pub async fn create_product(pool: &PgPool, price: &str) -> Product {
    let brand = create_brand(pool, &unique("Brand")).await;
    let category = create_category(pool, &unique("Category")).await;
    let name = unique("Product");
    let sku = unique("SKU").replace(' ', "-");
    services::products::create(pool, &product_form(&name, &sku, price, &brand, &category))
        .await
        .expect("product should be created")
}

pub fn customer_form(name: &str, email: &str) -> FormInput {
    form(&[
        ("name", name),
        ("email", email),
        ("phone", "555-0100"),
        ("date_of_birth", "1990-05-17"),
        ("city", "Springfield"),
        ("zip_code", "12345"),
        ("address", "742 Evergreen Terrace"),
    ])
}

pub async fn create_customer(pool: &PgPool) -> Customer {
    let email = format!("{}@example.com", unique("cust").replace(' ', "."));
    services::customers::create(pool, &customer_form(&unique("Customer"), &email))
        .await
        .expect("customer should be created")
}
