//! Integration tests for brands, categories and products.
//!
//! Require a `PostgreSQL` database in `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use shopdesk_admin::db::{
    BrandRepository, CategoryRepository, PageRequest, ProductRepository, Sort,
};
use shopdesk_admin::models::ProductFilter;
use shopdesk_admin::services::{self, SubmitError};
use shopdesk_core::Slug;
use shopdesk_integration_tests::{
    brand_form, create_brand, create_category, create_product, form, product_form, test_pool,
    unique,
};

fn field_error(err: SubmitError, field: &str) -> String {
    let SubmitError::Invalid(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    errors.get(field).unwrap_or_default().to_string()
}

// =============================================================================
// Brands
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_brand_slug_is_derived_on_create_and_kept_on_rename() {
    let pool = test_pool().await;
    let name = unique("Acme Works");
    let brand = create_brand(&pool, &name).await;
    assert_eq!(brand.slug, Slug::derive(&name));

    let renamed = unique("Renamed");
    let mut edit = brand_form(&renamed);
    edit.set("slug", "hand-written");
    let updated = services::brands::update(&pool, brand.id, &edit).await.unwrap();

    assert_eq!(updated.name, renamed);
    assert_eq!(updated.slug, brand.slug);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_brand_name_must_be_unique() {
    let pool = test_pool().await;
    let name = unique("Duplicate");
    create_brand(&pool, &name).await;

    let err = services::brands::create(&pool, &brand_form(&name))
        .await
        .unwrap_err();
    assert_eq!(field_error(err, "name"), "The name has already been taken.");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_brand_can_be_saved_under_its_own_name() {
    let pool = test_pool().await;
    let name = unique("Same Name");
    let brand = create_brand(&pool, &name).await;

    let mut edit = brand_form(&name);
    edit.set("url", "https://elsewhere.example");
    let updated = services::brands::update(&pool, brand.id, &edit).await.unwrap();
    assert_eq!(updated.url, "https://elsewhere.example");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_trashed_brand_still_holds_its_name() {
    let pool = test_pool().await;
    let name = unique("Trashed");
    let brand = create_brand(&pool, &name).await;
    let repo = BrandRepository::new(&pool);

    repo.delete(brand.id).await.unwrap();
    assert!(repo.get(brand.id).await.unwrap().is_none());

    let err = services::brands::create(&pool, &brand_form(&name))
        .await
        .unwrap_err();
    assert_eq!(field_error(err, "name"), "The name has already been taken.");

    repo.restore(brand.id).await.unwrap();
    assert_eq!(repo.get(brand.id).await.unwrap().unwrap().name, name);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invalid_brand_writes_nothing() {
    let pool = test_pool().await;
    let name = unique("Bad Color");
    let mut input = brand_form(&name);
    input.set("primary_hex", "red");

    let err = services::brands::create(&pool, &input).await.unwrap_err();
    assert!(!field_error(err, "primary_hex").is_empty());

    // The name is still free.
    create_brand(&pool, &name).await;
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_category_bulk_delete_and_restore() {
    let pool = test_pool().await;
    let first = create_category(&pool, &unique("Bulk")).await;
    let second = create_category(&pool, &unique("Bulk")).await;
    let repo = CategoryRepository::new(&pool);

    let deleted = repo.delete_many(&[first.id, second.id]).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(repo.get(first.id).await.unwrap().is_none());

    // Already trashed rows are not counted again.
    assert_eq!(repo.delete_many(&[first.id]).await.unwrap(), 0);

    repo.restore(second.id).await.unwrap();
    assert!(repo.get(second.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_category_name_must_be_unique() {
    let pool = test_pool().await;
    let name = unique("Kitchen");
    create_category(&pool, &name).await;

    let err = services::categories::create(&pool, &form(&[("name", &name)]))
        .await
        .unwrap_err();
    assert_eq!(field_error(err, "name"), "The name has already been taken.");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_sku_must_be_unique() {
    let pool = test_pool().await;
    let existing = create_product(&pool, "10.00").await;
    let brand = create_brand(&pool, &unique("Brand")).await;
    let category = create_category(&pool, &unique("Category")).await;

    let input = product_form(&unique("Other"), &existing.sku, "5.00", &brand, &category);
    let err = services::products::create(&pool, &input).await.unwrap_err();
    assert_eq!(field_error(err, "sku"), "The SKU has already been taken.");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_can_be_saved_under_its_own_name_and_sku() {
    let pool = test_pool().await;
    let brand = create_brand(&pool, &unique("Brand")).await;
    let category = create_category(&pool, &unique("Category")).await;
    let name = unique("Own Product");
    let sku = unique("OWN").replace(' ', "-");
    let product = services::products::create(
        &pool,
        &product_form(&name, &sku, "10.00", &brand, &category),
    )
    .await
    .unwrap();

    let edit = product_form(&name, &sku, "12.99", &brand, &category);
    let updated = services::products::update(&pool, product.id, &edit).await.unwrap();
    assert_eq!(updated.name, name);
    assert_eq!(updated.sku, sku);
    assert_eq!(updated.slug, product.slug);
    assert_eq!(updated.price.to_string(), "12.99");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_links_categories_and_brand() {
    let pool = test_pool().await;
    let product = create_product(&pool, "19.99").await;

    let stored = ProductRepository::new(&pool)
        .get(product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.category_ids.len(), 1);
    assert_eq!(stored.price.to_string(), "19.99");
    assert_eq!(stored.slug, Slug::derive(&stored.name));

    let brand = BrandRepository::new(&pool)
        .get(stored.brand_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(brand.product_count, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_search_matches_brand_name() {
    let pool = test_pool().await;
    let product = create_product(&pool, "8.00").await;

    let filter = ProductFilter {
        search: Some(product.brand_name.clone()),
        ..ProductFilter::default()
    };
    let paged = ProductRepository::new(&pool)
        .list(&filter, Sort::default(), PageRequest::new(None, 25))
        .await
        .unwrap();
    assert!(paged.items.iter().any(|p| p.id == product.id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_rejects_trashed_brand() {
    let pool = test_pool().await;
    let brand = create_brand(&pool, &unique("Gone")).await;
    let category = create_category(&pool, &unique("Category")).await;
    BrandRepository::new(&pool).delete(brand.id).await.unwrap();

    let input = product_form(&unique("Orphan"), &unique("SKU"), "3.00", &brand, &category);
    let err = services::products::create(&pool, &input).await.unwrap_err();
    assert!(!field_error(err, "brand_id").is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_trashed_product_has_no_price() {
    let pool = test_pool().await;
    let product = create_product(&pool, "8.00").await;
    let repo = ProductRepository::new(&pool);
    assert!(repo.price(product.id).await.unwrap().is_some());

    repo.delete(product.id).await.unwrap();
    assert!(repo.price(product.id).await.unwrap().is_none());
}
