//! Integration tests for customers.
//!
//! Require a `PostgreSQL` database in `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use shopdesk_admin::db::CustomerRepository;
use shopdesk_admin::services::{self, SubmitError};
use shopdesk_integration_tests::{create_customer, customer_form, test_pool, unique};

fn errors_of(err: SubmitError) -> shopdesk_admin::components::ValidationErrors {
    match err {
        SubmitError::Invalid(errors) => errors,
        SubmitError::Repository(err) => panic!("expected validation errors, got {err}"),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_email_is_stored_lower_case() {
    let pool = test_pool().await;
    let local = unique("Mixed").replace(' ', ".");
    let email = format!("{local}@Example.COM");

    let customer = services::customers::create(&pool, &customer_form("Ada", &email))
        .await
        .unwrap();
    assert_eq!(customer.email.as_str(), email.to_lowercase());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_email_uniqueness_ignores_case() {
    let pool = test_pool().await;
    let existing = create_customer(&pool).await;
    let shouted = existing.email.as_str().to_uppercase();

    let err = services::customers::create(&pool, &customer_form("Twin", &shouted))
        .await
        .unwrap_err();
    assert_eq!(
        errors_of(err).get("email"),
        Some("The email address has already been taken.")
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_birth_date_in_future_is_rejected() {
    let pool = test_pool().await;
    let tomorrow = (Utc::now().date_naive() + Duration::days(1)).to_string();
    let email = format!("{}@example.com", unique("future").replace(' ', "."));
    let mut input = customer_form("Marty", &email);
    input.set("date_of_birth", tomorrow);

    let err = services::customers::create(&pool, &input).await.unwrap_err();
    assert!(errors_of(err).get("date_of_birth").is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_customer_edit_keeps_own_email() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;

    let mut input = customer_form("New Name", customer.email.as_str());
    input.set("city", "Shelbyville");
    let updated = services::customers::update(&pool, customer.id, &input)
        .await
        .unwrap();
    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.city, "Shelbyville");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_soft_deleted_customer_is_hidden() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let repo = CustomerRepository::new(&pool);

    repo.delete(customer.id).await.unwrap();
    assert!(repo.get(customer.id).await.unwrap().is_none());
    let options = repo.options().await.unwrap();
    assert!(!options.iter().any(|o| o.value == customer.id.to_string()));
}
