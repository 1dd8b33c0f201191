//! Customer submissions.

use sqlx::PgPool;

use shopdesk_core::CustomerId;

use super::{SubmitError, check_unique, map_conflict, prepare_valid};
use crate::components::{FormInput, FormMode};
use crate::db::{CustomerRepository, Table};
use crate::models::Customer;
use crate::resources::customers::{form_schema, to_input};

/// Create a customer. The email is lowercased before the uniqueness check.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, including a taken email.
pub async fn create(pool: &PgPool, raw: &FormInput) -> Result<Customer, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Create)?;
    check_unique(pool, Table::Customer, &schema, &input, FormMode::Create, None).await?;

    let customer = to_input(&input)?;
    let created = CustomerRepository::new(pool)
        .create(&customer)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(id = %created.id, "customer created");
    Ok(created)
}

/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, or
/// `SubmitError::Repository` with `NotFound` if the customer is not live.
pub async fn update(
    pool: &PgPool,
    id: CustomerId,
    raw: &FormInput,
) -> Result<Customer, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Edit)?;
    check_unique(
        pool,
        Table::Customer,
        &schema,
        &input,
        FormMode::Edit,
        Some(id.as_i64()),
    )
    .await?;

    let customer = to_input(&input)?;
    let updated = CustomerRepository::new(pool)
        .update(id, &customer)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(%id, "customer updated");
    Ok(updated)
}
