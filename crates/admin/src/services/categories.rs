//! Category submissions.

use sqlx::PgPool;

use shopdesk_core::CategoryId;

use super::{SubmitError, check_unique, map_conflict, prepare_valid};
use crate::components::{FormInput, FormMode};
use crate::db::{CategoryRepository, Table};
use crate::models::Category;
use crate::resources::categories::{form_schema, to_input};

/// # Errors
///
/// Returns `SubmitError::Invalid` for a missing or taken name.
pub async fn create(pool: &PgPool, raw: &FormInput) -> Result<Category, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Create)?;
    check_unique(pool, Table::Category, &schema, &input, FormMode::Create, None).await?;

    let category = to_input(&input)?;
    let created = CategoryRepository::new(pool)
        .create(&category)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(id = %created.id, "category created");
    Ok(created)
}

/// # Errors
///
/// Returns `SubmitError::Invalid` for a missing or taken name, or
/// `SubmitError::Repository` with `NotFound` if the category is not live.
pub async fn update(
    pool: &PgPool,
    id: CategoryId,
    raw: &FormInput,
) -> Result<Category, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Edit)?;
    check_unique(
        pool,
        Table::Category,
        &schema,
        &input,
        FormMode::Edit,
        Some(id.as_i64()),
    )
    .await?;

    let category = to_input(&input)?;
    let updated = CategoryRepository::new(pool)
        .update(id, &category)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(%id, "category updated");
    Ok(updated)
}
