//! Brand submissions.

use sqlx::PgPool;

use shopdesk_core::{BrandId, Slug};

use super::{SubmitError, check_unique, map_conflict, prepare_valid};
use crate::components::{FormInput, FormMode};
use crate::db::{BrandRepository, Table};
use crate::models::Brand;
use crate::resources::brands::{form_schema, to_input};

/// Create a brand, deriving its slug from the name.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, including a taken name or
/// slug.
pub async fn create(pool: &PgPool, raw: &FormInput) -> Result<Brand, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Create)?;
    check_unique(pool, Table::Brand, &schema, &input, FormMode::Create, None).await?;

    let brand = to_input(&input)?;
    let slug = Slug::derive(&brand.name);
    let created = BrandRepository::new(pool)
        .create(&brand, &slug)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(id = %created.id, slug = %created.slug, "brand created");
    Ok(created)
}

/// Update a brand. The slug is never rewritten.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, or
/// `SubmitError::Repository` with `NotFound` if the brand is not live.
pub async fn update(pool: &PgPool, id: BrandId, raw: &FormInput) -> Result<Brand, SubmitError> {
    let schema = form_schema();
    let input = prepare_valid(&schema, raw, FormMode::Edit)?;
    check_unique(
        pool,
        Table::Brand,
        &schema,
        &input,
        FormMode::Edit,
        Some(id.as_i64()),
    )
    .await?;

    let brand = to_input(&input)?;
    let updated = BrandRepository::new(pool)
        .update(id, &brand)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(%id, "brand updated");
    Ok(updated)
}
