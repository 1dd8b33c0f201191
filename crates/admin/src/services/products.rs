//! Product submissions.

use sqlx::PgPool;

use shopdesk_core::{ProductId, Slug};

use super::{SubmitError, check_unique, map_conflict, prepare_valid};
use crate::components::{FormInput, FormMode, FormSchema};
use crate::db::{BrandRepository, CategoryRepository, ProductRepository, RepositoryError, Table};
use crate::models::Product;
use crate::resources::products::{form_schema, to_input};

/// Product form over the currently live brands and categories.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the options cannot be loaded.
pub async fn load_schema(pool: &PgPool) -> Result<FormSchema, RepositoryError> {
    let brands = BrandRepository::new(pool).options().await?;
    let categories = CategoryRepository::new(pool).options().await?;
    Ok(form_schema(brands, categories))
}

/// Create a product with its category links, deriving the slug from the name.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, including a taken name,
/// slug or SKU, or a brand or category that is not live.
pub async fn create(pool: &PgPool, raw: &FormInput) -> Result<Product, SubmitError> {
    let schema = load_schema(pool).await?;
    let input = prepare_valid(&schema, raw, FormMode::Create)?;
    check_unique(pool, Table::Product, &schema, &input, FormMode::Create, None).await?;

    let product = to_input(&input)?;
    let slug = Slug::derive(&product.name);
    let created = ProductRepository::new(pool)
        .create(&product, &slug)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(id = %created.id, slug = %created.slug, "product created");
    Ok(created)
}

/// Update a product and replace its category links. The slug is kept.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for field errors, or
/// `SubmitError::Repository` with `NotFound` if the product is not live.
pub async fn update(pool: &PgPool, id: ProductId, raw: &FormInput) -> Result<Product, SubmitError> {
    let schema = load_schema(pool).await?;
    let input = prepare_valid(&schema, raw, FormMode::Edit)?;
    check_unique(
        pool,
        Table::Product,
        &schema,
        &input,
        FormMode::Edit,
        Some(id.as_i64()),
    )
    .await?;

    let product = to_input(&input)?;
    let updated = ProductRepository::new(pool)
        .update(id, &product)
        .await
        .map_err(|e| map_conflict(e, &schema))?;

    tracing::info!(%id, "product updated");
    Ok(updated)
}
