//! Form submission services.
//!
//! Every create/update runs the same pipeline:
//!
//! 1. load the live options the form's selects may reference,
//! 2. prepare and validate the submission against the resource schema,
//! 3. check unique fields against the database, ignoring the edited record,
//! 4. persist through the repository, mapping a UNIQUE violation at commit
//!    back to the same field error.
//!
//! Nothing is written when any step before persistence fails.
//!
//! # Services
//!
//! - `brands`, `categories`, `customers`, `products`, `orders`

pub mod brands;
pub mod categories;
pub mod customers;
pub mod orders;
pub mod products;

use sqlx::PgPool;
use thiserror::Error;

use crate::components::{FormInput, FormMode, FormSchema, ValidationErrors};
use crate::db::{RepositoryError, Table, is_taken};

/// Errors from a form submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The submission is invalid; re-render the form with these errors.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Persistence failed for a reason the user cannot fix.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Prepare and validate a submission.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` with per-field errors.
pub fn prepare_valid(
    schema: &FormSchema,
    raw: &FormInput,
    mode: FormMode,
) -> Result<FormInput, SubmitError> {
    let input = schema.prepare(raw, mode);
    schema.validate(&input, mode)?;
    Ok(input)
}

/// Check every unique field of `schema` against `table`.
///
/// `exclude` is the ID of the record being edited. Trashed rows count, since
/// the database constraint covers them too.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` listing each taken field, or
/// `SubmitError::Repository` if a lookup fails.
pub async fn check_unique(
    pool: &PgPool,
    table: Table,
    schema: &FormSchema,
    input: &FormInput,
    mode: FormMode,
    exclude: Option<i64>,
) -> Result<(), SubmitError> {
    let mut errors = ValidationErrors::new();
    for field in schema.unique_fields(mode) {
        let value = input.value(field.key);
        if value.is_empty() {
            continue;
        }
        if is_taken(pool, table, field.key, value, exclude).await? {
            errors.add(field.key, taken_message(field.label));
        }
    }
    errors.into_result().map_err(SubmitError::Invalid)
}

/// Map a UNIQUE violation raised at commit onto the matching form field.
#[must_use]
pub fn map_conflict(err: RepositoryError, schema: &FormSchema) -> SubmitError {
    let field = err
        .conflicting_column()
        .and_then(|column| schema.field(column));
    match field {
        Some(field) => {
            tracing::debug!(field = field.key, "unique violation at commit");
            let mut errors = ValidationErrors::new();
            errors.add(field.key, taken_message(field.label));
            SubmitError::Invalid(errors)
        }
        None => SubmitError::Repository(err),
    }
}

fn taken_message(label: &str) -> String {
    format!("The {label} has already been taken.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::FormField;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FormField::text("name", "name").required().unique(),
            FormField::text("sku", "SKU").required().unique(),
        ])
    }

    #[test]
    fn test_map_conflict_names_field() {
        let err = map_conflict(RepositoryError::Conflict("product_sku_key".into()), &schema());
        let SubmitError::Invalid(errors) = err else {
            panic!("expected a field error");
        };
        assert_eq!(errors.get("sku"), Some("The SKU has already been taken."));
    }

    #[test]
    fn test_map_conflict_unknown_constraint_passes_through() {
        let err = map_conflict(RepositoryError::Conflict("orders_number_key".into()), &schema());
        assert!(matches!(
            err,
            SubmitError::Repository(RepositoryError::Conflict(_))
        ));

        let err = map_conflict(RepositoryError::NotFound, &schema());
        assert!(matches!(err, SubmitError::Repository(RepositoryError::NotFound)));
    }

    #[test]
    fn test_prepare_valid_rejects_missing() {
        let err = prepare_valid(&schema(), &FormInput::default(), FormMode::Create).unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(e) if e.len() == 2));
    }
}
