//! Category screens.

use crate::components::{
    BulkAction, DataTableConfig, FormField, FormInput, FormSchema, ListParams, TableColumn,
    TableRow, ValidationErrors,
};
use crate::models::{Category, CategoryFilter, CategoryInput};

use super::{DetailRow, invalid, timestamp};

#[must_use]
pub fn table_config() -> DataTableConfig {
    DataTableConfig::new("categories", "Categories")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("products", "Products"))
        .column(TableColumn::sortable("created_at", "Created"))
        .bulk_action(BulkAction::delete())
        .search_placeholder("Search categories...")
        .empty_state("No categories yet", None)
}

#[must_use]
pub fn filter(params: &ListParams) -> CategoryFilter {
    CategoryFilter {
        search: params.search(),
        scope: params.scope(),
    }
}

#[must_use]
pub fn form_schema() -> FormSchema {
    FormSchema::new(vec![FormField::text("name", "name").required().unique()])
}

#[must_use]
pub fn row(category: &Category) -> TableRow {
    TableRow::new(
        category.id.as_i64(),
        vec![
            category.name.clone(),
            category.product_count.to_string(),
            timestamp(category.created_at),
        ],
        category.deleted_at.is_some(),
    )
}

#[must_use]
pub fn detail(category: &Category) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Name", &category.name),
        DetailRow::new("Products", category.product_count.to_string()),
        DetailRow::new("Created", timestamp(category.created_at)),
    ]
}

#[must_use]
pub fn form_values(category: &Category) -> FormInput {
    FormInput::from_pairs([("name", category.name.clone())])
}

/// # Errors
///
/// Returns an error if the name is missing.
pub fn to_input(input: &FormInput) -> Result<CategoryInput, ValidationErrors> {
    let name = input.text("name").ok_or_else(|| invalid("name"))?;
    Ok(CategoryInput { name })
}
