//! Brand screens.

use crate::components::{
    BulkAction, DataTableConfig, FieldKind, FormField, FormInput, FormSchema, ListParams,
    TableColumn, TableFilter, TableRow, ValidationErrors,
};
use crate::models::{Brand, BrandFilter, BrandInput};

use super::{DetailRow, checkbox, invalid, timestamp, yes_no};

/// Brand listing.
#[must_use]
pub fn table_config() -> DataTableConfig {
    DataTableConfig::new("brands", "Brands")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("url", "Website URL"))
        .column(TableColumn::new("primary_hex", "Primary Color"))
        .column(TableColumn::new("is_visible", "Visibility"))
        .column(TableColumn::sortable("updated_at", "Updated"))
        .filter(TableFilter::ternary(
            "is_visible",
            "Visibility",
            "Only visible brands",
            "Only hidden brands",
        ))
        .bulk_action(BulkAction::delete())
        .search_placeholder("Search brands by name or URL...")
        .empty_state("No brands yet", Some("Create a brand to start adding products"))
}

#[must_use]
pub fn filter(params: &ListParams) -> BrandFilter {
    BrandFilter {
        search: params.search(),
        is_visible: params.ternary("is_visible"),
        scope: params.scope(),
    }
}

/// Brand create/edit form.
#[must_use]
pub fn form_schema() -> FormSchema {
    FormSchema::new(vec![
        FormField::text("name", "name").required().unique(),
        FormField::slug("slug", "slug", "name"),
        FormField::new("url", "website URL", FieldKind::Url).required(),
        FormField::new("description", "description", FieldKind::Markdown),
        FormField::new("is_visible", "visibility", FieldKind::Toggle)
            .default_value("on")
            .help("Enable or disable brand visibility"),
        FormField::new("primary_hex", "primary color", FieldKind::Color),
    ])
}

#[must_use]
pub fn row(brand: &Brand) -> TableRow {
    TableRow::new(
        brand.id.as_i64(),
        vec![
            brand.name.clone(),
            brand.url.clone(),
            brand.primary_hex.clone().unwrap_or_default(),
            yes_no(brand.is_visible),
            timestamp(brand.updated_at),
        ],
        brand.deleted_at.is_some(),
    )
}

#[must_use]
pub fn detail(brand: &Brand) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Name", &brand.name),
        DetailRow::new("Slug", brand.slug.as_str()),
        DetailRow::new("Website URL", &brand.url),
        DetailRow::new("Description", brand.description.clone().unwrap_or_default()),
        DetailRow::new("Visibility", yes_no(brand.is_visible)),
        DetailRow::new("Primary color", brand.primary_hex.clone().unwrap_or_default()),
        DetailRow::new("Products", brand.product_count.to_string()),
        DetailRow::new("Created", timestamp(brand.created_at)),
    ]
}

/// Stored values for the edit form, slug included for display.
#[must_use]
pub fn form_values(brand: &Brand) -> FormInput {
    FormInput::from_pairs([
        ("name", brand.name.clone()),
        ("slug", brand.slug.as_str().to_string()),
        ("url", brand.url.clone()),
        ("description", brand.description.clone().unwrap_or_default()),
        ("is_visible", checkbox(brand.is_visible).to_string()),
        ("primary_hex", brand.primary_hex.clone().unwrap_or_default()),
    ])
}

/// Typed brand fields from a prepared, validated submission.
///
/// # Errors
///
/// Returns an error for a required field that is missing.
pub fn to_input(input: &FormInput) -> Result<BrandInput, ValidationErrors> {
    let Some(name) = input.text("name") else {
        return Err(invalid("name"));
    };
    let Some(url) = input.text("url") else {
        return Err(invalid("url"));
    };

    Ok(BrandInput {
        name,
        url,
        description: input.text("description"),
        is_visible: input.is_checked("is_visible"),
        primary_hex: input.text("primary_hex"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::FormMode;

    #[test]
    fn test_create_submission_round_trip() {
        let schema = form_schema();
        let raw = FormInput::from_pairs([
            ("name", " Nike "),
            ("slug", "whatever"),
            ("url", "https://nike.com"),
            ("is_visible", "on"),
            ("primary_hex", ""),
        ]);
        let input = schema.prepare(&raw, FormMode::Create);
        schema.validate(&input, FormMode::Create).unwrap();

        assert_eq!(input.get("slug"), Some("nike"));
        let brand = to_input(&input).unwrap();
        assert_eq!(brand.name, "Nike");
        assert!(brand.is_visible);
        assert_eq!(brand.primary_hex, None);
        assert_eq!(brand.description, None);
    }

    #[test]
    fn test_url_must_be_absolute() {
        let schema = form_schema();
        let input = schema.prepare(
            &FormInput::from_pairs([("name", "Nike"), ("url", "nike.com")]),
            FormMode::Create,
        );
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("url"), Some("The website URL must be a valid URL."));
    }

    #[test]
    fn test_unchecked_visibility_is_false() {
        let input = FormInput::from_pairs([("name", "Nike"), ("url", "https://nike.com")]);
        assert!(!to_input(&input).unwrap().is_visible);
    }

    #[test]
    fn test_table_config_sortable_columns() {
        let config = table_config();
        assert!(config.is_sortable("name"));
        assert!(config.is_sortable("updated_at"));
        assert!(!config.is_sortable("primary_hex"));
        assert!(config.has_bulk_actions);
    }
}
