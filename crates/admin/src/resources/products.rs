//! Product screens.

use chrono::{NaiveDate, Utc};

use shopdesk_core::{BrandId, CategoryId, Price, ProductType};

use crate::components::{
    BulkAction, DataTableConfig, FieldKind, FilterOption, FormField, FormInput, FormSchema,
    ListParams, TableColumn, TableFilter, TableRow, ValidationErrors,
};
use crate::models::{Product, ProductFilter, ProductInput, SelectOption};

use super::{DetailRow, checkbox, date, enum_options, invalid, yes_no};

/// Product listing. `brands` feeds the brand select filter.
#[must_use]
pub fn table_config(brands: &[SelectOption]) -> DataTableConfig {
    let brand_options = brands
        .iter()
        .map(|b| FilterOption::new(&b.value, &b.label))
        .collect();

    DataTableConfig::new("products", "Products")
        .column(TableColumn::new("image", "Image"))
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("brand", "Brand"))
        .column(TableColumn::new("is_visible", "Visibility"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("quantity", "Quantity"))
        .column(TableColumn::sortable("published_at", "Published"))
        .column(TableColumn::new("type", "Type"))
        .filter(TableFilter::ternary(
            "is_visible",
            "Visibility",
            "Only visible products",
            "Only hidden products",
        ))
        .filter(TableFilter::ternary("is_featured", "Featured", "Yes", "No"))
        .filter(TableFilter::select("brand_id", "Brand", brand_options))
        .bulk_action(BulkAction::delete())
        .search_placeholder("Search products by name, slug, description or brand...")
        .empty_state("No products found", Some("Try adjusting your search or filters"))
}

#[must_use]
pub fn filter(params: &ListParams) -> ProductFilter {
    ProductFilter {
        search: params.search(),
        is_visible: params.ternary("is_visible"),
        is_featured: params.ternary("is_featured"),
        brand_id: params.parsed("brand_id"),
        scope: params.scope(),
    }
}

/// Product create/edit form over the live brands and categories.
#[must_use]
pub fn form_schema(brands: Vec<SelectOption>, categories: Vec<SelectOption>) -> FormSchema {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    FormSchema::new(vec![
        FormField::text("name", "name").required().unique(),
        FormField::slug("slug", "slug", "name"),
        FormField::new("description", "description", FieldKind::Markdown),
        FormField::text("sku", "SKU").required().unique(),
        FormField::new("price", "price", FieldKind::Price).required(),
        FormField::new("quantity", "quantity", FieldKind::Integer)
            .required()
            .range(0, 100),
        FormField::new("product_type", "type", FieldKind::Select)
            .required()
            .options(enum_options(&ProductType::ALL, |t| t.as_str(), |t| t.label())),
        FormField::new("is_visible", "visibility", FieldKind::Toggle)
            .default_value("on")
            .help("Enable or disable product visibility"),
        FormField::new("is_featured", "featured", FieldKind::Toggle)
            .help("Enable or disable product featured"),
        FormField::new("published_at", "availability", FieldKind::Date).default_value(today),
        FormField::text("image", "image path").help("Relative to the upload directory"),
        FormField::new("brand_id", "brand", FieldKind::Select)
            .required()
            .options(brands),
        FormField::new("category_ids", "categories", FieldKind::MultiSelect)
            .required()
            .options(categories),
    ])
}

#[must_use]
pub fn row(product: &Product) -> TableRow {
    TableRow::new(
        product.id.as_i64(),
        vec![
            product.image.clone().unwrap_or_default(),
            product.name.clone(),
            product.brand_name.clone(),
            yes_no(product.is_visible),
            product.price.to_string(),
            product.quantity.to_string(),
            date(product.published_at),
            product.product_type.label().to_string(),
        ],
        product.deleted_at.is_some(),
    )
}

#[must_use]
pub fn detail(product: &Product) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Name", &product.name),
        DetailRow::new("Slug", product.slug.as_str()),
        DetailRow::new("SKU", &product.sku),
        DetailRow::new("Brand", &product.brand_name),
        DetailRow::new("Categories", product.category_names.join(", ")),
        DetailRow::new("Price", product.price.to_string()),
        DetailRow::new("Quantity", product.quantity.to_string()),
        DetailRow::new("Type", product.product_type.label()),
        DetailRow::new("Visibility", yes_no(product.is_visible)),
        DetailRow::new("Featured", yes_no(product.is_featured)),
        DetailRow::new("Availability", date(product.published_at)),
        DetailRow::new("Image", product.image.clone().unwrap_or_default()),
        DetailRow::new("Description", product.description.clone().unwrap_or_default()),
    ]
}

#[must_use]
pub fn form_values(product: &Product) -> FormInput {
    let mut input = FormInput::from_pairs([
        ("name", product.name.clone()),
        ("slug", product.slug.as_str().to_string()),
        ("description", product.description.clone().unwrap_or_default()),
        ("sku", product.sku.clone()),
        ("price", product.price.to_string()),
        ("quantity", product.quantity.to_string()),
        ("product_type", product.product_type.as_str().to_string()),
        ("is_visible", checkbox(product.is_visible).to_string()),
        ("is_featured", checkbox(product.is_featured).to_string()),
        (
            "published_at",
            product.published_at.format("%Y-%m-%d").to_string(),
        ),
        ("image", product.image.clone().unwrap_or_default()),
        ("brand_id", product.brand_id.to_string()),
    ]);
    input.set_all(
        "category_ids",
        product.category_ids.iter().map(ToString::to_string).collect(),
    );
    input
}

/// # Errors
///
/// Returns an error naming the first field that cannot be converted.
pub fn to_input(input: &FormInput) -> Result<ProductInput, ValidationErrors> {
    let name = input.text("name").ok_or_else(|| invalid("name"))?;
    let sku = input.text("sku").ok_or_else(|| invalid("sku"))?;
    let price = Price::parse(input.value("price")).map_err(|_| invalid("price"))?;
    let quantity: i32 = input.parse("quantity").ok_or_else(|| invalid("quantity"))?;
    let product_type: ProductType = input
        .parse("product_type")
        .ok_or_else(|| invalid("product_type"))?;
    let brand_id: BrandId = input.parse("brand_id").ok_or_else(|| invalid("brand_id"))?;
    let published_at = match input.text("published_at") {
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map_err(|_| invalid("published_at"))?,
        None => Utc::now().date_naive(),
    };
    let category_ids = input
        .all("category_ids")
        .iter()
        .map(|id| id.parse::<CategoryId>().map_err(|_| invalid("category_ids")))
        .collect::<Result<Vec<_>, _>>()?;
    if category_ids.is_empty() {
        return Err(invalid("category_ids"));
    }

    Ok(ProductInput {
        brand_id,
        name,
        sku,
        description: input.text("description"),
        image: input.text("image"),
        quantity,
        price,
        product_type,
        is_visible: input.is_checked("is_visible"),
        is_featured: input.is_checked("is_featured"),
        published_at,
        category_ids,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::FormMode;

    fn schema() -> FormSchema {
        form_schema(
            vec![SelectOption::new(1, "Acme")],
            vec![SelectOption::new(10, "Shoes"), SelectOption::new(11, "Hats")],
        )
    }

    fn submission(extra: &[(&str, &str)]) -> FormInput {
        let mut pairs = vec![
            ("name", "Trail Runner 2"),
            ("sku", "TR-2"),
            ("price", "129.9"),
            ("quantity", "12"),
            ("product_type", "deliverable"),
            ("brand_id", "1"),
            ("category_ids", "10"),
            ("category_ids", "11"),
            ("is_visible", "on"),
        ];
        pairs.extend_from_slice(extra);
        FormInput::from_pairs(pairs)
    }

    #[test]
    fn test_valid_product_submission() {
        let schema = schema();
        let input = schema.prepare(&submission(&[]), FormMode::Create);
        schema.validate(&input, FormMode::Create).unwrap();

        assert_eq!(input.get("slug"), Some("trail-runner-2"));
        let product = to_input(&input).unwrap();
        assert_eq!(product.price.to_string(), "129.90");
        assert_eq!(
            product.category_ids,
            vec![CategoryId::new(10), CategoryId::new(11)]
        );
        assert!(product.is_visible);
        assert!(!product.is_featured);
        assert_eq!(product.published_at, Utc::now().date_naive());
    }

    #[test]
    fn test_quantity_bounds() {
        let schema = schema();
        for (quantity, ok) in [("0", true), ("100", true), ("-1", false), ("101", false)] {
            let mut raw = submission(&[]);
            raw.set("quantity", quantity);
            let input = schema.prepare(&raw, FormMode::Create);
            assert_eq!(schema.validate(&input, FormMode::Create).is_ok(), ok, "{quantity}");
        }
    }

    #[test]
    fn test_categories_required_and_live() {
        let schema = schema();
        let mut raw = submission(&[]);
        raw.remove("category_ids");
        let input = schema.prepare(&raw, FormMode::Create);
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("category_ids"), Some("The categories field is required."));

        raw.set("category_ids", "99");
        let input = schema.prepare(&raw, FormMode::Create);
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("category_ids"), Some("The selected categories is invalid."));
    }

    #[test]
    fn test_trashed_brand_is_not_an_option() {
        let schema = schema();
        let mut raw = submission(&[]);
        raw.set("brand_id", "2");
        let input = schema.prepare(&raw, FormMode::Create);
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("brand_id"), Some("The selected brand is invalid."));
    }

    #[test]
    fn test_price_format() {
        let schema = schema();
        let mut raw = submission(&[]);
        raw.set("price", "1234567");
        let input = schema.prepare(&raw, FormMode::Create);
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert!(errors.get("price").is_some());
    }
}
