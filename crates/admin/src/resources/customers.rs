//! Customer screens.

use chrono::NaiveDate;

use shopdesk_core::Email;

use crate::components::{
    BulkAction, DataTableConfig, FieldKind, FormField, FormInput, FormSchema, ListParams,
    TableColumn, TableRow, ValidationErrors,
};
use crate::models::{Customer, CustomerFilter, CustomerInput};

use super::{DetailRow, date, invalid, timestamp};

/// Column limit shared by `name` and `phone`.
pub const SHORT_TEXT_MAX: usize = 50;

#[must_use]
pub fn table_config() -> DataTableConfig {
    DataTableConfig::new("customers", "Customers")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::sortable("city", "City"))
        .column(TableColumn::sortable("date_of_birth", "Date of birth"))
        .bulk_action(BulkAction::delete())
        .search_placeholder("Search customers by name, email, phone or city...")
        .empty_state("No customers found", Some("Try adjusting your search"))
}

#[must_use]
pub fn filter(params: &ListParams) -> CustomerFilter {
    CustomerFilter {
        search: params.search(),
        scope: params.scope(),
    }
}

#[must_use]
pub fn form_schema() -> FormSchema {
    FormSchema::new(vec![
        FormField::text("name", "name")
            .required()
            .max_length(SHORT_TEXT_MAX),
        FormField::new("email", "email address", FieldKind::Email)
            .required()
            .unique()
            .max_length(Email::MAX_LENGTH),
        FormField::text("phone", "phone")
            .required()
            .max_length(SHORT_TEXT_MAX),
        FormField::new("date_of_birth", "date of birth", FieldKind::Date)
            .required()
            .not_in_future(),
        FormField::text("city", "city").required(),
        FormField::text("zip_code", "zip code").required(),
        FormField::text("address", "address").required(),
    ])
}

#[must_use]
pub fn row(customer: &Customer) -> TableRow {
    TableRow::new(
        customer.id.as_i64(),
        vec![
            customer.name.clone(),
            customer.email.to_string(),
            customer.phone.clone(),
            customer.city.clone(),
            date(customer.date_of_birth),
        ],
        customer.deleted_at.is_some(),
    )
}

#[must_use]
pub fn detail(customer: &Customer) -> Vec<DetailRow> {
    vec![
        DetailRow::new("Name", &customer.name),
        DetailRow::new("Email", customer.email.as_str()),
        DetailRow::new("Phone", &customer.phone),
        DetailRow::new("Date of birth", date(customer.date_of_birth)),
        DetailRow::new("Address", &customer.address),
        DetailRow::new("City", &customer.city),
        DetailRow::new("Zip code", &customer.zip_code),
        DetailRow::new("Orders", customer.order_count.to_string()),
        DetailRow::new("Customer since", timestamp(customer.created_at)),
    ]
}

#[must_use]
pub fn form_values(customer: &Customer) -> FormInput {
    FormInput::from_pairs([
        ("name", customer.name.clone()),
        ("email", customer.email.to_string()),
        ("phone", customer.phone.clone()),
        ("date_of_birth", customer.date_of_birth.format("%Y-%m-%d").to_string()),
        ("city", customer.city.clone()),
        ("zip_code", customer.zip_code.clone()),
        ("address", customer.address.clone()),
    ])
}

/// # Errors
///
/// Returns an error naming the first field that cannot be converted.
pub fn to_input(input: &FormInput) -> Result<CustomerInput, ValidationErrors> {
    let required = |key: &str| input.text(key).ok_or_else(|| invalid(key));

    let email = Email::parse(input.value("email")).map_err(|_| invalid("email"))?;
    let date_of_birth = NaiveDate::parse_from_str(input.value("date_of_birth"), "%Y-%m-%d")
        .map_err(|_| invalid("date_of_birth"))?;

    Ok(CustomerInput {
        name: required("name")?,
        email,
        phone: required("phone")?,
        date_of_birth,
        city: required("city")?,
        zip_code: required("zip_code")?,
        address: required("address")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::FormMode;

    fn submission(name: &str, email: &str, born: &str) -> FormInput {
        FormInput::from_pairs([
            ("name", name),
            ("email", email),
            ("phone", "+1 555 0100"),
            ("date_of_birth", born),
            ("city", "Lisbon"),
            ("zip_code", "1000-001"),
            ("address", "Rua Augusta 1"),
        ])
    }

    #[test]
    fn test_email_is_lowercased_before_storage() {
        let schema = form_schema();
        let input = schema.prepare(
            &submission("Ada", "Ada@Example.com", "1990-12-10"),
            FormMode::Create,
        );
        schema.validate(&input, FormMode::Create).unwrap();
        let customer = to_input(&input).unwrap();
        assert_eq!(customer.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_name_limited_to_fifty_characters() {
        let schema = form_schema();
        let name = "x".repeat(51);
        let input = schema.prepare(&submission(&name, "a@b.co", "1990-01-01"), FormMode::Edit);
        let errors = schema.validate(&input, FormMode::Edit).unwrap_err();
        assert!(errors.get("name").is_some());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let schema = form_schema();
        let input = schema.prepare(&submission("Ada", "a@b.co", "2999-01-01"), FormMode::Create);
        let errors = schema.validate(&input, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.get("date_of_birth"),
            Some("The date of birth cannot be in the future.")
        );
    }
}
