//! Domain models for the back-office.
//!
//! Each entity has a read model (what repositories return), an input model
//! (what a validated form submission produces), a listing filter and a
//! sortable-column enum.

pub mod brand;
pub mod category;
pub mod customer;
pub mod order;
pub mod product;

pub use brand::{Brand, BrandFilter, BrandInput, BrandSort};
pub use category::{Category, CategoryFilter, CategoryInput, CategorySort};
pub use customer::{Customer, CustomerFilter, CustomerInput, CustomerSort};
pub use order::{
    Order, OrderExportRow, OrderFilter, OrderInput, OrderItem, OrderItemInput, OrderSort,
    OrderSummary,
};
pub use product::{Product, ProductFilter, ProductInput, ProductOption, ProductSort};

/// A `(value, label)` pair for relation selects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}
