//! Reusable screen descriptors shared by every resource.

pub mod data_table;
pub mod form;

pub use data_table::{
    BulkAction, DataTableConfig, FilterOption, FilterType, ListParams, TableColumn, TableFilter,
    TableRow, TableView,
};
pub use form::{
    Derivation, FieldKind, FieldView, FormField, FormInput, FormMode, FormSchema, ValidationErrors,
};
