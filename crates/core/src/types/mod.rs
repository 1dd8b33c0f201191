//! Core types for Shopdesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod monthly;
pub mod order_number;
pub mod price;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use monthly::{MONTH_LABELS, MonthlyChart, MonthlySeries};
pub use order_number::OrderNumber;
pub use price::{LineItem, Price, PriceError, line_total};
pub use slug::Slug;
pub use status::*;
