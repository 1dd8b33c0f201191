//! Customer domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use shopdesk_core::{CustomerId, Email};

use crate::db::{Scope, SortKey};

/// A customer.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Full name (at most 50 characters).
    pub name: String,
    /// Lower-cased, unique email.
    pub email: Email,
    /// Phone number (at most 50 characters).
    pub phone: String,
    /// Date of birth, never in the future.
    pub date_of_birth: NaiveDate,
    pub city: String,
    pub zip_code: String,
    pub address: String,
    /// Live orders placed by this customer.
    pub order_count: i64,
    /// When the customer was created.
    pub created_at: DateTime<Utc>,
    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
    /// Set when the customer is in the trash.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated customer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub city: String,
    pub zip_code: String,
    pub address: String,
}

/// Customer listing filter.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Matches name, email, phone or city.
    pub search: Option<String>,
    pub scope: Scope,
}

/// Sortable customer columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerSort {
    #[default]
    Name,
    Email,
    City,
    DateOfBirth,
    CreatedAt,
}

impl SortKey for CustomerSort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "city" => Some(Self::City),
            "date_of_birth" => Some(Self::DateOfBirth),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::City => "city",
            Self::DateOfBirth => "date_of_birth",
            Self::CreatedAt => "created_at",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "c.name",
            Self::Email => "c.email",
            Self::City => "c.city",
            Self::DateOfBirth => "c.date_of_birth",
            Self::CreatedAt => "c.created_at",
        }
    }
}
