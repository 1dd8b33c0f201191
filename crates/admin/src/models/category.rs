//! Category domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopdesk_core::CategoryId;

use crate::db::{Scope, SortKey};

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Live products linked to this category.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub search: Option<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySort {
    #[default]
    Name,
    CreatedAt,
}

impl SortKey for CategorySort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "c.name",
            Self::CreatedAt => "c.created_at",
        }
    }
}
