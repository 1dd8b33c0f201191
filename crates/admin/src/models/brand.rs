//! Brand domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopdesk_core::{BrandId, Slug};

use crate::db::{Scope, SortKey};

/// A brand. Owns many products.
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    /// Derived from `name` at creation; never rewritten.
    pub slug: Slug,
    /// Absolute http(s) URL of the brand's website.
    pub url: String,
    /// Markdown source.
    pub description: Option<String>,
    pub is_visible: bool,
    /// `#RRGGBB`.
    pub primary_hex: Option<String>,
    /// Live products of this brand.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated brand fields. The slug is not part of this struct: it is passed
/// to `create` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandInput {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub is_visible: bool,
    pub primary_hex: Option<String>,
}

/// Brand listing filter.
#[derive(Debug, Clone, Default)]
pub struct BrandFilter {
    /// Matches name or URL.
    pub search: Option<String>,
    pub is_visible: Option<bool>,
    pub scope: Scope,
}

/// Sortable brand columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrandSort {
    #[default]
    Name,
    Url,
    UpdatedAt,
}

impl SortKey for BrandSort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "url" => Some(Self::Url),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Url => "url",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "b.name",
            Self::Url => "b.url",
            Self::UpdatedAt => "b.updated_at",
        }
    }
}
