//! Product domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use shopdesk_core::{BrandId, CategoryId, Price, ProductId, ProductType, Slug};

use crate::db::{Scope, SortKey};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning brand.
    pub brand_id: BrandId,
    /// Owning brand's name, for display.
    pub brand_name: String,
    pub name: String,
    /// Derived from `name` at creation; never rewritten.
    pub slug: Slug,
    /// Stock keeping unit, unique across products.
    pub sku: String,
    /// Markdown source.
    pub description: Option<String>,
    /// Path relative to the upload directory.
    pub image: Option<String>,
    /// Units in stock, 0-100.
    pub quantity: i32,
    pub price: Price,
    pub product_type: ProductType,
    pub is_visible: bool,
    pub is_featured: bool,
    pub published_at: NaiveDate,
    /// Linked live categories, ordered by name.
    pub category_ids: Vec<CategoryId>,
    pub category_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated product fields. The slug is passed to `create` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub brand_id: BrandId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: Price,
    pub product_type: ProductType,
    pub is_visible: bool,
    pub is_featured: bool,
    pub published_at: NaiveDate,
    /// Never empty once validated.
    pub category_ids: Vec<CategoryId>,
}

/// A product choice for order lines: ID, name and current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOption {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
}

/// Product listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matches name, slug, description or brand name.
    pub search: Option<String>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
    pub brand_id: Option<BrandId>,
    pub scope: Scope,
}

/// Sortable product columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    Brand,
    Price,
    Quantity,
    PublishedAt,
    CreatedAt,
}

impl SortKey for ProductSort {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "brand" => Some(Self::Brand),
            "price" => Some(Self::Price),
            "quantity" => Some(Self::Quantity),
            "published_at" => Some(Self::PublishedAt),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::PublishedAt => "published_at",
            Self::CreatedAt => "created_at",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Brand => "b.name",
            Self::Price => "p.price",
            Self::Quantity => "p.quantity",
            Self::PublishedAt => "p.published_at",
            Self::CreatedAt => "p.created_at",
        }
    }
}
