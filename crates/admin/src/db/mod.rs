//! Database operations for the back-office `PostgreSQL` schema.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `brand` - Brands; own many products
//! - `category` - Product categories
//! - `product` - Catalog products
//! - `category_product` - Product/category links
//! - `customer` - Customers
//! - `orders` - Orders (number from `order_number_seq`)
//! - `order_item` - Order lines, cascade with their order
//!
//! Every primary table has a `deleted_at` column. Every read in this module
//! states its soft-delete predicate explicitly; nothing filters implicitly.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p shopdesk-cli -- migrate
//! ```

pub mod brands;
pub mod categories;
pub mod customers;
pub mod orders;
pub mod products;
pub mod stats;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use brands::BrandRepository;
pub use categories::CategoryRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; holds the constraint name
    /// (e.g. `product_sku_key`).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Column named by a `{table}_{column}_key` conflict, if any.
    #[must_use]
    pub fn conflicting_column(&self) -> Option<&str> {
        match self {
            Self::Conflict(constraint) => constraint
                .strip_suffix("_key")
                .and_then(|rest| rest.split_once('_'))
                .map(|(_, column)| column),
            _ => None,
        }
    }
}

/// Map a unique-violation into [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(db_err.constraint().unwrap_or("unique").to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Listing helpers
// =============================================================================

/// Which rows a listing reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Rows that are not soft-deleted.
    #[default]
    Live,
    /// Soft-deleted rows only (the trash view).
    Trashed,
}

impl Scope {
    /// Parse the `trashed` query parameter.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("1" | "true" | "only") => Self::Trashed,
            _ => Self::Live,
        }
    }

    /// SQL predicate over an aliased table.
    #[must_use]
    pub fn predicate(self, alias: &str) -> String {
        match self {
            Self::Live => format!("{alias}.deleted_at IS NULL"),
            Self::Trashed => format!("{alias}.deleted_at IS NOT NULL"),
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse the `dir` query parameter; anything but `desc` sorts ascending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction, for header toggle links.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A whitelisted sortable column of one listing.
pub trait SortKey: Sized + Copy + Default {
    /// Parse the `sort` query parameter.
    fn from_key(key: &str) -> Option<Self>;

    /// Query parameter value.
    fn key(self) -> &'static str;

    /// SQL expression to order by. Only static strings reach `ORDER BY`.
    fn column(self) -> &'static str;
}

/// A parsed `sort`/`dir` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: SortKey> Sort<K> {
    /// Parse query parameters, falling back to the key's default for unknown
    /// columns.
    #[must_use]
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        Self {
            key: sort.and_then(K::from_key).unwrap_or_default(),
            direction: SortDirection::from_param(dir),
        }
    }

    /// `ORDER BY` body, with `id` as a tiebreaker for stable pages.
    #[must_use]
    pub fn order_by(&self, alias: &str) -> String {
        format!(
            "{} {}, {alias}.id {}",
            self.key.column(),
            self.direction.sql(),
            self.direction.sql()
        )
    }
}

/// A page request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Build a request, clamping the page to at least 1.
    #[must_use]
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    /// Row offset for `OFFSET`, saturating for out-of-range pages.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of a listing plus the total matching count.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Paged<T> {
    /// Number of pages (at least 1).
    #[must_use]
    pub const fn page_count(&self) -> i64 {
        if self.total <= 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Soft delete
// =============================================================================

/// Move a live row to the trash.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no live row has this ID.
pub async fn soft_delete(pool: &PgPool, table: Table, id: i64) -> Result<(), RepositoryError> {
    let sql = format!(
        "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        table.name()
    );
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    tracing::debug!(table = table.name(), id, "soft deleted");
    Ok(())
}

/// Move many live rows to the trash, returning how many were affected.
///
/// IDs that are unknown or already trashed are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn soft_delete_many(
    pool: &PgPool,
    table: Table,
    ids: &[i64],
) -> Result<u64, RepositoryError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE {} SET deleted_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL",
        table.name()
    );
    let result = sqlx::query(&sql).bind(ids).execute(pool).await?;
    tracing::debug!(table = table.name(), count = result.rows_affected(), "bulk soft deleted");
    Ok(result.rows_affected())
}

/// Take a row out of the trash.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no trashed row has this ID.
pub async fn restore(pool: &PgPool, table: Table, id: i64) -> Result<(), RepositoryError> {
    let sql = format!(
        "UPDATE {} SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        table.name()
    );
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    tracing::debug!(table = table.name(), id, "restored");
    Ok(())
}

// =============================================================================
// Uniqueness
// =============================================================================

/// Primary tables: soft-deletable, some with unique user-entered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Brand,
    Category,
    Product,
    Customer,
    Order,
}

impl Table {
    /// Qualified table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brand => "shop.brand",
            Self::Category => "shop.category",
            Self::Product => "shop.product",
            Self::Customer => "shop.customer",
            Self::Order => "shop.orders",
        }
    }

    /// Columns carrying a UNIQUE constraint.
    #[must_use]
    pub const fn unique_columns(self) -> &'static [&'static str] {
        match self {
            Self::Brand => &["name", "slug"],
            Self::Category => &["name"],
            Self::Product => &["name", "slug", "sku"],
            Self::Customer => &["email"],
            Self::Order => &[],
        }
    }
}

/// Whether `value` is already used in `table.column` by a row other than
/// `exclude`.
///
/// Trashed rows count: the constraint is table-wide. Columns outside
/// [`Table::unique_columns`] are never reported as taken.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn is_taken(
    pool: &PgPool,
    table: Table,
    column: &str,
    value: &str,
    exclude: Option<i64>,
) -> Result<bool, RepositoryError> {
    let Some(column) = table.unique_columns().iter().find(|c| **c == column) else {
        return Ok(false);
    };

    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE {column} = $1 AND ($2::bigint IS NULL OR id <> $2))",
        table.name()
    );
    let taken: bool = sqlx::query_scalar(&sql)
        .bind(value)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
    Ok(taken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_column() {
        let err = RepositoryError::Conflict("product_sku_key".to_string());
        assert_eq!(err.conflicting_column(), Some("sku"));

        let err = RepositoryError::Conflict("customer_email_key".to_string());
        assert_eq!(err.conflicting_column(), Some("email"));

        let err = RepositoryError::Conflict("orders_number_key".to_string());
        assert_eq!(err.conflicting_column(), Some("number"));

        assert_eq!(RepositoryError::NotFound.conflicting_column(), None);
        assert_eq!(
            RepositoryError::Conflict("unique".to_string()).conflicting_column(),
            None
        );
    }

    #[test]
    fn test_scope_from_param() {
        assert_eq!(Scope::from_param(None), Scope::Live);
        assert_eq!(Scope::from_param(Some("")), Scope::Live);
        assert_eq!(Scope::from_param(Some("only")), Scope::Trashed);
        assert_eq!(Scope::Live.predicate("p"), "p.deleted_at IS NULL");
        assert_eq!(Scope::Trashed.predicate("b"), "b.deleted_at IS NOT NULL");
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_param(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("sideways")), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.flipped().sql(), "DESC");
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), 25);
        assert_eq!(req.page, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(PageRequest::new(Some(3), 25).offset(), 50);
    }

    #[test]
    fn test_page_request_huge_page_saturates() {
        assert_eq!(PageRequest::new(Some(i64::MAX), 25).offset(), i64::MAX);
        assert_eq!(PageRequest::new(Some(i64::MAX), 1).offset(), i64::MAX - 1);
    }

    #[test]
    fn test_paged_counts() {
        let paged = Paged::<()> {
            items: vec![],
            total: 51,
            page: 2,
            per_page: 25,
        };
        assert_eq!(paged.page_count(), 3);
        assert!(paged.has_next());
        assert!(paged.has_prev());

        let empty = Paged::<()> {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 25,
        };
        assert_eq!(empty.page_count(), 1);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_unique_columns_whitelist() {
        assert!(Table::Product.unique_columns().contains(&"sku"));
        assert!(!Table::Customer.unique_columns().contains(&"name"));
    }
}
