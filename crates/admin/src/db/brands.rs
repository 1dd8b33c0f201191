//! Brand repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopdesk_core::{BrandId, Slug};

use super::{PageRequest, Paged, RepositoryError, Sort, Table, like_pattern, map_unique_violation};
use crate::models::{Brand, BrandFilter, BrandInput, BrandSort, SelectOption};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: i64,
    name: String,
    slug: String,
    url: String,
    description: Option<String>,
    is_visible: bool,
    primary_hex: Option<String>,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::new(row.id),
            name: row.name,
            slug: Slug::from_stored(row.slug),
            url: row.url,
            description: row.description,
            is_visible: row.is_visible,
            primary_hex: row.primary_hex,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const BRAND_COLUMNS: &str = r"
    b.id, b.name, b.slug, b.url, b.description, b.is_visible, b.primary_hex,
    (SELECT COUNT(*) FROM shop.product p
     WHERE p.brand_id = b.id AND p.deleted_at IS NULL) AS product_count,
    b.created_at, b.updated_at, b.deleted_at
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List brands matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &BrandFilter,
        sort: Sort<BrandSort>,
        page: PageRequest,
    ) -> Result<Paged<Brand>, RepositoryError> {
        let predicate = format!(
            "{} AND ($1::text IS NULL OR b.name ILIKE $1 OR b.url ILIKE $1) \
             AND ($2::boolean IS NULL OR b.is_visible = $2)",
            filter.scope.predicate("b")
        );
        let search = filter.search.as_deref().map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shop.brand b WHERE {predicate}"))
                .bind(&search)
                .bind(filter.is_visible)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            "SELECT {BRAND_COLUMNS} FROM shop.brand b WHERE {predicate} \
             ORDER BY {} LIMIT $3 OFFSET $4",
            sort.order_by("b")
        );
        let rows = sqlx::query_as::<_, BrandRow>(&sql)
            .bind(&search)
            .bind(filter.is_visible)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a live brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let sql = format!(
            "SELECT {BRAND_COLUMNS} FROM shop.brand b WHERE b.id = $1 AND b.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, BrandRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Live brands as select options, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn options(&self) -> Result<Vec<SelectOption>, RepositoryError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r"
            SELECT id, name FROM shop.brand
            WHERE deleted_at IS NULL
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SelectOption::new(id, name))
            .collect())
    }

    /// Create a brand with its write-once slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name or slug.
    pub async fn create(&self, input: &BrandInput, slug: &Slug) -> Result<Brand, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO shop.brand (name, slug, url, description, is_visible, primary_hex)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(slug.as_str())
        .bind(&input.url)
        .bind(&input.description)
        .bind(input.is_visible)
        .bind(&input.primary_hex)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::debug!(id, slug = %slug, "brand created");
        self.get(BrandId::new(id)).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update a live brand. The slug is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live brand has this ID.
    /// Returns `RepositoryError::Conflict` on a duplicate name.
    pub async fn update(&self, id: BrandId, input: &BrandInput) -> Result<Brand, RepositoryError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE shop.brand
            SET name = $2, url = $3, description = $4, is_visible = $5, primary_hex = $6
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            ",
        )
        .bind(id.as_i64())
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.description)
        .bind(input.is_visible)
        .bind(&input.primary_hex)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(%id, "brand updated");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft delete a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live brand has this ID.
    pub async fn delete(&self, id: BrandId) -> Result<(), RepositoryError> {
        super::soft_delete(self.pool, Table::Brand, id.as_i64()).await
    }

    /// Soft delete several brands.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete_many(&self, ids: &[BrandId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(BrandId::as_i64).collect();
        super::soft_delete_many(self.pool, Table::Brand, &ids).await
    }

    /// Restore a trashed brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no trashed brand has this ID.
    pub async fn restore(&self, id: BrandId) -> Result<(), RepositoryError> {
        super::restore(self.pool, Table::Brand, id.as_i64()).await
    }
}
