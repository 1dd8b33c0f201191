//! Product repository.
//!
//! Products and their category links are written in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use shopdesk_core::{BrandId, CategoryId, Price, ProductId, ProductType, Slug};

use super::{PageRequest, Paged, RepositoryError, Sort, Table, like_pattern, map_unique_violation};
use crate::models::{Product, ProductFilter, ProductInput, ProductOption, ProductSort};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    brand_id: i64,
    brand_name: String,
    name: String,
    slug: String,
    sku: String,
    description: Option<String>,
    image: Option<String>,
    quantity: i32,
    price: Price,
    product_type: ProductType,
    is_visible: bool,
    is_featured: bool,
    published_at: NaiveDate,
    category_ids: Vec<i64>,
    category_names: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            brand_id: BrandId::new(row.brand_id),
            brand_name: row.brand_name,
            name: row.name,
            slug: Slug::from_stored(row.slug),
            sku: row.sku,
            description: row.description,
            image: row.image,
            quantity: row.quantity,
            price: row.price,
            product_type: row.product_type,
            is_visible: row.is_visible,
            is_featured: row.is_featured,
            published_at: row.published_at,
            category_ids: row.category_ids.into_iter().map(CategoryId::new).collect(),
            category_names: row.category_names,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = r"
    p.id, p.brand_id, b.name AS brand_name, p.name, p.slug, p.sku, p.description,
    p.image, p.quantity, p.price, p.product_type, p.is_visible, p.is_featured,
    p.published_at,
    ARRAY(SELECT c.id FROM shop.category_product cp
          JOIN shop.category c ON c.id = cp.category_id
          WHERE cp.product_id = p.id AND c.deleted_at IS NULL
          ORDER BY c.name) AS category_ids,
    ARRAY(SELECT c.name FROM shop.category_product cp
          JOIN shop.category c ON c.id = cp.category_id
          WHERE cp.product_id = p.id AND c.deleted_at IS NULL
          ORDER BY c.name) AS category_names,
    p.created_at, p.updated_at, p.deleted_at
";

const PRODUCT_FROM: &str = "shop.product p JOIN shop.brand b ON b.id = p.brand_id";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: Sort<ProductSort>,
        page: PageRequest,
    ) -> Result<Paged<Product>, RepositoryError> {
        let predicate = format!(
            "{} AND ($1::text IS NULL OR p.name ILIKE $1 OR p.slug ILIKE $1 \
             OR p.description ILIKE $1 OR b.name ILIKE $1) \
             AND ($2::boolean IS NULL OR p.is_visible = $2) \
             AND ($3::boolean IS NULL OR p.is_featured = $3) \
             AND ($4::bigint IS NULL OR p.brand_id = $4)",
            filter.scope.predicate("p")
        );
        let search = filter.search.as_deref().map(like_pattern);
        let brand_id = filter.brand_id.map(|id| id.as_i64());

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {PRODUCT_FROM} WHERE {predicate}"))
                .bind(&search)
                .bind(filter.is_visible)
                .bind(filter.is_featured)
                .bind(brand_id)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_FROM} WHERE {predicate} \
             ORDER BY {} LIMIT $5 OFFSET $6",
            sort.order_by("p")
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&search)
            .bind(filter.is_visible)
            .bind(filter.is_featured)
            .bind(brand_id)
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

    /// Get a live product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_FROM} WHERE p.id = $1 AND p.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Current price of a live product; the source of order line snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn price(&self, id: ProductId) -> Result<Option<Price>, RepositoryError> {
        let price: Option<Price> = sqlx::query_scalar(
            "SELECT price FROM shop.product WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;
        Ok(price)
    }

    /// Live products with their current prices, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn options(&self) -> Result<Vec<ProductOption>, RepositoryError> {
        let rows: Vec<(i64, String, Price)> = sqlx::query_as(
            r"
            SELECT id, name, price FROM shop.product
            WHERE deleted_at IS NULL
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price)| ProductOption {
                id: ProductId::new(id),
                name,
                price,
            })
            .collect())
    }

    /// Create a product and its category links with the write-once slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name, slug or SKU.
    pub async fn create(
        &self,
        input: &ProductInput,
        slug: &Slug,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO shop.product (
                brand_id, name, slug, sku, description, image, quantity, price,
                product_type, is_visible, is_featured, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(input.brand_id.as_i64())
        .bind(&input.name)
        .bind(slug.as_str())
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.quantity)
        .bind(input.price)
        .bind(input.product_type)
        .bind(input.is_visible)
        .bind(input.is_featured)
        .bind(input.published_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        link_categories(&mut tx, id, &input.category_ids).await?;
        tx.commit().await?;

        tracing::debug!(id, slug = %slug, "product created");
        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a live product and replace its category links. The slug is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live product has this ID.
    /// Returns `RepositoryError::Conflict` on a duplicate name or SKU.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE shop.product
            SET brand_id = $2, name = $3, sku = $4, description = $5, image = $6,
                quantity = $7, price = $8, product_type = $9, is_visible = $10,
                is_featured = $11, published_at = $12
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            ",
        )
        .bind(id.as_i64())
        .bind(input.brand_id.as_i64())
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.quantity)
        .bind(input.price)
        .bind(input.product_type)
        .bind(input.is_visible)
        .bind(input.is_featured)
        .bind(input.published_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM shop.category_product WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id.as_i64(), &input.category_ids).await?;
        tx.commit().await?;

        tracing::debug!(%id, "product updated");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live product has this ID.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        super::soft_delete(self.pool, Table::Product, id.as_i64()).await
    }

    /// Soft delete several products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete_many(&self, ids: &[ProductId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();
        super::soft_delete_many(self.pool, Table::Product, &ids).await
    }

    /// Restore a trashed product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no trashed product has this ID.
    pub async fn restore(&self, id: ProductId) -> Result<(), RepositoryError> {
        super::restore(self.pool, Table::Product, id.as_i64()).await
    }
}

async fn link_categories(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    let ids: Vec<i64> = category_ids.iter().map(CategoryId::as_i64).collect();
    sqlx::query(
        r"
        INSERT INTO shop.category_product (category_id, product_id)
        SELECT DISTINCT UNNEST($1::bigint[]), $2
        ",
    )
    .bind(&ids)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
