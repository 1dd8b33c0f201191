//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopdesk_core::CategoryId;

use super::{PageRequest, Paged, RepositoryError, Sort, Table, like_pattern, map_unique_violation};
use crate::models::{Category, CategoryFilter, CategoryInput, CategorySort, SelectOption};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const CATEGORY_COLUMNS: &str = r"
    c.id, c.name,
    (SELECT COUNT(*) FROM shop.category_product cp
     JOIN shop.product p ON p.id = cp.product_id
     WHERE cp.category_id = c.id AND p.deleted_at IS NULL) AS product_count,
    c.created_at, c.updated_at, c.deleted_at
";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &CategoryFilter,
        sort: Sort<CategorySort>,
        page: PageRequest,
    ) -> Result<Paged<Category>, RepositoryError> {
        let predicate = format!(
            "{} AND ($1::text IS NULL OR c.name ILIKE $1)",
            filter.scope.predicate("c")
        );
        let search = filter.search.as_deref().map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shop.category c WHERE {predicate}"))
                .bind(&search)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category c WHERE {predicate} \
             ORDER BY {} LIMIT $2 OFFSET $3",
            sort.order_by("c")
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&search)
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

    /// Get a live category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category c WHERE c.id = $1 AND c.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Live categories as select options, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn options(&self) -> Result<Vec<SelectOption>, RepositoryError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, name FROM shop.category WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SelectOption::new(id, name))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let id: i64 = sqlx::query_scalar("INSERT INTO shop.category (name) VALUES ($1) RETURNING id")
            .bind(&input.name)
            .fetch_one(self.pool)
            .await
            .map_err(map_unique_violation)?;

        tracing::debug!(id, "category created");
        self.get(CategoryId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live category has this ID.
    /// Returns `RepositoryError::Conflict` on a duplicate name.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE shop.category SET name = $2 WHERE id = $1 AND deleted_at IS NULL RETURNING id",
        )
        .bind(id.as_i64())
        .bind(&input.name)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live category has this ID.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        super::soft_delete(self.pool, Table::Category, id.as_i64()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete_many(&self, ids: &[CategoryId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(CategoryId::as_i64).collect();
        super::soft_delete_many(self.pool, Table::Category, &ids).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no trashed category has this ID.
    pub async fn restore(&self, id: CategoryId) -> Result<(), RepositoryError> {
        super::restore(self.pool, Table::Category, id.as_i64()).await
    }
}
