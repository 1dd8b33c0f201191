//! Customer repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use shopdesk_core::{CustomerId, Email};

use super::{PageRequest, Paged, RepositoryError, Sort, Table, like_pattern, map_unique_violation};
use crate::models::{Customer, CustomerFilter, CustomerInput, CustomerSort, SelectOption};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    date_of_birth: NaiveDate,
    city: String,
    zip_code: String,
    address: String,
    order_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            city: row.city,
            zip_code: row.zip_code,
            address: row.address,
            order_count: row.order_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

const CUSTOMER_COLUMNS: &str = r"
    c.id, c.name, c.email, c.phone, c.date_of_birth, c.city, c.zip_code, c.address,
    (SELECT COUNT(*) FROM shop.orders o
     WHERE o.customer_id = c.id AND o.deleted_at IS NULL) AS order_count,
    c.created_at, c.updated_at, c.deleted_at
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        sort: Sort<CustomerSort>,
        page: PageRequest,
    ) -> Result<Paged<Customer>, RepositoryError> {
        let predicate = format!(
            "{} AND ($1::text IS NULL OR c.name ILIKE $1 OR c.email ILIKE $1 \
             OR c.phone ILIKE $1 OR c.city ILIKE $1)",
            filter.scope.predicate("c")
        );
        let search = filter.search.as_deref().map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shop.customer c WHERE {predicate}"))
                .bind(&search)
                .fetch_one(self.pool)
                .await?;

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM shop.customer c WHERE {predicate} \
             ORDER BY {} LIMIT $2 OFFSET $3",
            sort.order_by("c")
        );
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(&search)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paged {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a live customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM shop.customer c WHERE c.id = $1 AND c.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Live customers as select options, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn options(&self) -> Result<Vec<SelectOption>, RepositoryError> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            r"
            SELECT id, name, email FROM shop.customer
            WHERE deleted_at IS NULL
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email)| SelectOption::new(id, format!("{name} <{email}>")))
            .collect())
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate email.
    pub async fn create(&self, input: &CustomerInput) -> Result<Customer, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO shop.customer
                (name, email, phone, date_of_birth, city, zip_code, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(&input.phone)
        .bind(input.date_of_birth)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::debug!(id, "customer created");
        self.get(CustomerId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a live customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live customer has this ID.
    /// Returns `RepositoryError::Conflict` on a duplicate email.
    pub async fn update(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, RepositoryError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE shop.customer
            SET name = $2, email = $3, phone = $4, date_of_birth = $5,
                city = $6, zip_code = $7, address = $8
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id
            ",
        )
        .bind(id.as_i64())
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(&input.phone)
        .bind(input.date_of_birth)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.address)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }
        tracing::debug!(%id, "customer updated");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live customer has this ID.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        super::soft_delete(self.pool, Table::Customer, id.as_i64()).await
    }

    /// Soft delete several customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn delete_many(&self, ids: &[CustomerId]) -> Result<u64, RepositoryError> {
        let ids: Vec<i64> = ids.iter().map(CustomerId::as_i64).collect();
        super::soft_delete_many(self.pool, Table::Customer, &ids).await
    }

    /// Restore a trashed customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no trashed customer has this ID.
    pub async fn restore(&self, id: CustomerId) -> Result<(), RepositoryError> {
        super::restore(self.pool, Table::Customer, id.as_i64()).await
    }
}
