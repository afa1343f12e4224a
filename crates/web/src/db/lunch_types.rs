//! Lunch type repository.

use sqlx::PgPool;

use lunch_order_core::{LunchTypeId, Price};

use super::RepositoryError;
use crate::models::LunchType;

/// Repository for the static menu categories.
pub struct LunchTypeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LunchTypeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lunch types in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<LunchType>, RepositoryError> {
        let rows = sqlx::query_as::<_, LunchType>("SELECT id, name, price FROM lunch_types ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: LunchTypeId) -> Result<Option<LunchType>, RepositoryError> {
        let row = sqlx::query_as::<_, LunchType>(
            "SELECT id, name, price FROM lunch_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a lunch type, or update the price of an existing one with the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(&self, name: &str, price: Price) -> Result<LunchType, RepositoryError> {
        let row = sqlx::query_as::<_, LunchType>(
            r"
            INSERT INTO lunch_types (name, price)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET price = EXCLUDED.price
            RETURNING id, name, price
            ",
        )
        .bind(name)
        .bind(price)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
