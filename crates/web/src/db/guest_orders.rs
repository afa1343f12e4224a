//! Guest order repository.

use chrono::NaiveDate;
use sqlx::PgPool;

use lunch_order_core::{Email, GuestOrderId, LunchTypeId, Price, UserId};

use super::RepositoryError;
use crate::models::{GuestOrder, GuestOrderDetails};

/// Fields written when registering a guest lunch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuestOrder {
    pub host_user_id: UserId,
    pub lunch_type_id: LunchTypeId,
    pub date: NaiveDate,
    pub guest_name: String,
    pub customization: String,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
    pub price: Price,
}

#[derive(sqlx::FromRow)]
struct GuestDetailsRow {
    #[sqlx(flatten)]
    order: GuestOrder,
    lunch_name: String,
    host_username: String,
    host_email: String,
}

impl TryFrom<GuestDetailsRow> for GuestOrderDetails {
    type Error = RepositoryError;

    fn try_from(row: GuestDetailsRow) -> Result<Self, Self::Error> {
        let host_email = Email::parse(&row.host_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            order: row.order,
            lunch_name: row.lunch_name,
            host_username: row.host_username,
            host_email,
        })
    }
}

/// Repository for guest orders.
pub struct GuestOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GuestOrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewGuestOrder) -> Result<GuestOrder, RepositoryError> {
        let row = sqlx::query_as::<_, GuestOrder>(
            r"
            INSERT INTO guest_orders
                (host_user_id, lunch_type_id, date, guest_name, customization,
                 cold_type, bread_type, drink_type, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, host_user_id, lunch_type_id, date, guest_name, customization,
                      cold_type, bread_type, drink_type, price, created_at
            ",
        )
        .bind(new.host_user_id)
        .bind(new.lunch_type_id)
        .bind(new.date)
        .bind(&new.guest_name)
        .bind(&new.customization)
        .bind(new.cold_type.as_deref())
        .bind(new.bread_type.as_deref())
        .bind(new.drink_type.as_deref())
        .bind(new.price)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Guest orders for one day, by host.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_on(&self, date: NaiveDate) -> Result<Vec<GuestOrderDetails>, RepositoryError> {
        self.list_range(date, date).await
    }

    /// Guest orders with `from <= date <= to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<GuestOrderDetails>, RepositoryError> {
        let rows = sqlx::query_as::<_, GuestDetailsRow>(
            r"
            SELECT g.id, g.host_user_id, g.lunch_type_id, g.date, g.guest_name,
                   g.customization, g.cold_type, g.bread_type, g.drink_type,
                   g.price, g.created_at,
                   lt.name AS lunch_name,
                   u.username AS host_username, u.email AS host_email
            FROM guest_orders g
            JOIN lunch_types lt ON lt.id = g.lunch_type_id
            JOIN users u ON u.id = g.host_user_id
            WHERE g.date BETWEEN $1 AND $2
            ORDER BY g.date ASC, u.username ASC, g.id ASC
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(GuestOrderDetails::try_from).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the guest order doesn't exist.
    pub async fn delete(&self, id: GuestOrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM guest_orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
