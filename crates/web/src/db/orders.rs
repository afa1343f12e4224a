//! Order repository.
//!
//! The `(user_id, date)` unique constraint is the source of truth for "one
//! order per user per day"; inserts that hit it come back as
//! `RepositoryError::Conflict`.

use chrono::NaiveDate;
use sqlx::PgPool;

use lunch_order_core::{Email, LunchTypeId, OrderId, Price, UserId};

use super::{RepositoryError, conflict_or_database};
use crate::models::{LunchType, Order, OrderDetails, OrderWithLunch, UserSummary};

/// Fields written when creating or updating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub lunch_type_id: LunchTypeId,
    pub date: NaiveDate,
    pub customization: String,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OrderLunchRow {
    #[sqlx(flatten)]
    order: Order,
    lunch_name: String,
    lunch_price: Price,
}

impl From<OrderLunchRow> for OrderWithLunch {
    fn from(row: OrderLunchRow) -> Self {
        let lunch_type = LunchType {
            id: row.order.lunch_type_id,
            name: row.lunch_name,
            price: row.lunch_price,
        };
        Self {
            order: row.order,
            lunch_type,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderDetailsRow {
    #[sqlx(flatten)]
    lunch: OrderLunchRow,
    username: String,
    email: String,
}

impl TryFrom<OrderDetailsRow> for OrderDetails {
    type Error = RepositoryError;

    fn try_from(row: OrderDetailsRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let order = OrderWithLunch::from(row.lunch);
        Ok(Self {
            user: UserSummary {
                id: order.order.user_id,
                username: row.username,
                email,
            },
            order,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithLunch>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLunchRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            WHERE o.user_id = $1
            ORDER BY o.date DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderWithLunch::from).collect())
    }

    /// A user's orders with `from <= date <= to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OrderWithLunch>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLunchRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            WHERE o.user_id = $1 AND o.date BETWEEN $2 AND $3
            ORDER BY o.date ASC
            ",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderWithLunch::from).collect())
    }

    /// Orders matching the optional day and user filters, newest date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_filtered(
        &self,
        date: Option<NaiveDate>,
        user_id: Option<UserId>,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderDetailsRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price,
                   u.username, u.email
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            JOIN users u ON u.id = o.user_id
            WHERE ($1::date IS NULL OR o.date = $1)
              AND ($2::int4 IS NULL OR o.user_id = $2)
            ORDER BY o.date DESC, u.username ASC
            ",
        )
        .bind(date)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderDetails::try_from).collect()
    }

    /// Orders with `from <= date <= to`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderDetailsRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price,
                   u.username, u.email
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            JOIN users u ON u.id = o.user_id
            WHERE o.date BETWEEN $1 AND $2
            ORDER BY o.date ASC, u.username ASC
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderDetails::try_from).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<OrderWithLunch>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLunchRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(OrderWithLunch::from))
    }

    /// The user's order for `date`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<OrderWithLunch>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLunchRow>(
            r"
            SELECT o.id, o.user_id, o.lunch_type_id, o.date, o.customization,
                   o.cold_type, o.bread_type, o.drink_type, o.created_at, o.updated_at,
                   lt.name AS lunch_name, lt.price AS lunch_price
            FROM orders o
            JOIN lunch_types lt ON lt.id = o.lunch_type_id
            WHERE o.user_id = $1 AND o.date = $2
            ",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(OrderWithLunch::from))
    }

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has an order
    /// for that day.
    pub async fn create(&self, new: &NewOrder) -> Result<OrderWithLunch, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders
                (user_id, lunch_type_id, date, customization, cold_type, bread_type, drink_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(new.user_id)
        .bind(new.lunch_type_id)
        .bind(new.date)
        .bind(&new.customization)
        .bind(new.cold_type.as_deref())
        .bind(new.bread_type.as_deref())
        .bind(new.drink_type.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "order already exists for this day"))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite every field of an existing order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if the change would give the user
    /// two orders on one day.
    pub async fn update(&self, id: OrderId, new: &NewOrder) -> Result<OrderWithLunch, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET user_id = $2, lunch_type_id = $3, date = $4, customization = $5,
                cold_type = $6, bread_type = $7, drink_type = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(new.user_id)
        .bind(new.lunch_type_id)
        .bind(new.date)
        .bind(&new.customization)
        .bind(new.cold_type.as_deref())
        .bind(new.bread_type.as_deref())
        .bind(new.drink_type.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "order already exists for this day"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Create the user's order for the day, or replace it if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_for_user(&self, new: &NewOrder) -> Result<OrderWithLunch, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders
                (user_id, lunch_type_id, date, customization, cold_type, bread_type, drink_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT ON CONSTRAINT orders_user_date_key DO UPDATE
            SET lunch_type_id = EXCLUDED.lunch_type_id,
                customization = EXCLUDED.customization,
                cold_type = EXCLUDED.cold_type,
                bread_type = EXCLUDED.bread_type,
                drink_type = EXCLUDED.drink_type,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(new.user_id)
        .bind(new.lunch_type_id)
        .bind(new.date)
        .bind(&new.customization)
        .bind(new.cold_type.as_deref())
        .bind(new.bread_type.as_deref())
        .bind(new.drink_type.as_deref())
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
