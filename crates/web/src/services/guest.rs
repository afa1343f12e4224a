//! Guest lunches.
//!
//! A user can register a lunch for a visitor. Guest orders live in their own
//! table, so they never collide with the host's own order for the day, and
//! carry the flat guest price in force when they were placed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use lunch_order_core::{GuestOrderId, LunchTypeId, OrderAction, OrderingPolicy, UserId};

use super::options::OptionsService;
use super::ordering::{OrderingError, resolve_lunch_type, validate_choice};
use crate::db::guest_orders::NewGuestOrder;
use crate::db::{GuestOrderRepository, RepositoryError};
use crate::models::GuestOrder;

/// Longest accepted guest name, in characters.
pub const MAX_GUEST_NAME_CHARS: usize = 100;

/// Body of `POST /api/guest-orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestOrderInput {
    pub guest_name: Option<String>,
    pub lunch_type_id: Option<LunchTypeId>,
    pub date: Option<NaiveDate>,
    pub customization: Option<String>,
    pub cold_type: Option<String>,
    pub bread_type: Option<String>,
    pub drink_type: Option<String>,
}

/// Guest order operations.
pub struct GuestService<'a> {
    pool: &'a PgPool,
    options: &'a OptionsService,
    policy: OrderingPolicy,
}

impl<'a> GuestService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, options: &'a OptionsService, policy: OrderingPolicy) -> Self {
        Self {
            pool,
            options,
            policy,
        }
    }

    /// Register a guest lunch hosted by `host`.
    ///
    /// # Errors
    ///
    /// Same checks as [`super::ordering::OrderingService::place_order`],
    /// without the one-per-day limit.
    #[instrument(skip(self, input), fields(host_user_id = %host))]
    pub async fn place_guest_order(
        &self,
        host: UserId,
        input: &GuestOrderInput,
        now: NaiveDateTime,
    ) -> Result<GuestOrder, OrderingError> {
        let (Some(lunch_type_id), Some(date)) = (input.lunch_type_id, input.date) else {
            return Err(OrderingError::MissingFields("lunchTypeId and date are required"));
        };

        let guest_name: String = input
            .guest_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .chars()
            .take(MAX_GUEST_NAME_CHARS)
            .collect();

        let lunch_type = resolve_lunch_type(self.pool, lunch_type_id).await?;
        let choice = validate_choice(
            lunch_type,
            input.customization.as_deref(),
            input.cold_type.as_deref(),
            input.bread_type.as_deref(),
            input.drink_type.as_deref(),
        )?;
        self.policy.check(date, now, OrderAction::Create)?;

        let price = self.options.guest_price().await?;

        let order = GuestOrderRepository::new(self.pool)
            .create(&NewGuestOrder {
                host_user_id: host,
                lunch_type_id: choice.lunch_type.id,
                date,
                guest_name,
                customization: choice.customization,
                cold_type: choice.cold_type,
                bread_type: choice.bread_type,
                drink_type: choice.drink_type,
                price,
            })
            .await?;

        tracing::info!(guest_order_id = %order.id, %date, %price, "Guest order placed");
        Ok(order)
    }

    /// Remove a guest order.
    ///
    /// # Errors
    ///
    /// Returns `OrderingError::NotFound` if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: GuestOrderId) -> Result<(), OrderingError> {
        GuestOrderRepository::new(self.pool)
            .delete(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderingError::NotFound,
                other => OrderingError::Repository(other),
            })?;
        tracing::info!(guest_order_id = %id, "Guest order deleted");
        Ok(())
    }
}
