//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::PgPool;

use lunch_order_core::OrderingPolicy;

use crate::config::WebConfig;
use crate::services::OptionsService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    policy: OrderingPolicy,
    options: OptionsService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WebConfig, pool: PgPool) -> Self {
        let policy = OrderingPolicy::new(config.order_cutoff);
        let options = OptionsService::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                policy,
                options,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The ordering window rules.
    #[must_use]
    pub fn policy(&self) -> OrderingPolicy {
        self.inner.policy
    }

    /// Cached option lists and parameter writes.
    #[must_use]
    pub fn options(&self) -> &OptionsService {
        &self.inner.options
    }

    /// Current wall-clock time at the canteen.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.inner.config.timezone.wall_clock(Utc::now())
    }

    /// Today's date at the canteen.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
