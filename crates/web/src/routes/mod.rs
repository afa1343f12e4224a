//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Pages
//! GET  /                              - This week and next week
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! POST /auth/logout                   - Logout action
//! GET  /order/{date}                  - Order form (admins: ?user=<id>)
//! POST /order/{date}                  - Place or change the order
//! GET  /guest                         - Guest lunch form
//! POST /guest                         - Order a guest lunch
//!
//! # Admin pages
//! GET  /admin                         - Redirects to /admin/today
//! GET  /admin/today                   - Who ordered what today
//! GET  /admin/orders                  - Orders for a day (?date=)
//! POST /admin/orders/{id}/delete      - Delete an order
//! POST /admin/guest-orders/{id}/delete - Delete a guest order
//! GET  /admin/users                   - User list and "add user" form
//! POST /admin/users                   - Create a user
//! POST /admin/users/{id}/toggle-admin - Grant or revoke admin
//! POST /admin/users/{id}/delete       - Delete a user
//! GET  /admin/settings                - Digest email settings
//! POST /admin/settings                - Save digest email settings
//!
//! # JSON API
//! GET  /api/lunch-types               - Lunch types
//! GET  /api/cold-options              - Sandwich choices
//! GET  /api/bread-options             - Bread choices
//! GET  /api/drink-options             - Drink choices
//! GET  /api/parameters                - All parameters
//! POST /api/parameters                - Upsert a parameter (admin)
//! GET  /api/orders                    - My orders grouped by week
//! POST /api/orders                    - Place an order
//! PUT  /api/orders                    - Change an order
//! POST /api/guest-orders              - Order a guest lunch
//! GET  /api/admin/users               - List users
//! POST /api/admin/users               - Create a user
//! PUT  /api/admin/users               - Set the admin flag
//! DELETE /api/admin/users             - Delete a user
//! GET  /api/admin/orders              - Orders (?date=, ?userId=)
//! POST /api/admin/orders              - Create or update any order
//! DELETE /api/admin/orders            - Delete an order
//! GET  /api/admin/report              - CSV export (?from=, ?to=)
//! GET  /api/admin/settings            - Digest email settings
//! POST /api/admin/settings            - Save digest email settings
//! ```

pub mod api;
pub mod pages;

use axum::Router;

use crate::state::AppState;

/// Build the combined page and API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .nest("/api", api::router())
}
