pub mod health;
pub mod proposals;
pub mod requests;
pub mod track;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                          create (POST)
/// /requests/{id}/proposals           generate (POST), list (GET)
///
/// /proposals/{id}/select             exclusive selection (POST)
///
/// /track/{access_token}              customer-facing status + proposals (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests::router())
        .nest("/proposals", proposals::router())
        .nest("/track", track::router())
}
