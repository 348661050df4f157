//! HTTP surface
//!
//! Routes, the role requirement of each route, and the server runner.

pub mod handlers;
pub mod http;
pub mod middleware;
pub mod state;

pub use http::{DEFAULT_HTTP_PORT, HttpConfig, run_http, run_http_blocking};
pub use middleware::{RequireRole, gated};
pub use state::AppState;

use crate::auth::Role;
use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use handlers::{accounts, readings};
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let guard = |role: Role| {
        RequireRole::new(state.gate.clone(), state.key_param.clone()).with_role(role.as_str())
    };
    let student = guard(Role::Student);
    let teacher = guard(Role::Teacher);

    Router::new()
        .route(
            "/api/WeatherData",
            gated(get(readings::list), &student).merge(gated(post(readings::create), &teacher)),
        )
        .route(
            "/api/WeatherData/GetFiltered",
            gated(get(readings::filtered), &student),
        )
        .route(
            "/api/WeatherData/PostMany",
            gated(post(readings::create_many), &teacher),
        )
        .route(
            "/api/WeatherData/UpdateMany",
            gated(patch(readings::update_many), &teacher),
        )
        .route(
            "/api/WeatherData/DeleteMany",
            gated(delete(readings::delete_many), &teacher),
        )
        .route(
            "/api/WeatherData/DeleteOlderThanGivenDays",
            gated(delete(readings::delete_older_than), &teacher),
        )
        .route(
            "/api/WeatherData/{id}",
            gated(get(readings::get_one), &student).merge(gated(
                put(readings::replace).delete(readings::delete),
                &teacher,
            )),
        )
        .route(
            "/api/User",
            gated(
                get(accounts::list)
                    .post(accounts::create)
                    .put(accounts::update_role)
                    .patch(accounts::update_many)
                    .delete(accounts::remove),
                &teacher,
            ),
        )
        .route(
            "/api/User/DeleteMany",
            gated(delete(accounts::remove_many), &teacher),
        )
        .route(
            "/api/User/DeleteInActive",
            gated(delete(accounts::remove_inactive), &teacher),
        )
        .route("/api/User/{id}", gated(get(accounts::get_one), &teacher))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
