use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod admin_settings;
pub mod clients;
pub mod departments;
pub mod health;
pub mod job_items;
pub mod jobs;
pub mod performance;
pub mod route_catalog;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(route_catalog::router())
        .merge(departments::router())
        .merge(users::router())
        .merge(admin_settings::router())
        .merge(clients::router())
        .merge(jobs::router())
        .merge(job_items::router())
        .merge(performance::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
