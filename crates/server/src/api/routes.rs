use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::{archives, handlers, jobs};
use super::middleware::{auth_middleware, metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes behind authentication
    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/jobs", post(jobs::submit_job))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/jobs/{id}/download", get(jobs::download_job_archive))
        // Archives
        .route("/archives", get(archives::list_archives))
        .route("/archives/{filename}", get(archives::download_archive))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Health stays reachable without credentials
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
}
