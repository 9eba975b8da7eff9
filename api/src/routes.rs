use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::cors::cors_middleware;
use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/key",
            post(handlers::update_api_key).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/upload",
            post(handlers::upload_file)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/analyze",
            post(handlers::analyze_query).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/files",
            get(handlers::list_files).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        // Added after the fallback so unknown paths get CORS and OPTIONS handling too.
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}
