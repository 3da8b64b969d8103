//! HTTP surface.

mod error;
mod handlers;
pub mod middleware;
mod state;

pub use error::{ApiError, ErrorBody};
pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use middleware::{log_responses, require_json, set_request_context};

pub fn build_router(state: ApiState) -> Router {
    // Body-carrying routes sit behind the Content-Type gate.
    let json_routes = Router::new()
        .route("/posts", post(handlers::create_post))
        .route(
            "/posts/{id}",
            put(handlers::update_post).patch(handlers::update_post),
        )
        .route_layer(axum_middleware::from_fn(require_json));

    let open_routes = Router::new()
        .route("/posts", get(handlers::list_posts))
        .route("/posts/paged", get(handlers::paged_posts))
        .route(
            "/posts/{id}",
            get(handlers::show_post).delete(handlers::delete_post),
        )
        .route("/search", get(handlers::search_posts))
        .route("/get-cache", get(handlers::get_cache))
        .route("/delete-cache", get(handlers::delete_cache))
        .route("/delete-cache/{key}", get(handlers::delete_cache_by_path))
        .route("/_health/db", get(handlers::db_health));

    open_routes
        .merge(json_routes)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
