mod handlers;

use axum::{
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

/// Prefix every route is nested under.
pub const API_PREFIX: &str = "/api/v1";

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Parents
        .route(
            "/Parent",
            get(handlers::list_parents)
                .post(handlers::create_parent)
                .delete(handlers::delete_all_parents),
        )
        .route(
            "/Parent/{name}",
            get(handlers::get_parent)
                .put(handlers::update_parent)
                .delete(handlers::delete_parent),
        )
        // Minions
        .route(
            "/Minion",
            get(handlers::list_minions)
                .post(handlers::create_minion)
                .delete(handlers::delete_all_minions),
        )
        .route(
            "/Minion/{name}",
            get(handlers::get_minion)
                .put(handlers::update_minion)
                .delete(handlers::delete_minion),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
