//! Route definitions

use super::handlers::{self, flights, hotels, store};
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Routes mounted under `/api`
fn api_routes() -> Router<AppState> {
    Router::new()
        // Flights
        .route("/flights/offers", get(flights::offers))
        .route("/flights/offers/multiple", get(flights::multiple))
        .route("/flights/destinations", get(flights::destinations))
        // Hotels
        .route("/hotels", get(hotels::search))
        .route("/hotels/compare", get(hotels::compare))
        .route("/hotels/:hotel_id", get(hotels::by_hotel))
        // Demo store
        .route("/users", get(store::list_users).post(store::create_user))
        .route(
            "/users/:id",
            get(store::get_user)
                .put(store::update_user)
                .delete(store::delete_user),
        )
        .route("/trips", get(store::list_trips).post(store::create_trip))
        .route("/trips/:id", get(store::get_trip))
        .route("/recommendations", get(store::recommendations))
        // Service
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.static_dir());

    let router = Router::new()
        .nest("/api", api_routes())
        .route("/", get(handlers::index))
        .route("/favicon.ico", get(handlers::favicon))
        .fallback_service(static_files)
        .layer(CompressionLayer::new());

    let router = if state.settings.server.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}
