// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        bookings::booking_handler, notifications::notification_handler,
        packages::package_handler, payments::payment_handler, properties::property_handler,
        users::users_handler, viewings::viewing_handler,
    },
    middleware::auth,
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest(
            "/viewing-requests",
            viewing_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/bookings",
            booking_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/properties", property_handler())
        .nest("/packages", package_handler())
        .nest("/payments", payment_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/notifications",
            notification_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
