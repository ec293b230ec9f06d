mod auth;
pub mod favourites;
mod homes;
mod host;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::middleware::require_auth;
use crate::config::Config;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    // Health checks — no rate limit
    let health_routes = Router::new().route("/health", get(health));

    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    // Rate limit: auth routes — 10 requests per 60 seconds per IP
    let auth_routes = if state.config.rate_limit {
        let auth_governor = GovernorConfigBuilder::default()
            .per_second(6)
            .burst_size(10)
            .finish()
            .expect("auth rate limit settings are non-zero");
        auth_routes.layer(GovernorLayer::new(Arc::new(auth_governor)))
    } else {
        auth_routes
    };

    // Listings and favourites resolve the session themselves
    let store_routes = Router::new()
        .route("/", get(homes::index))
        .route("/homes", get(homes::list))
        .route("/homes/{home_id}", get(homes::detail))
        .route("/bookings", get(homes::bookings))
        .route("/api/check-session", get(favourites::check_session))
        .route("/favourites", get(homes::favourite_list).post(favourites::add))
        .route("/favourites/toggle", post(favourites::toggle))
        .route("/favourites/delete/{home_id}", post(favourites::remove));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/host/host-home-list", get(host::list))
        .route("/host/add-home", post(host::create))
        .route("/host/edit-home", post(host::update))
        .route("/host/edit-home/{home_id}", get(host::get))
        .route("/host/delete-home/{home_id}", post(host::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(store_routes)
        .merge(protected)
        .with_state(state)
}
