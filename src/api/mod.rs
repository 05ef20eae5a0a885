use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::constants::UPLOADS_ROUTE;
use crate::state::SharedState;

pub mod auth;
mod claims;
mod dashboard;
mod error;
mod extract;
mod items;
mod notifications;
mod observability;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{
    AuthService, ClaimService, DashboardService, ItemService, NotificationService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn ItemService> {
        &self.shared.item_service
    }

    #[must_use]
    pub fn claim_service(&self) -> &Arc<dyn ClaimService> {
        &self.shared.claim_service
    }

    #[must_use]
    pub fn notification_service(&self) -> &Arc<dyn NotificationService> {
        &self.shared.notification_service
    }

    #[must_use]
    pub fn dashboard_service(&self) -> &Arc<dyn DashboardService> {
        &self.shared.dashboard_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let uploads_path = state.config().storage.uploads_path.clone();
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(create_public_router())
        .merge(create_protected_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/items", get(items::list_items))
        .route("/items/{id}", get(items::get_item))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let upload_limit = state.config().server.max_upload_bytes();

    Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/items",
            post(items::create_item).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/items/user", get(items::my_items))
        .route("/claims", post(claims::submit_claim))
        .route("/claims/user", get(claims::my_claims))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/{id}/read", put(notifications::mark_read))
        .route(
            "/notifications/{id}",
            delete(notifications::delete_notification),
        )
        .route("/users/dashboard-stats", get(dashboard::member_stats))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let upload_limit = state.config().server.max_upload_bytes();

    Router::new()
        .route(
            "/items/{id}",
            put(items::update_item)
                .layer(DefaultBodyLimit::max(upload_limit))
                .delete(items::delete_item),
        )
        .route("/items/{id}/status", put(items::update_status))
        .route("/items/{id}/complete", put(items::complete_item))
        .route("/claims", get(claims::list_claims))
        .route("/claims/{id}", put(claims::review_claim))
        .route("/admin/stats", get(dashboard::admin_stats))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
