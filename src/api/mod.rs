use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::warn;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod catalog;
mod error;
mod observability;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AuthService, CatalogService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
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

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let (media_path, cors_origins, secure_cookies, session_minutes, sweep_secs) = {
        let config = state.config().read().await;
        (
            config.general.media_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_expiry_minutes,
            config.server.session_cleanup_interval_secs,
        )
    };

    let admin_routes = create_admin_router(state.clone());

    let session_store = state.shared.store.session_store().await?;
    let sweeper = session_store.clone();
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(sweep_secs);
        if let Err(e) = sweeper.continuously_delete_expired(period).await {
            warn!(error = %e, "Expired session sweep stopped");
        }
    });

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .nest("/admin", admin_routes)
        .route("/catalog", get(catalog::index))
        .route("/catalog/{kind}", get(catalog::list))
        .route("/catalog/{kind}/{id}", get(catalog::detail))
        .route("/auth/signup", get(auth::signup_form).post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/metrics", get(observability::get_metrics))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Ok(Router::new()
        .nest("/api", api_router)
        .nest_service("/media", tower_http::services::ServeDir::new(media_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics)))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", post(admin::create_genre))
        .route(
            "/genres/{id}",
            put(admin::update_genre).delete(admin::delete_genre),
        )
        .route("/languages", post(admin::create_language))
        .route(
            "/languages/{id}",
            put(admin::update_language).delete(admin::delete_language),
        )
        .route("/authors", post(admin::create_author))
        .route(
            "/authors/{id}",
            put(admin::update_author).delete(admin::delete_author),
        )
        .route("/books", post(admin::create_book))
        .route(
            "/books/{id}",
            put(admin::update_book).delete(admin::delete_book),
        )
        .route(
            "/bookinstances",
            get(admin::list_instances).post(admin::create_instance),
        )
        .route(
            "/bookinstances/{id}",
            put(admin::update_instance).delete(admin::delete_instance),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_staff))
}
