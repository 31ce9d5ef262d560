//! Route definitions for the IT dashboard API.

pub mod auth;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod health;
pub mod registry;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router: health probes plus `/api/v1`.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let dashboard_routes = Router::new()
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/comparison", get(dashboard::comparison));

    let registry_routes = Router::new()
        .route(
            "/technicians",
            get(registry::list_technicians).post(registry::create_technician),
        )
        .route(
            "/technicians/{id}",
            get(registry::get_technician)
                .put(registry::update_technician)
                .delete(registry::delete_technician),
        )
        .route(
            "/servers",
            get(registry::list_servers).post(registry::create_server),
        )
        .route(
            "/servers/{id}",
            get(registry::get_server)
                .put(registry::update_server)
                .delete(registry::delete_server),
        )
        .route(
            "/security-controls",
            get(registry::list_controls).post(registry::create_control),
        )
        .route(
            "/security-controls/{id}",
            get(registry::get_control)
                .put(registry::update_control)
                .delete(registry::delete_control),
        );

    let data_routes = Router::new()
        .route(
            "/data/helpdesk",
            get(data::list_helpdesk).post(data::upsert_helpdesk),
        )
        .route(
            "/data/endpoints",
            get(data::list_endpoints).post(data::upsert_endpoint),
        )
        .route(
            "/data/server-security",
            get(data::list_server_security).post(data::upsert_server_security),
        )
        .route(
            "/data/cybersecurity",
            get(data::list_cyber_security).post(data::upsert_cyber_security),
        )
        .route(
            "/data/tech-incidents",
            get(data::list_tech_incidents).post(data::upsert_tech_incident),
        )
        .route("/export/{dataset}", get(export::export_dataset));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", dashboard_routes)
        .nest("/api/v1", registry_routes)
        .nest("/api/v1", data_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(frontend_url, "Invalid FRONTEND_URL, allowing any origin");
            cors.allow_origin(Any)
        }
    }
}
