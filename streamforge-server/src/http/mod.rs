//! HTTP and WebSocket surface (spec.md §6), assembled the way the teacher's
//! `create_app` builds its router: one `Router<AppState>` per concern,
//! merged under CORS and tracing layers.

mod rest;
mod ws;

use std::sync::LazyLock;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// `http://127.0.0.1:<any port>` or `http://localhost:<any port>`, plus the
/// two well-known host-shell webview origins (spec.md §6 "CORS").
static LOOPBACK_ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^http://(127\.0\.0\.1|localhost):\d+$").expect("static pattern is valid")
});

fn is_allowed_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    LOOPBACK_ORIGIN.is_match(origin)
        || origin == "tauri://localhost"
        || origin == "https://tauri.localhost"
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| is_allowed_origin(origin)))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::router())
        .merge(ws::router())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
