//! REST APIハンドラー
//!
//! リレー一覧・ネットワーク情報の配布と、管理者用のリレー登録/削除

pub mod auth;
pub mod error;
pub mod health;
pub mod network;
pub mod relays;

use crate::common::error::DirectoryError;
use crate::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use error::AppError;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    let admin = middleware::from_fn_with_state(state.clone(), auth::require_admin);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/relays",
            get(relays::list_relays).merge(post(relays::create_relay).route_layer(admin.clone())),
        )
        .route(
            "/api/relays/:id",
            delete(relays::delete_relay).route_layer(admin),
        )
        .route("/api/network-info", get(network::network_info))
        .route("/api/info", get(network::network_info))
        .route("/api/snapshot", get(network::get_snapshot))
        .route("/api/stats", get(network::stats))
        .route("/health", get(health::health_check))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn unknown_route(uri: axum::http::Uri) -> AppError {
    AppError(DirectoryError::BadRequest(format!("unknown route: {}", uri.path())))
}
