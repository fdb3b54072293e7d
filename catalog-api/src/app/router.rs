use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_product, delete_product, get_product, handler_404, handler_405, health, health_db,
    list_products, update_product,
};
use super::middleware::{rate_limit_middleware, API_KEY_HEADER, RATE_LIMIT_REMAINING};
use super::state::AppState;

/// 根据配置的来源列表构建 CorsLayer
fn build_cors_layer(cors_origins: Vec<String>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .expose_headers([HeaderName::from_static(RATE_LIMIT_REMAINING)]);

    if cors_origins.is_empty() {
        tracing::warn!(
            "CATALOG_CORS_ORIGINS not configured, allowing all origins. \
             Set CATALOG_CORS_ORIGINS in production."
        );
        base.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .into_iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        base.allow_origin(origins)
    }
}

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState, cors_origins: Vec<String>) -> Router {
    // 存活检查不计入限流
    let public_routes = Router::new().route("/health", get(health).fallback(handler_405));

    // 商品与数据库相关端点，按 IP 限流；写操作由 handler 中的 RequireWriteAccess 检查
    let limited_routes = Router::new()
        .route("/health/db", get(health_db).fallback(handler_405))
        .route(
            "/products",
            get(list_products)
                .post(create_product)
                .fallback(handler_405),
        )
        .route(
            "/products/:id",
            get(get_product)
                .put(update_product)
                .delete(delete_product)
                .fallback(handler_405),
        )
        .route_layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .merge(public_routes)
        .merge(limited_routes)
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .with_state(state)
}
