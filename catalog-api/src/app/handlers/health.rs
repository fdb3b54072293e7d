use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use serde_json::{json, Value};

use crate::app::middleware::extract_client_ip;
use crate::app::{ApiError, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "status": "ok" }))
}

/// 数据库连通性检查（SELECT 1）
pub async fn health_db(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let ok = state.store.ping().await?;
    Ok(Json(json!({ "ok": true, "result": { "ok": ok } })))
}

/// 处理 404 错误，记录可疑请求
pub async fn handler_404(uri: Uri, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    tracing::warn!(
        "404 request: path={}, IP={}",
        uri.path(),
        extract_client_ip(&headers)
    );

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "ok": false,
            "error": "Not found"
        })),
    )
}

/// 已知路径上不支持的方法
pub async fn handler_405(method: Method, uri: Uri) -> ApiError {
    tracing::debug!("405 request: method={}, path={}", method, uri.path());
    ApiError::method_not_allowed()
}
