use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::{parse_product_id, CreateProductRequest, Page, UpdateProductRequest};
use serde_json::{json, Value};
use tracing::instrument;

use crate::app::middleware::RequireWriteAccess;
use crate::app::{ApiError, AppState};

#[instrument(skip_all)]
pub async fn list_products(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    // 分页参数宽松解析，非法值回退默认
    let page = Page::from_query_string(query.as_deref());
    let products = state.store.list(page).await?;
    Ok(Json(json!({ "ok": true, "products": products })))
}

#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    _guard: RequireWriteAccess,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let product = state.store.create(payload.validate()?).await?;
    tracing::info!(product_id = product.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "product": product })),
    ))
}

#[instrument(skip_all)]
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let id = parse_product_id(&id)?;
    let product = state.store.get(id).await?;
    Ok(Json(json!({ "ok": true, "product": product })))
}

#[instrument(skip_all)]
pub async fn update_product(
    State(state): State<AppState>,
    _guard: RequireWriteAccess,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let id = parse_product_id(&id)?;
    let Json(payload) = payload?;
    let product = state.store.update(id, payload.validate()?).await?;
    Ok(Json(json!({ "ok": true, "product": product })))
}

#[instrument(skip_all)]
pub async fn delete_product(
    State(state): State<AppState>,
    _guard: RequireWriteAccess,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let id = parse_product_id(&id)?;
    let deleted = state.store.delete(id).await?;
    tracing::info!(product_id = deleted.id, "product deleted");
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}
