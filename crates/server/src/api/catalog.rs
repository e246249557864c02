use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use wardrobe_core::catalog::{CategoryNode, CategoryStat};
use wardrobe_core::domain::category::{Category, CategoryId};
use wardrobe_core::domain::clothing::OwnerId;

use super::{reject, ApiCreated, ApiResult, ApiState};
use crate::service::{CategoryChanges, NewCategory};

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPath {
    pub category_id: CategoryId,
    pub path: String,
}

pub async fn tree(State(state): State<ApiState>) -> ApiResult<Vec<CategoryNode>> {
    state.service.category_tree().await.map(Json).map_err(reject)
}

pub async fn create(
    State(state): State<ApiState>,
    Json(request): Json<NewCategory>,
) -> ApiCreated<Category> {
    let category = state.service.create_category(request).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<CategoryChanges>,
) -> ApiResult<Category> {
    state.service.update_category(&CategoryId(id), request).await.map(Json).map_err(reject)
}

pub async fn delete(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<Category> {
    state.service.delete_category(&CategoryId(id)).await.map(Json).map_err(reject)
}

pub async fn path(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<CategoryPath> {
    let category_id = CategoryId(id);
    let path = state.service.category_path(&category_id).await.map_err(reject)?;
    Ok(Json(CategoryPath { category_id, path }))
}

pub async fn move_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<Category> {
    state.service.move_category(&CategoryId(id), request.parent_id).await.map(Json).map_err(reject)
}

pub async fn stats(
    State(state): State<ApiState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Vec<CategoryStat>> {
    let owner_id = query.owner_id.map(OwnerId);
    state.service.category_stats(owner_id.as_ref()).await.map(Json).map_err(reject)
}
