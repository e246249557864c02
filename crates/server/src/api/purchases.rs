use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use wardrobe_core::domain::clothing::{ClothingItemId, OwnerId};
use wardrobe_core::domain::purchase::{
    PurchaseFilter, PurchaseRecord, PurchaseRecordId, SpendingStats,
};

use super::{reject, ApiCreated, ApiResult, ApiState};
use crate::service::{NewPurchase, PurchaseChanges};

#[derive(Debug, Deserialize)]
pub struct SpendingQuery {
    pub year: Option<i32>,
}

pub async fn add(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(request): Json<NewPurchase>,
) -> ApiCreated<PurchaseRecord> {
    let record = state
        .service
        .add_purchase(&OwnerId(owner_id), &ClothingItemId(item_id), request)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn for_item(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<PurchaseRecord> {
    state
        .service
        .item_purchase(&OwnerId(owner_id), &ClothingItemId(item_id))
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn list(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Query(filter): Query<PurchaseFilter>,
) -> ApiResult<Vec<PurchaseRecord>> {
    state.service.purchases(&OwnerId(owner_id), filter).await.map(Json).map_err(reject)
}

pub async fn get(
    State(state): State<ApiState>,
    Path((owner_id, record_id)): Path<(String, String)>,
) -> ApiResult<PurchaseRecord> {
    state
        .service
        .purchase(&OwnerId(owner_id), &PurchaseRecordId(record_id))
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn update(
    State(state): State<ApiState>,
    Path((owner_id, record_id)): Path<(String, String)>,
    Json(request): Json<PurchaseChanges>,
) -> ApiResult<PurchaseRecord> {
    state
        .service
        .update_purchase(&OwnerId(owner_id), &PurchaseRecordId(record_id), request)
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn delete(
    State(state): State<ApiState>,
    Path((owner_id, record_id)): Path<(String, String)>,
) -> ApiResult<PurchaseRecord> {
    state
        .service
        .delete_purchase(&OwnerId(owner_id), &PurchaseRecordId(record_id))
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn stats(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Query(query): Query<SpendingQuery>,
) -> ApiResult<SpendingStats> {
    state.service.spending_stats(&OwnerId(owner_id), query.year).await.map(Json).map_err(reject)
}
