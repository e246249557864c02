use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::maintenance::{MaintenanceRecord, MaintenanceRecordId};
use wardrobe_core::domain::wear::{WearRecord, WearStats};

use super::{reject, ApiCreated, ApiResult, ApiState};
use crate::service::{
    ItemChanges, LifecycleSummary, MaintenanceChanges, MaintenanceCosts, NewClothingItem,
    NewMaintenance, NewWear, RecordedWear, ReminderReport, DEFAULT_REMINDER_WINDOW_DAYS,
};

#[derive(Debug, Deserialize)]
pub struct ReminderQuery {
    pub days: Option<u32>,
}

fn ids(owner_id: String, item_id: String) -> (OwnerId, ClothingItemId) {
    (OwnerId(owner_id), ClothingItemId(item_id))
}

pub async fn list_items(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Vec<ClothingItem>> {
    state.service.list_items(&OwnerId(owner_id)).await.map(Json).map_err(reject)
}

pub async fn create_item(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Json(request): Json<NewClothingItem>,
) -> ApiCreated<ClothingItem> {
    let item = state.service.create_item(OwnerId(owner_id), request).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<ClothingItem> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.item(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn update_item(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(request): Json<ItemChanges>,
) -> ApiResult<ClothingItem> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.update_item(&owner_id, &item_id, request).await.map(Json).map_err(reject)
}

pub async fn toggle_favorite(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<ClothingItem> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.toggle_favorite(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn favorites(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Vec<ClothingItem>> {
    state.service.favorites(&OwnerId(owner_id)).await.map(Json).map_err(reject)
}

pub async fn delete_item(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<ClothingItem> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.delete_item(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn lifecycle(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<LifecycleSummary> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.lifecycle(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn record_wear(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
    request: Option<Json<NewWear>>,
) -> ApiCreated<RecordedWear> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let recorded = state.service.record_wear(&owner_id, &item_id, request).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn wear_history(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<Vec<WearRecord>> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.wear_history(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn wear_stats(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
) -> ApiResult<WearStats> {
    state.service.wear_stats(&OwnerId(owner_id)).await.map(Json).map_err(reject)
}

pub async fn add_maintenance(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(request): Json<NewMaintenance>,
) -> ApiCreated<MaintenanceRecord> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    let record =
        state.service.add_maintenance(&owner_id, &item_id, request).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn maintenance_history(
    State(state): State<ApiState>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> ApiResult<Vec<MaintenanceRecord>> {
    let (owner_id, item_id) = ids(owner_id, item_id);
    state.service.maintenance_history(&owner_id, &item_id).await.map(Json).map_err(reject)
}

pub async fn update_maintenance(
    State(state): State<ApiState>,
    Path((owner_id, record_id)): Path<(String, String)>,
    Json(request): Json<MaintenanceChanges>,
) -> ApiResult<MaintenanceRecord> {
    state
        .service
        .update_maintenance(&OwnerId(owner_id), &MaintenanceRecordId(record_id), request)
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn maintenance_reminders(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Query(query): Query<ReminderQuery>,
) -> ApiResult<ReminderReport> {
    let window_days = query.days.unwrap_or(DEFAULT_REMINDER_WINDOW_DAYS);
    state
        .service
        .maintenance_reminders(&OwnerId(owner_id), window_days, Utc::now().date_naive())
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn maintenance_costs(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
) -> ApiResult<MaintenanceCosts> {
    state.service.maintenance_costs(&OwnerId(owner_id)).await.map(Json).map_err(reject)
}
