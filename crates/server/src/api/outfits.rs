use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use wardrobe_core::domain::clothing::OwnerId;
use wardrobe_core::domain::outfit::{Outfit, OutfitId, OutfitRecommendation};

use super::{reject, ApiCreated, ApiResult, ApiState};
use crate::service::NewOutfit;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub weather: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
}

pub async fn recommend(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<OutfitRecommendation> {
    state
        .service
        .recommend(&OwnerId(owner_id), query.weather.as_deref())
        .await
        .map(Json)
        .map_err(reject)
}

pub async fn list(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Vec<Outfit>> {
    state.service.list_outfits(&OwnerId(owner_id)).await.map(Json).map_err(reject)
}

pub async fn create(
    State(state): State<ApiState>,
    Path(owner_id): Path<String>,
    Json(request): Json<NewOutfit>,
) -> ApiCreated<Outfit> {
    let outfit = state.service.create_outfit(OwnerId(owner_id), request).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(outfit)))
}

pub async fn rate(
    State(state): State<ApiState>,
    Path((owner_id, outfit_id)): Path<(String, String)>,
    Json(request): Json<RatingRequest>,
) -> ApiResult<Outfit> {
    state
        .service
        .rate_outfit(&OwnerId(owner_id), &OutfitId(outfit_id), request.rating)
        .await
        .map(Json)
        .map_err(reject)
}
