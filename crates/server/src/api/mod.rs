//! JSON API routes.
//!
//! Catalog:
//! - `GET    /api/v1/categories/tree`: active category forest
//! - `POST   /api/v1/categories`: create a category
//! - `PUT    /api/v1/categories/{id}`: rename, reorder or reparent
//! - `DELETE /api/v1/categories/{id}`: soft delete when unused
//! - `GET    /api/v1/categories/{id}/path`: `root > ... > name`
//! - `POST   /api/v1/categories/{id}/move`: reparent (null parent moves to root)
//! - `GET    /api/v1/categories/stats`: active item counts, `?owner_id=` optional
//!
//! Wardrobe, all under `/api/v1/owners/{owner_id}`:
//! - `GET|POST   /items`, `GET|PUT|DELETE /items/{item_id}`, `GET /items/{item_id}/lifecycle`
//! - `POST       /items/{item_id}/favorite` toggles, `GET /favorites`
//! - `GET|POST   /items/{item_id}/wear`, `GET /wear/stats`
//! - `GET|POST   /items/{item_id}/maintenance`, `PUT /maintenance/{record_id}`
//! - `GET        /maintenance/reminders?days=N`, `GET /maintenance/costs`
//! - `GET|POST   /items/{item_id}/purchase`, `GET /purchases?from=&to=&store=`
//! - `GET|PUT|DELETE /purchases/{record_id}`, `GET /purchases/stats?year=Y`
//! - `GET        /recommendation?weather=W`, `GET|POST /outfits`
//! - `POST       /outfits/{outfit_id}/rating`

mod catalog;
mod outfits;
mod purchases;
mod wardrobe;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use wardrobe_core::errors::{ApplicationError, InterfaceError};

use crate::service::WardrobeService;

#[derive(Clone)]
pub struct ApiState {
    service: Arc<WardrobeService>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

pub type ApiRejection = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<Json<T>, ApiRejection>;
pub type ApiCreated<T> = Result<(StatusCode, Json<T>), ApiRejection>;

pub fn router(service: WardrobeService) -> Router {
    Router::new()
        .route("/api/v1/categories", post(catalog::create))
        .route("/api/v1/categories/tree", get(catalog::tree))
        .route("/api/v1/categories/stats", get(catalog::stats))
        .route("/api/v1/categories/{id}", put(catalog::update).delete(catalog::delete))
        .route("/api/v1/categories/{id}/path", get(catalog::path))
        .route("/api/v1/categories/{id}/move", post(catalog::move_category))
        .route(
            "/api/v1/owners/{owner_id}/items",
            get(wardrobe::list_items).post(wardrobe::create_item),
        )
        .route(
            "/api/v1/owners/{owner_id}/items/{item_id}",
            get(wardrobe::get_item).put(wardrobe::update_item).delete(wardrobe::delete_item),
        )
        .route(
            "/api/v1/owners/{owner_id}/items/{item_id}/favorite",
            post(wardrobe::toggle_favorite),
        )
        .route("/api/v1/owners/{owner_id}/favorites", get(wardrobe::favorites))
        .route("/api/v1/owners/{owner_id}/items/{item_id}/lifecycle", get(wardrobe::lifecycle))
        .route(
            "/api/v1/owners/{owner_id}/items/{item_id}/wear",
            get(wardrobe::wear_history).post(wardrobe::record_wear),
        )
        .route("/api/v1/owners/{owner_id}/wear/stats", get(wardrobe::wear_stats))
        .route(
            "/api/v1/owners/{owner_id}/items/{item_id}/maintenance",
            get(wardrobe::maintenance_history).post(wardrobe::add_maintenance),
        )
        .route(
            "/api/v1/owners/{owner_id}/maintenance/{record_id}",
            put(wardrobe::update_maintenance),
        )
        .route(
            "/api/v1/owners/{owner_id}/maintenance/reminders",
            get(wardrobe::maintenance_reminders),
        )
        .route("/api/v1/owners/{owner_id}/maintenance/costs", get(wardrobe::maintenance_costs))
        .route(
            "/api/v1/owners/{owner_id}/items/{item_id}/purchase",
            get(purchases::for_item).post(purchases::add),
        )
        .route("/api/v1/owners/{owner_id}/purchases", get(purchases::list))
        .route("/api/v1/owners/{owner_id}/purchases/stats", get(purchases::stats))
        .route(
            "/api/v1/owners/{owner_id}/purchases/{record_id}",
            get(purchases::get).put(purchases::update).delete(purchases::delete),
        )
        .route("/api/v1/owners/{owner_id}/recommendation", get(outfits::recommend))
        .route("/api/v1/owners/{owner_id}/outfits", get(outfits::list).post(outfits::create))
        .route("/api/v1/owners/{owner_id}/outfits/{outfit_id}/rating", post(outfits::rate))
        .with_state(ApiState { service: Arc::new(service) })
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a service failure to a status code and a user-safe body. Server-side failures keep
/// their detail in the log only.
pub(crate) fn reject(failure: ApplicationError) -> ApiRejection {
    let interface = failure.into_interface(Uuid::new_v4().to_string());
    let status = status_for(&interface);

    let detail = if status.is_server_error() {
        error!(
            event_name = "api.request.failed",
            correlation_id = interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "request failed"
        );
        interface.user_message().to_string()
    } else {
        warn!(
            event_name = "api.request.rejected",
            correlation_id = interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "request rejected"
        );
        interface.message().to_string()
    };

    (
        status,
        Json(ErrorBody {
            error: interface.user_message().to_string(),
            detail,
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}
