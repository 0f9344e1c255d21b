use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::viewingdb::ViewingExt,
    dtos::{userdtos::RequestQueryDto, viewingdtos::BookingResponseDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn booking_handler() -> Router {
    Router::new()
        .route("/", get(get_my_bookings))
        .route("/:booking_id", get(get_booking))
}

pub async fn get_my_bookings(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(10);

    let bookings = app_state
        .db_client
        .get_bookings_for_user(user.user.id, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<BookingResponseDto> = bookings
        .iter()
        .map(BookingResponseDto::from_booking)
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "bookings": data,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": data.len()
            }
        }
    })))
}

pub async fn get_booking(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if booking.tenant_id != user.user.id && booking.hunter_id != user.user.id {
        return Err(HttpError::forbidden("You are not a party to this booking"));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "booking": BookingResponseDto::from_booking(&booking)
        }
    })))
}
