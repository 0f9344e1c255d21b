use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::viewingdb::ViewingExt,
    dtos::{
        userdtos::RequestQueryDto,
        viewingdtos::{
            ApiResponse, BookingResponseDto, CounterOfferDto, ProposeViewingDto,
            RejectViewingDto, ViewingRequestResponseDto,
        },
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn viewing_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(propose_viewing).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Tenant])
            })),
        )
        .route("/", get(get_my_viewing_requests))
        .route("/:request_id", get(get_viewing_request))
        .route("/:request_id/counter", post(counter_viewing))
        .route("/:request_id/accept", post(accept_viewing))
        .route("/:request_id/reject", post(reject_viewing))
        .route("/:request_id/cancel", post(cancel_viewing))
        .route(
            "/:request_id/complete",
            post(complete_viewing).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Hunter])
            })),
        )
}

// Tenant proposes a viewing; the fee is escrowed as part of the proposal.
pub async fn propose_viewing(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<ProposeViewingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .negotiation_service
        .propose(user.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Viewing request created; fee held in escrow",
        ViewingRequestResponseDto::from_request(&request),
    )))
}

pub async fn get_my_viewing_requests(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(10);

    let requests = app_state
        .db_client
        .get_viewing_requests_for_user(user.user.id, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<ViewingRequestResponseDto> = requests
        .iter()
        .map(ViewingRequestResponseDto::from_request)
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "viewing_requests": data,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": data.len()
            }
        }
    })))
}

pub async fn get_viewing_request(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .negotiation_service
        .get_request_for_party(request_id, user.user.id)
        .await?;

    let booking = app_state
        .db_client
        .get_booking_by_request_id(request_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "viewing_request": ViewingRequestResponseDto::from_request(&request),
            "booking": booking.map(|b| BookingResponseDto::from_booking(&b)),
        }
    })))
}

pub async fn counter_viewing(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CounterOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .negotiation_service
        .counter(request_id, user.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Counter-offer sent",
        ViewingRequestResponseDto::from_request(&request),
    )))
}

pub async fn accept_viewing(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let (request, booking) = app_state
        .negotiation_service
        .accept(request_id, user.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Viewing accepted and booked",
        "data": {
            "viewing_request": ViewingRequestResponseDto::from_request(&request),
            "booking": BookingResponseDto::from_booking(&booking),
        }
    })))
}

pub async fn reject_viewing(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<RejectViewingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .negotiation_service
        .reject(request_id, user.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Viewing rejected; refund requested",
        ViewingRequestResponseDto::from_request(&request),
    )))
}

pub async fn cancel_viewing(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .negotiation_service
        .cancel(request_id, user.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Viewing cancelled; refund requested",
        ViewingRequestResponseDto::from_request(&request),
    )))
}

pub async fn complete_viewing(
    Path(request_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .negotiation_service
        .complete(request_id, user.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Viewing marked as conducted; release requested",
        ViewingRequestResponseDto::from_request(&request),
    )))
}
