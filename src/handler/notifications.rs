use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::notificationdb::NotificationExt,
    dtos::userdtos::RequestQueryDto,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notification_handler() -> Router {
    Router::new()
        .route("/", get(get_my_notifications))
        .route("/:notification_id/read", put(mark_read))
}

pub async fn get_my_notifications(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(20);

    let notifications = app_state
        .db_client
        .get_notifications_for_user(user.user.id, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "notifications": notifications,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": notifications.len()
            }
        }
    })))
}

pub async fn mark_read(
    Path(notification_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state
        .db_client
        .mark_notification_read(notification_id, user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Notification not found"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "notification": notification
        }
    })))
}
