use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::propertydtos::{LinkPackageDto, PackageResponseDto, PropertyFilterDto},
    error::HttpError,
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn package_handler() -> Router {
    let admin_routes = Router::new()
        .route(
            "/link",
            post(link_package).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/:group_id/dissolve",
            post(dissolve_package).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .layer(middleware::from_fn(auth));

    let public_routes = Router::new().route("/:group_id", get(get_package));

    Router::new().merge(admin_routes).merge(public_routes)
}

// Admin bundles three of a hunter's listings into one tiered package
pub async fn link_package(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<LinkPackageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let linked = app_state
        .package_service
        .link_properties(user.user.id, body)
        .await?;

    let group_id = linked
        .first()
        .and_then(|p| p.package_group_id)
        .ok_or_else(|| HttpError::server_error("Package linking returned no properties"))?;

    let response = build_package_response(&app_state, group_id, linked).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Properties linked into package",
        "data": {
            "package": response
        }
    })))
}

pub async fn dissolve_package(
    Path(group_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let cleared = app_state
        .package_service
        .dissolve_package(user.user.id, group_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Package dissolved",
        "data": {
            "group_id": group_id,
            "properties_cleared": cleared
        }
    })))
}

pub async fn get_package(
    Path(group_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let members = app_state.package_service.get_package(group_id).await?;

    let response = build_package_response(&app_state, group_id, members).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "package": response
        }
    })))
}

async fn build_package_response(
    app_state: &Arc<AppState>,
    group_id: Uuid,
    members: Vec<crate::models::propertymodel::Property>,
) -> Result<PackageResponseDto, HttpError> {
    let hunter_id = members
        .first()
        .map(|p| p.hunter_id)
        .ok_or_else(|| HttpError::not_found("Package has no members"))?;

    let hunter = app_state
        .db_client
        .get_user(Some(hunter_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::server_error("Hunter not found"))?;

    let tier = members.first().and_then(|p| p.package_tier);
    let properties = members
        .iter()
        .map(|p| PropertyFilterDto::from_property(p, hunter.username.clone()))
        .collect();

    Ok(PackageResponseDto {
        group_id,
        hunter_id,
        tier,
        properties,
    })
}
