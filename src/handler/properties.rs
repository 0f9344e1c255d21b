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
    db::{
        propertydb::{PropertyExt, PropertySearchFilters},
        userdb::UserExt,
    },
    dtos::{
        propertydtos::{CreatePropertyDto, PropertyFilterDto, PropertySearchQueryDto},
        userdtos::RequestQueryDto,
    },
    error::HttpError,
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn property_handler() -> Router {
    let protected_routes = Router::new()
        .route(
            "/create",
            post(create_property).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Hunter])
            })),
        )
        .route(
            "/my-properties",
            get(get_my_properties).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Hunter])
            })),
        )
        .layer(middleware::from_fn(auth));

    let public_routes = Router::new()
        .route("/active", get(get_active_properties))
        .route("/:property_id", get(get_property_by_id));

    Router::new().merge(protected_routes).merge(public_routes)
}

// Hunter lists a property
pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(mut body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Free text straight from the client
    body.description = ammonia::clean(&body.description);

    let property = app_state
        .db_client
        .create_property(user.user.id, body)
        .await
        .map_err(|e| {
            if e.to_string().contains("Duplicate property listing") {
                HttpError::bad_request("A property at this address is already listed")
            } else {
                HttpError::server_error(e.to_string())
            }
        })?;

    let hunter_username = user.user.username.clone();
    let filtered_property = PropertyFilterDto::from_property(&property, hunter_username);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Property listed and open for viewing requests",
        "data": {
            "property": filtered_property
        }
    })))
}

pub async fn get_my_properties(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(10);

    let properties = app_state
        .db_client
        .get_properties_by_hunter(user.user.id, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let hunter_username = user.user.username.clone();
    let filtered_properties: Vec<PropertyFilterDto> = properties
        .iter()
        .map(|p| PropertyFilterDto::from_property(p, hunter_username.clone()))
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": filtered_properties,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": filtered_properties.len()
            }
        }
    })))
}

pub async fn get_active_properties(
    Query(query_params): Query<PropertySearchQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(10);

    let filters = PropertySearchFilters {
        property_type: query_params.property_type,
        city: query_params.city,
        state: query_params.state,
        country: query_params.country,
        bedrooms: query_params.bedrooms,
        min_rent: query_params.min_rent,
        max_rent: query_params.max_rent,
    };

    let properties = app_state
        .db_client
        .get_active_properties(filters, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered_properties = Vec::with_capacity(properties.len());
    for property in &properties {
        let hunter = app_state
            .db_client
            .get_user(Some(property.hunter_id), None, None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::server_error("Hunter not found"))?;

        filtered_properties.push(PropertyFilterDto::from_property(property, hunter.username));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "properties": filtered_properties,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": filtered_properties.len()
            }
        }
    })))
}

pub async fn get_property_by_id(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    let hunter = app_state
        .db_client
        .get_user(Some(property.hunter_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::server_error("Hunter not found"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "property": PropertyFilterDto::from_property(&property, hunter.username)
        }
    })))
}
