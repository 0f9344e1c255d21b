use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::propertymodel::{PackageTier, Property, PropertyStatus, PropertyType};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePropertyDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 2000, message = "Description must be between 20 and 2000 characters"))]
    pub description: String,

    pub property_type: PropertyType,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,

    #[validate(range(min = 0, max = 50, message = "Bedrooms must be between 0 and 50"))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0, max = 50, message = "Bathrooms must be between 0 and 50"))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 1.0, message = "Rent must be positive"))]
    pub rent_amount: f64,

    #[validate(range(min = 0.0, message = "Viewing fee must not be negative"))]
    pub viewing_fee: f64,

    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyFilterDto {
    pub id: Uuid,
    pub hunter_username: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub rent_amount: f64,
    pub viewing_fee: f64,
    pub currency: String,
    pub status: PropertyStatus,
    pub package_group_id: Option<Uuid>,
    pub package_position: Option<i32>,
    pub package_tier: Option<PackageTier>,
    pub listed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PropertyFilterDto {
    pub fn from_property(property: &Property, hunter_username: String) -> Self {
        PropertyFilterDto {
            id: property.id,
            hunter_username,
            title: property.title.to_owned(),
            description: property.description.to_owned(),
            property_type: property.property_type,
            address: property.address.to_owned(),
            city: property.city.to_owned(),
            state: property.state.to_owned(),
            country: property.country.to_owned(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            rent_amount: property.rent_amount.to_f64().unwrap_or(0.0),
            viewing_fee: property.viewing_fee.to_f64().unwrap_or(0.0),
            currency: property.currency.to_owned(),
            status: property.status,
            package_group_id: property.package_group_id,
            package_position: property.package_position,
            package_tier: property.package_tier,
            listed_at: property.listed_at,
            created_at: property.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PropertySearchQueryDto {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub bedrooms: Option<i32>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LinkPackageDto {
    pub hunter_id: Uuid,

    // A package is exactly three listings; position follows list order.
    #[validate(length(min = 3, max = 3, message = "A package links exactly three properties"))]
    pub property_ids: Vec<Uuid>,

    pub tier: PackageTier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackageResponseDto {
    pub group_id: Uuid,
    pub hunter_id: Uuid,
    pub tier: Option<PackageTier>,
    pub properties: Vec<PropertyFilterDto>,
}
