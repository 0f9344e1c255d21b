use sqlx::types::chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::BigDecimal, FromRow};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
pub enum PropertyStatus {
    Draft,     // Hunter is still composing the listing
    Active,
    Suspended, // Temporarily disabled
    Rented,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Duplex,
    Studio,
    Room,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "package_tier", rename_all = "snake_case")]
pub enum PackageTier {
    Bronze,
    Gold,
    Platinum,
}

impl PackageTier {
    pub fn to_str(&self) -> &str {
        match self {
            PackageTier::Bronze => "bronze",
            PackageTier::Gold => "gold",
            PackageTier::Platinum => "platinum",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub hunter_id: Uuid,

    // Basic listing info
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,

    // Location details
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,

    // Specifications
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,

    // Pricing
    pub rent_amount: BigDecimal,
    pub viewing_fee: BigDecimal,
    pub currency: String,

    // Package linking. All members of a group share the hunter; the master
    // row (position 1) keeps package_master_id NULL.
    pub package_group_id: Option<Uuid>,
    pub package_position: Option<i32>,
    pub package_master_id: Option<Uuid>,
    pub package_tier: Option<PackageTier>,

    pub status: PropertyStatus,
    pub listed_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn is_package_master(&self) -> bool {
        self.package_group_id.is_some() && self.package_master_id.is_none()
    }
}
