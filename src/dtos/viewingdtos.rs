use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::viewingmodel::{
    Booking, BookingStatus, PaymentStatus, ViewingRequest, ViewingStatus,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProposeViewingDto {
    pub property_id: Uuid,

    pub proposed_date: NaiveDate,
    pub proposed_time: NaiveTime,

    #[validate(length(min = 3, max = 255, message = "Location must be between 3 and 255 characters"))]
    pub proposed_location: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CounterOfferDto {
    pub date: NaiveDate,
    pub time: NaiveTime,

    #[validate(length(min = 3, max = 255, message = "Location must be between 3 and 255 characters"))]
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RejectViewingDto {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewingRequestResponseDto {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub hunter_id: Uuid,
    pub status: ViewingStatus,
    pub payment_status: PaymentStatus,
    pub escrow_amount: f64,
    pub proposed_date: NaiveDate,
    pub proposed_time: NaiveTime,
    pub proposed_location: String,
    pub countered_by: Option<Uuid>,
    pub counter_date: Option<NaiveDate>,
    pub counter_time: Option<NaiveTime>,
    pub counter_location: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ViewingRequestResponseDto {
    pub fn from_request(request: &ViewingRequest) -> Self {
        ViewingRequestResponseDto {
            id: request.id,
            property_id: request.property_id,
            tenant_id: request.tenant_id,
            hunter_id: request.hunter_id,
            status: request.status,
            payment_status: request.payment_status,
            escrow_amount: request.escrow_amount.to_f64().unwrap_or(0.0),
            proposed_date: request.proposed_date,
            proposed_time: request.proposed_time,
            proposed_location: request.proposed_location.to_owned(),
            countered_by: request.countered_by,
            counter_date: request.counter_date,
            counter_time: request.counter_time,
            counter_location: request.counter_location.to_owned(),
            rejection_reason: request.rejection_reason.to_owned(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponseDto {
    pub id: Uuid,
    pub viewing_request_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub hunter_id: Uuid,
    pub reference: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,
    pub escrow_amount: f64,
    pub status: BookingStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl BookingResponseDto {
    pub fn from_booking(booking: &Booking) -> Self {
        BookingResponseDto {
            id: booking.id,
            viewing_request_id: booking.viewing_request_id,
            property_id: booking.property_id,
            tenant_id: booking.tenant_id,
            hunter_id: booking.hunter_id,
            reference: booking.reference.to_owned(),
            scheduled_date: booking.scheduled_date,
            scheduled_time: booking.scheduled_time,
            location: booking.location.to_owned(),
            escrow_amount: booking.escrow_amount.to_f64().unwrap_or(0.0),
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

// Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub status: String,
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;
        Self {
            status: "success".to_string(),
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
