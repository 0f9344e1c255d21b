use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "viewing_status", rename_all = "snake_case")]
pub enum ViewingStatus {
    Pending,
    Countered,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl ViewingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ViewingStatus::Pending => "pending",
            ViewingStatus::Countered => "countered",
            ViewingStatus::Accepted => "accepted",
            ViewingStatus::Rejected => "rejected",
            ViewingStatus::Cancelled => "cancelled",
            ViewingStatus::Completed => "completed",
        }
    }

    /// A request still open to counter/accept/reject.
    pub fn is_negotiable(&self) -> bool {
        matches!(self, ViewingStatus::Pending | ViewingStatus::Countered)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViewingStatus::Rejected | ViewingStatus::Cancelled | ViewingStatus::Completed
        )
    }

    pub fn can_transition(&self, to: &ViewingStatus) -> bool {
        match (self, to) {
            (ViewingStatus::Pending, ViewingStatus::Countered) => true,
            (ViewingStatus::Pending, ViewingStatus::Accepted) => true,
            (ViewingStatus::Pending, ViewingStatus::Rejected) => true,
            (ViewingStatus::Countered, ViewingStatus::Countered) => true,
            (ViewingStatus::Countered, ViewingStatus::Accepted) => true,
            (ViewingStatus::Countered, ViewingStatus::Rejected) => true,
            (ViewingStatus::Accepted, ViewingStatus::Cancelled) => true,
            (ViewingStatus::Accepted, ViewingStatus::Completed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    None,
    Escrowed,
    Released,
    Refunded,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::None => "none",
            PaymentStatus::Escrowed => "escrowed",
            PaymentStatus::Released => "released",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// The gateway is the source of truth for money movement; this table
    /// only constrains which webhook-driven flag updates are coherent.
    pub fn can_transition(&self, to: &PaymentStatus) -> bool {
        match (self, to) {
            (PaymentStatus::None, PaymentStatus::Escrowed) => true,
            (PaymentStatus::Escrowed, PaymentStatus::Released) => true,
            (PaymentStatus::Escrowed, PaymentStatus::Refunded) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ViewingRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub hunter_id: Uuid,

    pub status: ViewingStatus,
    pub payment_status: PaymentStatus,

    // Snapshot of the property's viewing fee at proposal time; never changes
    // afterwards.
    pub escrow_amount: BigDecimal,

    // The tenant's initial proposal
    pub proposed_date: NaiveDate,
    pub proposed_time: NaiveTime,
    pub proposed_location: String,

    // Standing counter-offer, when one exists. countered_by records which
    // party made it; NULL means the standing offer is the initial proposal.
    pub countered_by: Option<Uuid>,
    pub counter_date: Option<NaiveDate>,
    pub counter_time: Option<NaiveTime>,
    pub counter_location: Option<String>,

    pub rejection_reason: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ViewingRequest {
    /// The slot currently on the table: the latest counter when present,
    /// otherwise the initial proposal.
    pub fn standing_offer(&self) -> (NaiveDate, NaiveTime, &str) {
        match (self.counter_date, self.counter_time, &self.counter_location) {
            (Some(date), Some(time), Some(location)) => (date, time, location.as_str()),
            _ => (
                self.proposed_date,
                self.proposed_time,
                self.proposed_location.as_str(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub viewing_request_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub hunter_id: Uuid,

    pub reference: String,

    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub location: String,

    // Copied from the originating request; immutable after creation.
    pub escrow_amount: BigDecimal,

    pub status: BookingStatus,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub viewing_request_id: Option<Uuid>,
    pub metadata: Option<JsonValue>,
    pub message: String,
    pub read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub event_type: String,
    pub viewing_request_id: Option<Uuid>,
    pub related_user_id: Option<Uuid>,
    pub metadata: Option<JsonValue>,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_transitions() {
        assert!(PaymentStatus::None.can_transition(&PaymentStatus::Escrowed));
        assert!(PaymentStatus::Escrowed.can_transition(&PaymentStatus::Released));
        assert!(PaymentStatus::Escrowed.can_transition(&PaymentStatus::Refunded));

        assert!(!PaymentStatus::None.can_transition(&PaymentStatus::Released));
        assert!(!PaymentStatus::Released.can_transition(&PaymentStatus::Refunded));
        assert!(!PaymentStatus::Refunded.can_transition(&PaymentStatus::Escrowed));
        assert!(!PaymentStatus::Escrowed.can_transition(&PaymentStatus::None));
    }

    #[test]
    fn test_viewing_transitions() {
        assert!(ViewingStatus::Pending.can_transition(&ViewingStatus::Countered));
        assert!(ViewingStatus::Countered.can_transition(&ViewingStatus::Countered));
        assert!(ViewingStatus::Countered.can_transition(&ViewingStatus::Accepted));
        assert!(ViewingStatus::Accepted.can_transition(&ViewingStatus::Completed));
        assert!(ViewingStatus::Accepted.can_transition(&ViewingStatus::Cancelled));

        // Terminal states never move again
        assert!(!ViewingStatus::Rejected.can_transition(&ViewingStatus::Pending));
        assert!(!ViewingStatus::Completed.can_transition(&ViewingStatus::Cancelled));
        assert!(!ViewingStatus::Cancelled.can_transition(&ViewingStatus::Completed));
        // Accepted can no longer be countered
        assert!(!ViewingStatus::Accepted.can_transition(&ViewingStatus::Countered));
    }
}
