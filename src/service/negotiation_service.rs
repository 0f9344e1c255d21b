// service/negotiation_service.rs
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, propertydb::PropertyExt, viewingdb::ViewingExt},
    dtos::viewingdtos::{CounterOfferDto, ProposeViewingDto, RejectViewingDto},
    models::{
        propertymodel::PropertyStatus,
        viewingmodel::{Booking, BookingStatus, ViewingRequest, ViewingStatus},
    },
    service::{
        audit_service::AuditService, error::ServiceError,
        notification_service::NotificationService, payment_service::PaymentService,
    },
    utils::reference::generate_booking_reference,
};

use sqlx::types::BigDecimal;

/// Pure transition rules for the negotiation. Everything here works on a
/// request snapshot the caller already read; the persistence layer repeats
/// the status check inside the conditioned UPDATE, so a snapshot that went
/// stale surfaces as a conflict rather than a bad write.
pub mod rules {
    use super::*;
    use chrono::NaiveDate;

    /// The party whose offer is currently on the table. A request starts
    /// with the tenant's proposal, so an empty `countered_by` means the
    /// tenant.
    pub fn standing_offer_party(request: &ViewingRequest) -> Uuid {
        request.countered_by.unwrap_or(request.tenant_id)
    }

    pub fn ensure_party(request: &ViewingRequest, actor_id: Uuid) -> Result<(), ServiceError> {
        if actor_id != request.tenant_id && actor_id != request.hunter_id {
            return Err(ServiceError::Forbidden(actor_id, request.id));
        }
        Ok(())
    }

    pub fn ensure_negotiable(request: &ViewingRequest) -> Result<(), ServiceError> {
        if !request.status.is_negotiable() {
            return Err(ServiceError::Precondition(format!(
                "viewing request is {}, no longer open to negotiation",
                request.status.to_str()
            )));
        }
        Ok(())
    }

    /// Counter and accept are reserved for the party that did NOT make the
    /// standing offer; a counter always hands the turn to the other side.
    pub fn ensure_can_respond(
        request: &ViewingRequest,
        actor_id: Uuid,
    ) -> Result<(), ServiceError> {
        if standing_offer_party(request) == actor_id {
            return Err(ServiceError::Forbidden(actor_id, request.id));
        }
        Ok(())
    }

    pub fn ensure_escrowed(request: &ViewingRequest) -> Result<(), ServiceError> {
        if request.payment_status != crate::models::viewingmodel::PaymentStatus::Escrowed {
            return Err(ServiceError::Precondition(format!(
                "payment is {}, escrow must be in place",
                request.payment_status.to_str()
            )));
        }
        Ok(())
    }

    pub fn ensure_accepted(request: &ViewingRequest) -> Result<(), ServiceError> {
        if request.status != ViewingStatus::Accepted {
            return Err(ServiceError::Precondition(format!(
                "viewing request is {}, expected an accepted viewing",
                request.status.to_str()
            )));
        }
        Ok(())
    }

    pub fn ensure_future_slot(date: NaiveDate, today: NaiveDate) -> Result<(), ServiceError> {
        if date < today {
            return Err(ServiceError::Validation(
                "Viewing date cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NegotiationService {
    db_client: Arc<DBClient>,
    payment_service: Arc<PaymentService>,
    notification_service: Arc<NotificationService>,
    audit_service: Arc<AuditService>,
}

impl NegotiationService {
    pub fn new(
        db_client: Arc<DBClient>,
        payment_service: Arc<PaymentService>,
        notification_service: Arc<NotificationService>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            payment_service,
            notification_service,
            audit_service,
        }
    }

    pub async fn propose(
        &self,
        tenant_id: Uuid,
        data: ProposeViewingDto,
    ) -> Result<ViewingRequest, ServiceError> {
        rules::ensure_future_slot(data.proposed_date, Utc::now().date_naive())?;

        let property = self
            .db_client
            .get_property_by_id(data.property_id)
            .await?
            .ok_or(ServiceError::PropertyNotFound(data.property_id))?;

        if property.status != PropertyStatus::Active {
            return Err(ServiceError::Validation(
                "Property is not available for viewings".to_string(),
            ));
        }

        if property.hunter_id == tenant_id {
            return Err(ServiceError::Validation(
                "You cannot request a viewing of your own listing".to_string(),
            ));
        }

        // The viewing fee is collected upfront at proposal time, so the
        // request is born escrowed; the amount snapshot never changes even
        // if the hunter later edits the listing.
        let escrow_amount: BigDecimal = property.viewing_fee.clone();

        let request = self
            .db_client
            .create_viewing_request(
                property.id,
                tenant_id,
                property.hunter_id,
                escrow_amount,
                data.proposed_date,
                data.proposed_time,
                data.proposed_location,
            )
            .await?;

        self.audit_service
            .log_proposal(tenant_id, &request)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", request.id, err)
            });

        if let Err(err) = self
            .notification_service
            .notify_viewing_proposed(&request, &property.title)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                request.id,
                err
            );
        }

        Ok(request)
    }

    pub async fn counter(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        data: CounterOfferDto,
    ) -> Result<ViewingRequest, ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        rules::ensure_party(&request, actor_id)?;
        rules::ensure_negotiable(&request)?;
        rules::ensure_can_respond(&request, actor_id)?;
        rules::ensure_future_slot(data.date, Utc::now().date_naive())?;

        let updated = self
            .db_client
            .counter_viewing_request(
                request_id,
                request.status,
                actor_id,
                data.date,
                data.time,
                data.location,
            )
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        self.audit_service
            .log_counter(actor_id, &updated)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", updated.id, err)
            });

        let counterparty = self.counterparty(&updated, actor_id);
        if let Err(err) = self
            .notification_service
            .notify_counter_offer(&updated, counterparty)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                updated.id,
                err
            );
        }

        Ok(updated)
    }

    pub async fn accept(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(ViewingRequest, Booking), ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        rules::ensure_party(&request, actor_id)?;
        rules::ensure_negotiable(&request)?;
        rules::ensure_can_respond(&request, actor_id)?;
        rules::ensure_escrowed(&request)?;

        // The booking snapshots whatever offer is on the table; the caller
        // never supplies a slot of their own.
        let (date, time, location) = request.standing_offer();
        let location = location.to_string();
        let reference = generate_booking_reference();

        let (accepted, booking) = self
            .db_client
            .accept_viewing_request(request_id, request.status, reference, date, time, location)
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        self.audit_service
            .log_acceptance(actor_id, &accepted, &booking)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", accepted.id, err)
            });

        if let Err(err) = self
            .notification_service
            .notify_viewing_accepted(&accepted, &booking)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                accepted.id,
                err
            );
        }

        Ok((accepted, booking))
    }

    pub async fn reject(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        data: RejectViewingDto,
    ) -> Result<ViewingRequest, ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        rules::ensure_party(&request, actor_id)?;
        rules::ensure_negotiable(&request)?;

        let reason = data.reason.map(|r| ammonia::clean(&r));

        let updated = self
            .db_client
            .reject_viewing_request(request_id, request.status, reason)
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        // The refund itself is the gateway's business; the flag flips when
        // its webhook lands.
        self.payment_service.request_refund(&updated).await;

        self.audit_service
            .log_rejection(actor_id, &updated)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", updated.id, err)
            });

        let counterparty = self.counterparty(&updated, actor_id);
        if let Err(err) = self
            .notification_service
            .notify_viewing_rejected(&updated, counterparty)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                updated.id,
                err
            );
        }

        Ok(updated)
    }

    pub async fn cancel(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ViewingRequest, ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        rules::ensure_party(&request, actor_id)?;
        rules::ensure_accepted(&request)?;

        let (cancelled, _booking) = self
            .db_client
            .close_viewing_request(request_id, ViewingStatus::Cancelled, BookingStatus::Cancelled)
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        self.payment_service.request_refund(&cancelled).await;

        self.audit_service
            .log_cancellation(actor_id, &cancelled)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", cancelled.id, err)
            });

        if let Err(err) = self
            .notification_service
            .notify_viewing_cancelled(&cancelled, actor_id)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                cancelled.id,
                err
            );
        }

        Ok(cancelled)
    }

    pub async fn complete(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ViewingRequest, ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        // Only the hunter conducted the viewing, so only the hunter closes
        // it out.
        if actor_id != request.hunter_id {
            return Err(ServiceError::Forbidden(actor_id, request.id));
        }
        rules::ensure_accepted(&request)?;

        let (completed, _booking) = self
            .db_client
            .close_viewing_request(request_id, ViewingStatus::Completed, BookingStatus::Completed)
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        self.payment_service.request_release(&completed).await;

        self.audit_service
            .log_completion(actor_id, &completed)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("audit log failed for viewing request {}: {}", completed.id, err)
            });

        if let Err(err) = self
            .notification_service
            .notify_viewing_completed(&completed)
            .await
        {
            tracing::warn!(
                "notification dispatch failed for viewing request {}: {}",
                completed.id,
                err
            );
        }

        Ok(completed)
    }

    pub async fn get_request_for_party(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ViewingRequest, ServiceError> {
        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        rules::ensure_party(&request, actor_id)?;

        Ok(request)
    }

    fn counterparty(&self, request: &ViewingRequest, actor_id: Uuid) -> Uuid {
        if actor_id == request.tenant_id {
            request.hunter_id
        } else {
            request.tenant_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use crate::models::viewingmodel::PaymentStatus;
    use chrono::{NaiveDate, NaiveTime};

    fn request(
        tenant_id: Uuid,
        hunter_id: Uuid,
        status: ViewingStatus,
        payment_status: PaymentStatus,
        countered_by: Option<Uuid>,
    ) -> ViewingRequest {
        ViewingRequest {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            tenant_id,
            hunter_id,
            status,
            payment_status,
            escrow_amount: BigDecimal::try_from(50.0).unwrap(),
            proposed_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            proposed_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            proposed_location: "At the property".to_string(),
            countered_by,
            counter_date: None,
            counter_time: None,
            counter_location: None,
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_standing_offer_party_defaults_to_tenant() {
        let tenant = Uuid::new_v4();
        let hunter = Uuid::new_v4();
        let req = request(tenant, hunter, ViewingStatus::Pending, PaymentStatus::Escrowed, None);

        assert_eq!(standing_offer_party(&req), tenant);
    }

    #[test]
    fn test_counter_turn_taking() {
        let tenant = Uuid::new_v4();
        let hunter = Uuid::new_v4();

        // Tenant holds the standing offer, so the hunter may respond and
        // the tenant may not.
        let req = request(tenant, hunter, ViewingStatus::Pending, PaymentStatus::Escrowed, None);
        assert!(ensure_can_respond(&req, hunter).is_ok());
        assert!(matches!(
            ensure_can_respond(&req, tenant),
            Err(ServiceError::Forbidden(_, _))
        ));

        // After the hunter counters, the turn flips back to the tenant.
        let req = request(
            tenant,
            hunter,
            ViewingStatus::Countered,
            PaymentStatus::Escrowed,
            Some(hunter),
        );
        assert!(ensure_can_respond(&req, tenant).is_ok());
        assert!(matches!(
            ensure_can_respond(&req, hunter),
            Err(ServiceError::Forbidden(_, _))
        ));
    }

    #[test]
    fn test_outsiders_are_never_parties() {
        let req = request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            ViewingStatus::Pending,
            PaymentStatus::Escrowed,
            None,
        );
        assert!(matches!(
            ensure_party(&req, Uuid::new_v4()),
            Err(ServiceError::Forbidden(_, _))
        ));
    }

    #[test]
    fn test_accept_requires_escrow() {
        let tenant = Uuid::new_v4();
        let hunter = Uuid::new_v4();

        for payment in [
            PaymentStatus::None,
            PaymentStatus::Released,
            PaymentStatus::Refunded,
        ] {
            let req = request(tenant, hunter, ViewingStatus::Pending, payment, None);
            assert!(matches!(
                ensure_escrowed(&req),
                Err(ServiceError::Precondition(_))
            ));
        }

        let req = request(tenant, hunter, ViewingStatus::Countered, PaymentStatus::Escrowed, None);
        assert!(ensure_escrowed(&req).is_ok());
    }

    #[test]
    fn test_terminal_states_are_not_negotiable() {
        let tenant = Uuid::new_v4();
        let hunter = Uuid::new_v4();

        for status in [
            ViewingStatus::Accepted,
            ViewingStatus::Rejected,
            ViewingStatus::Cancelled,
            ViewingStatus::Completed,
        ] {
            let req = request(tenant, hunter, status, PaymentStatus::Escrowed, None);
            assert!(matches!(
                ensure_negotiable(&req),
                Err(ServiceError::Precondition(_))
            ));
        }
    }

    #[test]
    fn test_past_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let yesterday = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert!(matches!(
            ensure_future_slot(yesterday, today),
            Err(ServiceError::Validation(_))
        ));

        assert!(ensure_future_slot(today, today).is_ok());
        let tomorrow = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert!(ensure_future_slot(tomorrow, today).is_ok());
    }

    #[test]
    fn test_negotiation_walkthrough() {
        // Tenant proposes 2026-02-01 14:00, hunter counters with
        // 2026-02-02 10:00, the tenant may not counter again but may
        // accept, and the booking slot is the hunter's counter.
        let tenant = Uuid::new_v4();
        let hunter = Uuid::new_v4();

        let mut req = request(tenant, hunter, ViewingStatus::Pending, PaymentStatus::Escrowed, None);
        assert_eq!(req.standing_offer().0, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        // Hunter counters
        assert!(ensure_negotiable(&req).is_ok());
        assert!(ensure_can_respond(&req, hunter).is_ok());
        req.status = ViewingStatus::Countered;
        req.countered_by = Some(hunter);
        req.counter_date = NaiveDate::from_ymd_opt(2026, 2, 2);
        req.counter_time = NaiveTime::from_hms_opt(10, 0, 0);
        req.counter_location = Some("Front gate".to_string());

        // The hunter holds the standing offer and may not counter again
        assert!(matches!(
            ensure_can_respond(&req, hunter),
            Err(ServiceError::Forbidden(_, _))
        ));

        // Tenant accepts; the standing offer is the counter slot.
        assert!(ensure_can_respond(&req, tenant).is_ok());
        assert!(ensure_escrowed(&req).is_ok());
        let (date, time, location) = req.standing_offer();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(location, "Front gate");

        // Once accepted, the request has left the negotiable states: a
        // caller racing on a stale snapshot fails the recheck, which is
        // exactly what the conditioned UPDATE enforces in SQL.
        req.status = ViewingStatus::Accepted;
        assert!(matches!(
            ensure_negotiable(&req),
            Err(ServiceError::Precondition(_))
        ));
    }
}
