// service/audit_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    dtos::propertydtos::LinkPackageDto,
    models::viewingmodel::{Booking, ViewingRequest},
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct AuditService {
    db_client: Arc<DBClient>,
}

impl AuditService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn log_proposal(
        &self,
        tenant_id: Uuid,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            tenant_id,
            "viewing_proposed".to_string(),
            Some(request.id),
            Some(request.hunter_id),
            Some(serde_json::json!({
                "property_id": request.property_id,
                "proposed_date": request.proposed_date,
                "proposed_time": request.proposed_time,
                "escrow_amount": request.escrow_amount,
            })),
            "Viewing proposed with fee escrowed".to_string(),
        )
        .await
    }

    pub async fn log_counter(
        &self,
        actor_id: Uuid,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "viewing_countered".to_string(),
            Some(request.id),
            None,
            Some(serde_json::json!({
                "counter_date": request.counter_date,
                "counter_time": request.counter_time,
            })),
            "Counter-offer recorded".to_string(),
        )
        .await
    }

    pub async fn log_acceptance(
        &self,
        actor_id: Uuid,
        request: &ViewingRequest,
        booking: &Booking,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "viewing_accepted".to_string(),
            Some(request.id),
            None,
            Some(serde_json::json!({
                "booking_id": booking.id,
                "booking_reference": booking.reference,
                "scheduled_date": booking.scheduled_date,
                "escrow_amount": booking.escrow_amount,
            })),
            "Viewing accepted and booking created".to_string(),
        )
        .await
    }

    pub async fn log_rejection(
        &self,
        actor_id: Uuid,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "viewing_rejected".to_string(),
            Some(request.id),
            None,
            Some(serde_json::json!({
                "reason": request.rejection_reason,
            })),
            "Viewing rejected, refund requested".to_string(),
        )
        .await
    }

    pub async fn log_cancellation(
        &self,
        actor_id: Uuid,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "viewing_cancelled".to_string(),
            Some(request.id),
            None,
            None,
            "Accepted viewing cancelled, refund requested".to_string(),
        )
        .await
    }

    pub async fn log_completion(
        &self,
        actor_id: Uuid,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            actor_id,
            "viewing_completed".to_string(),
            Some(request.id),
            None,
            None,
            "Viewing conducted, release requested".to_string(),
        )
        .await
    }

    pub async fn log_payment_event(
        &self,
        request: &ViewingRequest,
        event_type: &str,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            request.tenant_id,
            format!("payment_{}", event_type.replace('.', "_")),
            Some(request.id),
            None,
            Some(serde_json::json!({
                "payment_status": request.payment_status.to_str(),
            })),
            format!("Gateway event {} applied", event_type),
        )
        .await
    }

    pub async fn log_package_linked(
        &self,
        admin_id: Uuid,
        group_id: Uuid,
        data: &LinkPackageDto,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "package_linked".to_string(),
            None,
            Some(data.hunter_id),
            Some(serde_json::json!({
                "group_id": group_id,
                "property_ids": data.property_ids,
                "tier": data.tier.to_str(),
            })),
            "Properties linked into viewing package".to_string(),
        )
        .await
    }

    pub async fn log_package_dissolved(
        &self,
        admin_id: Uuid,
        group_id: Uuid,
        cleared: u64,
    ) -> Result<(), ServiceError> {
        self.log_audit_event(
            admin_id,
            "package_dissolved".to_string(),
            None,
            None,
            Some(serde_json::json!({
                "group_id": group_id,
                "properties_cleared": cleared,
            })),
            "Viewing package dissolved".to_string(),
        )
        .await
    }

    async fn log_audit_event(
        &self,
        actor_id: Uuid,
        event_type: String,
        viewing_request_id: Option<Uuid>,
        related_user_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
        description: String,
    ) -> Result<(), ServiceError> {
        self.db_client
            .insert_audit_event(
                actor_id,
                event_type,
                viewing_request_id,
                related_user_id,
                metadata,
                description,
            )
            .await
            .map_err(ServiceError::Database)
    }
}
