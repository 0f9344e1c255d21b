// service/notification_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::Config,
    db::{db::DBClient, notificationdb::NotificationExt, userdb::UserExt},
    mail::mails,
    models::viewingmodel::{Booking, ViewingRequest},
    service::error::ServiceError,
};

/// Fire-and-forget sink for counterparty updates: a tracing line, a stored
/// notification row, and (for bookings) an email. Callers log failures and
/// move on; a dead SMTP server never rolls back a transition.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    config: Config,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, config: Config) -> Self {
        Self { db_client, config }
    }

    pub async fn notify_viewing_proposed(
        &self,
        request: &ViewingRequest,
        property_title: &str,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "New viewing request {} for property {} from tenant {}",
            request.id,
            request.property_id,
            request.tenant_id
        );

        self.store(
            request.hunter_id,
            "viewing_proposed",
            request,
            serde_json::json!({
                "property_title": property_title,
                "proposed_date": request.proposed_date,
                "proposed_time": request.proposed_time,
            }),
            format!("New viewing request for {}", property_title),
        )
        .await
    }

    pub async fn notify_counter_offer(
        &self,
        request: &ViewingRequest,
        counterparty_id: Uuid,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Viewing request {} countered by {}",
            request.id,
            request.countered_by.map(|id| id.to_string()).unwrap_or_default()
        );

        self.store(
            counterparty_id,
            "viewing_countered",
            request,
            serde_json::json!({
                "counter_date": request.counter_date,
                "counter_time": request.counter_time,
                "counter_location": request.counter_location,
            }),
            "The other party proposed a new viewing slot".to_string(),
        )
        .await
    }

    pub async fn notify_viewing_accepted(
        &self,
        request: &ViewingRequest,
        booking: &Booking,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Viewing request {} accepted, booking {} created",
            request.id,
            booking.reference
        );

        let metadata = serde_json::json!({
            "booking_reference": booking.reference,
            "scheduled_date": booking.scheduled_date,
            "scheduled_time": booking.scheduled_time,
            "location": booking.location,
        });

        self.store(
            request.tenant_id,
            "viewing_accepted",
            request,
            metadata.clone(),
            format!("Viewing confirmed, reference {}", booking.reference),
        )
        .await?;

        self.store(
            request.hunter_id,
            "viewing_accepted",
            request,
            metadata,
            format!("Viewing confirmed, reference {}", booking.reference),
        )
        .await?;

        // Confirmation email to the tenant
        if let Some(tenant) = self
            .db_client
            .get_user(Some(request.tenant_id), None, None)
            .await
            .map_err(|e| ServiceError::Notification(e.to_string()))?
        {
            let config = self.config.clone();
            let booking = booking.clone();
            let to_email = tenant.email.clone();
            let name = tenant.name.clone();

            tokio::task::spawn_blocking(move || {
                if let Err(err) =
                    mails::send_booking_confirmation_email(&config, &to_email, &name, &booking)
                {
                    tracing::error!(
                        "Failed to send booking confirmation email to {}: {}",
                        to_email,
                        err
                    );
                }
            });
        }

        Ok(())
    }

    pub async fn notify_viewing_rejected(
        &self,
        request: &ViewingRequest,
        counterparty_id: Uuid,
    ) -> Result<(), ServiceError> {
        tracing::info!("Viewing request {} rejected", request.id);

        self.store(
            counterparty_id,
            "viewing_rejected",
            request,
            serde_json::json!({
                "reason": request.rejection_reason,
            }),
            "The viewing request was rejected; the escrowed fee will be refunded".to_string(),
        )
        .await
    }

    pub async fn notify_viewing_cancelled(
        &self,
        request: &ViewingRequest,
        cancelled_by: Uuid,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Accepted viewing {} cancelled by {}",
            request.id,
            cancelled_by
        );

        let metadata = serde_json::json!({ "cancelled_by": cancelled_by });

        self.store(
            request.tenant_id,
            "viewing_cancelled",
            request,
            metadata.clone(),
            "The confirmed viewing was cancelled".to_string(),
        )
        .await?;

        self.store(
            request.hunter_id,
            "viewing_cancelled",
            request,
            metadata,
            "The confirmed viewing was cancelled".to_string(),
        )
        .await
    }

    pub async fn notify_viewing_completed(
        &self,
        request: &ViewingRequest,
    ) -> Result<(), ServiceError> {
        tracing::info!("Viewing {} marked completed", request.id);

        self.store(
            request.tenant_id,
            "viewing_completed",
            request,
            serde_json::json!({}),
            "Your viewing was conducted; the hunter's report is on the way".to_string(),
        )
        .await
    }

    async fn store(
        &self,
        user_id: Uuid,
        kind: &str,
        request: &ViewingRequest,
        metadata: serde_json::Value,
        message: String,
    ) -> Result<(), ServiceError> {
        self.db_client
            .store_notification(
                user_id,
                kind.to_string(),
                Some(request.id),
                Some(metadata),
                message,
            )
            .await
            .map_err(|e| ServiceError::Notification(e.to_string()))
    }
}
