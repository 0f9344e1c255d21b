// service/payment_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::Config,
    db::{db::DBClient, viewingdb::ViewingExt},
    models::viewingmodel::{PaymentStatus, ViewingRequest},
    service::error::ServiceError,
};

/// The escrow gate. Money never moves here: the gateway collects, releases
/// and refunds, and reports back through its webhook. This service applies
/// those reports to the payment flag and fires the outbound requests the
/// negotiation engine needs (refund on reject/cancel, release on complete).
#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    http_client: reqwest::Client,
    gateway_url: String,
    gateway_secret: String,
}

impl PaymentService {
    pub fn new(db_client: Arc<DBClient>, config: &Config) -> Self {
        Self {
            db_client,
            http_client: reqwest::Client::new(),
            gateway_url: config.payment_gateway_url.clone(),
            gateway_secret: config.payment_gateway_secret.clone(),
        }
    }

    /// Applies a gateway webhook event to a request's payment flag. The
    /// update is conditioned on the current flag, so replayed or
    /// out-of-order webhooks cannot clobber a newer state.
    pub async fn apply_gateway_event(
        &self,
        event_type: &str,
        request_id: Uuid,
    ) -> Result<ViewingRequest, ServiceError> {
        let target = match event_type {
            "escrow.funded" => PaymentStatus::Escrowed,
            "escrow.released" => PaymentStatus::Released,
            "escrow.refunded" => PaymentStatus::Refunded,
            other => {
                return Err(ServiceError::Validation(format!(
                    "Unknown gateway event: {}",
                    other
                )))
            }
        };

        let request = self
            .db_client
            .get_viewing_request_by_id(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        if !request.payment_status.can_transition(&target) {
            return Err(ServiceError::Precondition(format!(
                "payment cannot move from {} to {}",
                request.payment_status.to_str(),
                target.to_str()
            )));
        }

        let updated = self
            .db_client
            .update_payment_status(request_id, request.payment_status, target)
            .await?
            .ok_or(ServiceError::Conflict(request_id))?;

        tracing::info!(
            "Payment status for viewing request {} moved to {}",
            updated.id,
            updated.payment_status.to_str()
        );

        Ok(updated)
    }

    /// Asks the gateway to refund the tenant's escrowed viewing fee.
    /// Fire-and-forget: a failure is logged and never rolls back the state
    /// transition that triggered it.
    pub async fn request_refund(&self, request: &ViewingRequest) {
        self.post_gateway_action(request.id, "refund").await;
    }

    /// Asks the gateway to release the escrowed fee to the hunter.
    pub async fn request_release(&self, request: &ViewingRequest) {
        self.post_gateway_action(request.id, "release").await;
    }

    async fn post_gateway_action(&self, request_id: Uuid, action: &str) {
        let url = format!("{}/escrows/{}/{}", self.gateway_url, request_id, action);

        let result = self
            .http_client
            .post(&url)
            .bearer_auth(&self.gateway_secret)
            .json(&serde_json::json!({ "viewing_request_id": request_id }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    "Requested escrow {} for viewing request {}",
                    action,
                    request_id
                );
            }
            Ok(response) => {
                tracing::warn!(
                    "Gateway rejected escrow {} for viewing request {}: HTTP {}",
                    action,
                    request_id,
                    response.status()
                );
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to reach gateway for escrow {} on viewing request {}: {}",
                    action,
                    request_id,
                    err
                );
            }
        }
    }
}
