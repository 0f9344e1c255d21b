use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{error::HttpError, AppState};

pub fn payment_handler() -> Router {
    Router::new().route("/webhook", post(gateway_webhook))
}

// Escrow gateway webhook. The gateway signs the JSON payload with
// HMAC-SHA512 over the shared secret; anything unsigned is dropped before
// it can touch a payment flag.
pub async fn gateway_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, HttpError> {
    let signature = headers
        .get("x-gateway-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            HttpError::new(
                "Missing or invalid gateway signature".to_string(),
                StatusCode::BAD_REQUEST,
            )
        })?;

    let webhook_secret = &app_state.env.payment_gateway_secret;

    if !verify_gateway_signature(&body, signature, webhook_secret) {
        tracing::warn!("Invalid gateway webhook signature received");
        return Err(HttpError::new(
            "Invalid webhook signature".to_string(),
            StatusCode::UNAUTHORIZED,
        ));
    }

    let event_type = body["event"].as_str().ok_or_else(|| {
        HttpError::new(
            "Missing event type in webhook payload".to_string(),
            StatusCode::BAD_REQUEST,
        )
    })?;

    let data = &body["data"];

    match event_type {
        "escrow.funded" | "escrow.released" | "escrow.refunded" => {
            let request_id = data["viewing_request_id"]
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| {
                    HttpError::new(
                        "Missing viewing_request_id in webhook payload".to_string(),
                        StatusCode::BAD_REQUEST,
                    )
                })?;

            let updated = app_state
                .payment_service
                .apply_gateway_event(event_type, request_id)
                .await?;

            app_state
                .audit_service
                .log_payment_event(&updated, event_type)
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!("audit log failed for viewing request {}: {}", updated.id, err)
                });
        }
        _ => {
            tracing::info!("Unhandled gateway webhook event: {}", event_type);
        }
    }

    Ok(Json(serde_json::json!({"status": "success"})))
}

fn verify_gateway_signature(body: &serde_json::Value, signature: &str, secret: &str) -> bool {
    let payload = match serde_json::to_vec(body) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    let mut mac = match Hmac::<Sha512>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(&payload);

    let expected = hex::encode(mac.finalize().into_bytes());

    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &serde_json::Value, secret: &str) -> String {
        let payload = serde_json::to_vec(body).unwrap();
        let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(&payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_passes() {
        let body = serde_json::json!({
            "event": "escrow.funded",
            "data": { "viewing_request_id": "f6f39402-5012-4f44-8f9a-3d3b61be3c4c" }
        });
        let signature = sign(&body, "hush");

        assert!(verify_gateway_signature(&body, &signature, "hush"));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let body = serde_json::json!({ "event": "escrow.funded" });
        let signature = sign(&body, "hush");

        let tampered = serde_json::json!({ "event": "escrow.released" });
        assert!(!verify_gateway_signature(&tampered, &signature, "hush"));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = serde_json::json!({ "event": "escrow.funded" });
        let signature = sign(&body, "hush");

        assert!(!verify_gateway_signature(&body, &signature, "other"));
    }
}
