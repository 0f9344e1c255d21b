// db/notificationdb.rs
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::viewingmodel::{AuditEvent, Notification};

#[async_trait]
pub trait NotificationExt {
    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: String,
        viewing_request_id: Option<Uuid>,
        metadata: Option<JsonValue>,
        message: String,
    ) -> Result<(), Error>;

    async fn get_notifications_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, Error>;

    async fn insert_audit_event(
        &self,
        actor_id: Uuid,
        event_type: String,
        viewing_request_id: Option<Uuid>,
        related_user_id: Option<Uuid>,
        metadata: Option<JsonValue>,
        description: String,
    ) -> Result<(), Error>;

    async fn get_audit_events_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<AuditEvent>, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: String,
        viewing_request_id: Option<Uuid>,
        metadata: Option<JsonValue>,
        message: String,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (user_id, kind, viewing_request_id, metadata, message, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(viewing_request_id)
        .bind(metadata)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_notifications_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Notification>, Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, viewing_request_id, metadata, message, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, kind, viewing_request_id, metadata, message, read, created_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_audit_event(
        &self,
        actor_id: Uuid,
        event_type: String,
        viewing_request_id: Option<Uuid>,
        related_user_id: Option<Uuid>,
        metadata: Option<JsonValue>,
        description: String,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO audit_events
            (actor_id, event_type, viewing_request_id, related_user_id, metadata, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(actor_id)
        .bind(event_type)
        .bind(viewing_request_id)
        .bind(related_user_id)
        .bind(metadata)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_audit_events_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<AuditEvent>, Error> {
        sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT id, actor_id, event_type, viewing_request_id, related_user_id, metadata, description, created_at
            FROM audit_events
            WHERE viewing_request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await
    }
}
