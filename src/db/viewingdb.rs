// db/viewingdb.rs
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::viewingmodel::{
    Booking, BookingStatus, PaymentStatus, ViewingRequest, ViewingStatus,
};

const REQUEST_COLUMNS: &str = r#"
    id, property_id, tenant_id, hunter_id, status, payment_status, escrow_amount,
    proposed_date, proposed_time, proposed_location,
    countered_by, counter_date, counter_time, counter_location,
    rejection_reason, created_at, updated_at
"#;

const BOOKING_COLUMNS: &str = r#"
    id, viewing_request_id, property_id, tenant_id, hunter_id, reference,
    scheduled_date, scheduled_time, location, escrow_amount, status,
    created_at, updated_at
"#;

/// Every transition below is a single UPDATE conditioned on the status the
/// caller previously read (`WHERE id = $1 AND status = $2`). `Ok(None)`
/// means the row moved underneath the caller; the service surfaces that as
/// a conflict and the caller refetches and retries.
#[async_trait]
pub trait ViewingExt {
    async fn create_viewing_request(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        hunter_id: Uuid,
        escrow_amount: BigDecimal,
        proposed_date: NaiveDate,
        proposed_time: NaiveTime,
        proposed_location: String,
    ) -> Result<ViewingRequest, Error>;

    async fn get_viewing_request_by_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ViewingRequest>, Error>;

    async fn get_viewing_requests_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<ViewingRequest>, Error>;

    async fn counter_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        actor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        location: String,
    ) -> Result<Option<ViewingRequest>, Error>;

    /// Accept + booking creation in one transaction. The update is
    /// conditioned on the previously-read status AND on the escrow still
    /// being in place, so a racing payment webhook cannot slip an accept
    /// through after a refund.
    async fn accept_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        reference: String,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
        location: String,
    ) -> Result<Option<(ViewingRequest, Booking)>, Error>;

    async fn reject_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        reason: Option<String>,
    ) -> Result<Option<ViewingRequest>, Error>;

    /// Terminal transition out of `accepted` (cancel or complete). The
    /// booking row moves in lockstep inside the same transaction.
    async fn close_viewing_request(
        &self,
        request_id: Uuid,
        to_status: ViewingStatus,
        booking_status: BookingStatus,
    ) -> Result<Option<(ViewingRequest, Option<Booking>)>, Error>;

    async fn update_payment_status(
        &self,
        request_id: Uuid,
        expected: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<ViewingRequest>, Error>;

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error>;

    async fn get_booking_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<Booking>, Error>;

    async fn get_bookings_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Booking>, Error>;
}

#[async_trait]
impl ViewingExt for DBClient {
    async fn create_viewing_request(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        hunter_id: Uuid,
        escrow_amount: BigDecimal,
        proposed_date: NaiveDate,
        proposed_time: NaiveTime,
        proposed_location: String,
    ) -> Result<ViewingRequest, Error> {
        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            INSERT INTO viewing_requests
            (property_id, tenant_id, hunter_id, status, payment_status, escrow_amount,
             proposed_date, proposed_time, proposed_location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(property_id)
        .bind(tenant_id)
        .bind(hunter_id)
        .bind(ViewingStatus::Pending)
        .bind(PaymentStatus::Escrowed)
        .bind(escrow_amount)
        .bind(proposed_date)
        .bind(proposed_time)
        .bind(proposed_location)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_viewing_request_by_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ViewingRequest>, Error> {
        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            SELECT {} FROM viewing_requests WHERE id = $1
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_viewing_requests_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<ViewingRequest>, Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            SELECT {} FROM viewing_requests
            WHERE tenant_id = $1 OR hunter_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn counter_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        actor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        location: String,
    ) -> Result<Option<ViewingRequest>, Error> {
        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            UPDATE viewing_requests
            SET status = $3,
                countered_by = $4,
                counter_date = $5,
                counter_time = $6,
                counter_location = $7,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(expected_status)
        .bind(ViewingStatus::Countered)
        .bind(actor_id)
        .bind(date)
        .bind(time)
        .bind(location)
        .fetch_optional(&self.pool)
        .await
    }

    async fn accept_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        reference: String,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
        location: String,
    ) -> Result<Option<(ViewingRequest, Booking)>, Error> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            UPDATE viewing_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND payment_status = $4
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(expected_status)
        .bind(ViewingStatus::Accepted)
        .bind(PaymentStatus::Escrowed)
        .fetch_optional(&mut *tx)
        .await?;

        let request = match request {
            Some(request) => request,
            None => return Ok(None),
        };

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
            (viewing_request_id, property_id, tenant_id, hunter_id, reference,
             scheduled_date, scheduled_time, location, escrow_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(request.id)
        .bind(request.property_id)
        .bind(request.tenant_id)
        .bind(request.hunter_id)
        .bind(reference)
        .bind(scheduled_date)
        .bind(scheduled_time)
        .bind(location)
        .bind(request.escrow_amount.clone())
        .bind(BookingStatus::Confirmed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((request, booking)))
    }

    async fn reject_viewing_request(
        &self,
        request_id: Uuid,
        expected_status: ViewingStatus,
        reason: Option<String>,
    ) -> Result<Option<ViewingRequest>, Error> {
        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            UPDATE viewing_requests
            SET status = $3, rejection_reason = $4, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(expected_status)
        .bind(ViewingStatus::Rejected)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
    }

    async fn close_viewing_request(
        &self,
        request_id: Uuid,
        to_status: ViewingStatus,
        booking_status: BookingStatus,
    ) -> Result<Option<(ViewingRequest, Option<Booking>)>, Error> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            UPDATE viewing_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(ViewingStatus::Accepted)
        .bind(to_status)
        .fetch_optional(&mut *tx)
        .await?;

        let request = match request {
            Some(request) => request,
            None => return Ok(None),
        };

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE viewing_request_id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(request_id)
        .bind(BookingStatus::Confirmed)
        .bind(booking_status)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((request, booking)))
    }

    async fn update_payment_status(
        &self,
        request_id: Uuid,
        expected: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<ViewingRequest>, Error> {
        sqlx::query_as::<_, ViewingRequest>(&format!(
            r#"
            UPDATE viewing_requests
            SET payment_status = $3, updated_at = NOW()
            WHERE id = $1 AND payment_status = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(expected)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {} FROM bookings WHERE id = $1
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_booking_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<Booking>, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {} FROM bookings WHERE viewing_request_id = $1
            "#,
            BOOKING_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_bookings_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Booking>, Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE tenant_id = $1 OR hunter_id = $1
            ORDER BY scheduled_date DESC, scheduled_time DESC
            LIMIT $2 OFFSET $3
            "#,
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
