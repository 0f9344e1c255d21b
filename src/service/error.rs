use crate::error::HttpError;
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Viewing request {0} not found")]
    RequestNotFound(Uuid),

    #[error("Property {0} not found")]
    PropertyNotFound(Uuid),

    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("Package {0} not found")]
    PackageNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User {0} is not allowed to perform this action on viewing request {1}")]
    Forbidden(Uuid, Uuid),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Viewing request {0} was modified concurrently; refetch and retry")]
    Conflict(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        HttpError::new(message, error.status_code())
    }
}

impl From<String> for ServiceError {
    fn from(err: String) -> Self {
        ServiceError::Other(err)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::RequestNotFound(_)
            | ServiceError::PropertyNotFound(_)
            | ServiceError::BookingNotFound(_)
            | ServiceError::PackageNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Forbidden(_, _) => StatusCode::FORBIDDEN,

            ServiceError::Precondition(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Database(_)
            | ServiceError::Notification(_)
            | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
