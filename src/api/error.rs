//! HTTP error boundary: every domain error funnels through `ApiError`, which
//! renders the uniform `{success:false, message}` envelope. Internal errors
//! are logged and never leak details to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::blood_bank::BloodBankError;
use crate::db::DatabaseError;
use crate::payments::PaymentError;
use crate::prescriptions::PrescriptionError;
use crate::scheduling::SchedulingError;
use crate::state::StateError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("You are not authorized!")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::Gateway(msg) => {
                tracing::warn!(detail = %msg, "payment gateway failure");
                (StatusCode::BAD_GATEWAY, "Payment gateway error".to_string())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody { success: false, message };
        (status, Json(body)).into_response()
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        use SchedulingError::*;
        match err {
            InvalidTime | OutsideBookingWindow | InvalidDate | InvalidPatientId
            | InvalidDoctorId | InvalidAppointmentId => ApiError::BadRequest(err.to_string()),
            DoctorNotFound | AppointmentNotFound => ApiError::NotFound(err.to_string()),
            SlotTaken => ApiError::Conflict(err.to_string()),
            NotOwner => ApiError::Forbidden(err.to_string()),
            RescheduleCancelled | CompleteCancelled => ApiError::Unprocessable(err.to_string()),
            Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<BloodBankError> for ApiError {
    fn from(err: BloodBankError) -> Self {
        use BloodBankError::*;
        match err {
            MissingBloodGroup | InvalidBloodGroup | InvalidInventoryId | MissingTarget
            | ZeroAdjustment | InvalidUnits | InvalidRequestId | UnsupportedStatus => {
                ApiError::BadRequest(err.to_string())
            }
            InventoryNotFound | RequestNotFound => ApiError::NotFound(err.to_string()),
            DuplicateInventory(_) => ApiError::Conflict(err.to_string()),
            NegativeStock | InsufficientStock { .. } | NotFulfillable | ApprovedFrozen
            | NoInventoryForGroup(_) => ApiError::Unprocessable(err.to_string()),
            Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Gateway(detail) => ApiError::Gateway(detail),
            PaymentError::SessionNotFound => ApiError::NotFound(err.to_string()),
            PaymentError::Scheduling(e) => e.into(),
            PaymentError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PrescriptionError> for ApiError {
    fn from(err: PrescriptionError) -> Self {
        use PrescriptionError::*;
        match err {
            InvalidId | InvalidAppointmentId | InvalidDoctorId | InvalidPatientId => {
                ApiError::BadRequest(err.to_string())
            }
            AppointmentNotFound | NotFound => ApiError::NotFound(err.to_string()),
            NotAppointmentDoctor | NotAuthorized => ApiError::Forbidden(err.to_string()),
            Duplicate => ApiError::Conflict(err.to_string()),
            Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConstraintViolation(msg) => ApiError::Conflict(msg),
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
