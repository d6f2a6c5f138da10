use axum::extract::{Path, State};

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::ApiContext;
use crate::models::AppointmentView;
use crate::payments;

/// `POST /api/payments/confirm/:sessionId` — payment-confirmed callback.
/// Consumes the staged checkout (once) and creates the appointment record.
pub async fn confirm(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<AppointmentView>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let view = payments::confirm_checkout(&mut conn, &session_id)?;
    Ok(ApiResponse::created("Appointment booked successfully", view))
}
