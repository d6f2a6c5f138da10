//! Appointment endpoints: checkout staging plus the lifecycle transitions.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::{ApiContext, AuthContext};
use crate::models::enums::UserRole;
use crate::models::{AppointmentView, DoctorSchedule};
use crate::payments::{self, CheckoutPayload};
use crate::scheduling;

use super::ensure_doctor;

/// `POST /api/appointments/checkout` — validate + stage a booking and return
/// the payment session id. The appointment itself is created on confirmation.
pub async fn checkout(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<CheckoutPayload>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    if auth.role == UserRole::Patient && payload.patient != auth.user_id.to_string() {
        return Err(ApiError::Forbidden(
            "You can only book appointments for yourself".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let session_id = payments::stage_checkout(&conn, &ctx.state.payments, &payload).await?;

    Ok(ApiResponse::ok(
        "Checkout session created successfully",
        json!({ "sessionId": session_id }),
    ))
}

/// `GET /api/appointments/patient/:patientId` — a patient's appointments.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<ApiResponse<Vec<AppointmentView>>, ApiError> {
    if auth.role == UserRole::Patient && patient_id != auth.user_id.to_string() {
        return Err(ApiError::Forbidden(
            "You can only view your own appointments".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let appointments = scheduling::appointments_for_patient(&conn, &patient_id)?;
    Ok(ApiResponse::ok("Appointments retrieved successfully", appointments))
}

/// `GET /api/appointments/doctor/:doctorId` — upcoming/history view with
/// per-status counts, restricted to the doctor themselves and admins.
pub async fn by_doctor(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(doctor_id): Path<String>,
) -> Result<ApiResponse<DoctorSchedule>, ApiError> {
    let allowed = match auth.role {
        UserRole::Admin => true,
        UserRole::Doctor => doctor_id == auth.user_id.to_string(),
        UserRole::Patient => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "You can only view your own schedule".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let schedule = scheduling::doctor_schedule(&conn, &doctor_id)?;
    Ok(ApiResponse::ok("Doctor schedule retrieved successfully", schedule))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReschedulePayload {
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: Option<String>,
}

/// `PATCH /api/appointments/:id/reschedule`
pub async fn reschedule(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<ApiResponse<AppointmentView>, ApiError> {
    let conn = ctx.state.open_db()?;
    let view = scheduling::reschedule_appointment(
        &conn,
        &id,
        &payload.appointment_date,
        &payload.appointment_time,
        payload.reason.as_deref(),
        auth.patient_scope().as_deref(),
    )?;
    Ok(ApiResponse::ok("Appointment rescheduled successfully", view))
}

/// `PATCH /api/appointments/:id/cancel` — idempotent.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<AppointmentView>, ApiError> {
    let conn = ctx.state.open_db()?;
    let view = scheduling::cancel_appointment(&conn, &id, auth.patient_scope().as_deref())?;
    Ok(ApiResponse::ok("Appointment cancelled successfully", view))
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletePayload {
    pub notes: Option<String>,
}

/// `PATCH /api/appointments/:id/complete` — doctor marks their own
/// appointment as completed, optionally attaching notes.
pub async fn complete(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: Option<Json<CompletePayload>>,
) -> Result<ApiResponse<AppointmentView>, ApiError> {
    ensure_doctor(&auth)?;

    let notes = payload.and_then(|Json(p)| p.notes);
    let conn = ctx.state.open_db()?;
    let view = scheduling::complete_appointment(&conn, &id, &auth.user_id, notes.as_deref())?;
    Ok(ApiResponse::ok("Appointment completed successfully", view))
}
