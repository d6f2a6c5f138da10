use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::{ApiContext, AuthContext};
use crate::models::enums::UserRole;
use crate::models::{NewPrescription, Prescription};
use crate::prescriptions::{self, Requester};

use super::ensure_doctor;

/// `POST /api/prescriptions` — doctor writes a prescription against one of
/// their own appointments.
pub async fn create(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<NewPrescription>,
) -> Result<ApiResponse<Prescription>, ApiError> {
    ensure_doctor(&auth)?;
    let conn = ctx.state.open_db()?;
    let prescription = prescriptions::create_prescription(&conn, &auth.user_id, &payload)?;
    Ok(ApiResponse::created("Prescription created successfully", prescription))
}

/// `GET /api/prescriptions/:id` — prescribing doctor, the patient, or admin.
pub async fn detail(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<Prescription>, ApiError> {
    let conn = ctx.state.open_db()?;
    let prescription = prescriptions::get_prescription(
        &conn,
        &id,
        Requester { user_id: auth.user_id, role: auth.role },
    )?;
    Ok(ApiResponse::ok("Prescription retrieved successfully", prescription))
}

/// `GET /api/prescriptions/doctor/:doctorId`
pub async fn for_doctor(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(doctor_id): Path<String>,
) -> Result<ApiResponse<Vec<Prescription>>, ApiError> {
    let allowed = match auth.role {
        UserRole::Admin => true,
        UserRole::Doctor => doctor_id == auth.user_id.to_string(),
        UserRole::Patient => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "You can only view your own prescriptions".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let list = prescriptions::prescriptions_for_doctor(&conn, &doctor_id)?;
    Ok(ApiResponse::ok("Prescriptions retrieved successfully", list))
}

/// `GET /api/prescriptions/patient/:patientId`
pub async fn for_patient(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<ApiResponse<Vec<Prescription>>, ApiError> {
    let allowed = match auth.role {
        UserRole::Admin | UserRole::Doctor => true,
        UserRole::Patient => patient_id == auth.user_id.to_string(),
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "You can only view your own prescriptions".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let list = prescriptions::prescriptions_for_patient(&conn, &patient_id)?;
    Ok(ApiResponse::ok("Prescriptions retrieved successfully", list))
}
