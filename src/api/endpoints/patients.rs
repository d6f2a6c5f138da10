use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository::patient as patients;
use crate::models::enums::UserRole;
use crate::models::{NewPatient, Patient};
use crate::query::{CollectionSpec, ListQuery};

use super::ensure_admin;

pub const PATIENT_LIST_SPEC: CollectionSpec = CollectionSpec {
    searchable: &["name", "email", "phone"],
    filterable: &["email", "blood_group"],
    sortable: &["name", "created_at"],
    default_limit: 10,
};

/// `POST /api/patients` — open registration.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(payload): Json<NewPatient>,
) -> Result<ApiResponse<Patient>, ApiError> {
    let conn = ctx.state.open_db()?;
    let patient = patients::insert_patient(&conn, &payload)?;
    Ok(ApiResponse::created("Patient registered successfully", patient))
}

/// `GET /api/patients` — admin directory listing via the query helper.
pub async fn list(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse<Vec<serde_json::Value>>, ApiError> {
    ensure_admin(&auth)?;
    let conn = ctx.state.open_db()?;
    let plan = ListQuery::new(params).plan(&PATIENT_LIST_SPEC);

    let rows = patients::list_patients(&conn, &plan)?;
    let total = patients::count_patients(&conn)?;

    let data = rows
        .into_iter()
        .map(|patient| {
            serde_json::to_value(patient)
                .map(|row| plan.project(row))
                .map_err(|e| ApiError::Internal(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::ok("Patients retrieved successfully", data).with_meta(plan.meta(total)))
}

/// `GET /api/patients/:id` — the patient themselves or an admin.
pub async fn detail(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<Patient>, ApiError> {
    if auth.role == UserRole::Patient && id != auth.user_id.to_string() {
        return Err(ApiError::Forbidden("You can only view your own profile".into()));
    }

    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid patient id supplied".into()))?;
    let conn = ctx.state.open_db()?;
    let patient = patients::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(ApiResponse::ok("Patient retrieved successfully", patient))
}
