//! Doctor directory endpoints. The list route goes through the generic
//! query helper: search, filters, sort, pagination and projection.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository::doctor as doctors;
use crate::models::{Doctor, NewDoctor};
use crate::query::{CollectionSpec, ListQuery};

use super::ensure_admin;

pub const DOCTOR_LIST_SPEC: CollectionSpec = CollectionSpec {
    searchable: &["name", "department", "specialization", "email"],
    filterable: &["department", "specialization", "name", "email"],
    sortable: &["name", "department", "consultation_fee", "created_at"],
    default_limit: 10,
};

/// `POST /api/doctors` — admin only.
pub async fn create(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<NewDoctor>,
) -> Result<ApiResponse<Doctor>, ApiError> {
    ensure_admin(&auth)?;
    let conn = ctx.state.open_db()?;
    let doctor = doctors::insert_doctor(&conn, &payload)?;
    Ok(ApiResponse::created("Doctor created successfully", doctor))
}

/// `GET /api/doctors` — public directory listing.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse<Vec<serde_json::Value>>, ApiError> {
    let conn = ctx.state.open_db()?;
    let plan = ListQuery::new(params).plan(&DOCTOR_LIST_SPEC);

    let rows = doctors::list_doctors(&conn, &plan)?;
    let total = doctors::count_doctors(&conn)?;

    let data = rows
        .into_iter()
        .map(|doctor| {
            serde_json::to_value(doctor)
                .map(|row| plan.project(row))
                .map_err(|e| ApiError::Internal(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::ok("Doctors retrieved successfully", data).with_meta(plan.meta(total)))
}

/// `GET /api/doctors/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Doctor>, ApiError> {
    let id =
        Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest("Invalid doctor id supplied".into()))?;
    let conn = ctx.state.open_db()?;
    let doctor = doctors::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(ApiResponse::ok("Doctor retrieved successfully", doctor))
}
