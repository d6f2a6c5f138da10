//! Blood-bank endpoints: inventory ledger management and the request
//! lifecycle. Mutations are admin-gated; submitting a request is public so
//! hospitals and relatives can file one without an account.

use std::collections::BTreeMap;
use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::types::{ApiContext, AuthContext};
use crate::blood_bank::{
    self, AdjustInventoryPayload, CreateBloodRequestPayload, CreateInventoryPayload,
    UpdateInventoryPayload, UpdateRequestStatusPayload, REQUEST_LIST_SPEC,
};
use crate::db::repository::blood as blood_store;
use crate::models::{BloodInventory, BloodRequest, InventoryHistory};
use crate::query::ListQuery;

use super::ensure_admin;

/// `GET /api/blood-bank/inventories`
pub async fn list_inventories(
    State(ctx): State<ApiContext>,
) -> Result<ApiResponse<Vec<BloodInventory>>, ApiError> {
    let conn = ctx.state.open_db()?;
    let inventories = blood_bank::list_inventories(&conn)?;
    Ok(ApiResponse::ok("Inventories retrieved successfully", inventories))
}

/// `GET /api/blood-bank/summary` — blood group → units available.
pub async fn summary(
    State(ctx): State<ApiContext>,
) -> Result<ApiResponse<BTreeMap<String, i64>>, ApiError> {
    let conn = ctx.state.open_db()?;
    let summary = blood_bank::inventory_summary(&conn)?;
    Ok(ApiResponse::ok("Inventory summary retrieved successfully", summary))
}

/// `POST /api/blood-bank/inventories` — admin only.
pub async fn create_inventory(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<CreateInventoryPayload>,
) -> Result<ApiResponse<BloodInventory>, ApiError> {
    ensure_admin(&auth)?;
    let mut conn = ctx.state.open_db()?;
    let inventory = blood_bank::create_inventory(&mut conn, &payload)?;
    Ok(ApiResponse::created("Inventory created successfully", inventory))
}

/// `PATCH /api/blood-bank/inventories/:id` — admin only.
pub async fn update_inventory(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInventoryPayload>,
) -> Result<ApiResponse<BloodInventory>, ApiError> {
    ensure_admin(&auth)?;
    let mut conn = ctx.state.open_db()?;
    let inventory = blood_bank::update_inventory(&mut conn, &id, &payload)?;
    Ok(ApiResponse::ok("Inventory updated successfully", inventory))
}

/// `DELETE /api/blood-bank/inventories/:id` — admin only.
pub async fn delete_inventory(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    ensure_admin(&auth)?;
    let conn = ctx.state.open_db()?;
    blood_bank::delete_inventory(&conn, &id)?;
    Ok(ApiResponse::ok("Inventory removed successfully", serde_json::Value::Null))
}

/// `POST /api/blood-bank/adjust` — apply a signed delta, admin only.
pub async fn adjust(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<AdjustInventoryPayload>,
) -> Result<ApiResponse<BloodInventory>, ApiError> {
    ensure_admin(&auth)?;
    let mut conn = ctx.state.open_db()?;
    let inventory = blood_bank::adjust_inventory(&mut conn, &stamped(payload, &auth))?;
    Ok(ApiResponse::ok("Inventory adjusted successfully", inventory))
}

/// `POST /api/blood-bank/donations` — donation intake, admin only.
pub async fn record_donation(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Json(payload): Json<AdjustInventoryPayload>,
) -> Result<ApiResponse<BloodInventory>, ApiError> {
    ensure_admin(&auth)?;
    let mut conn = ctx.state.open_db()?;
    let inventory = blood_bank::record_donation(&mut conn, &stamped(payload, &auth))?;
    Ok(ApiResponse::ok("Donation recorded successfully", inventory))
}

/// `POST /api/blood-bank/requests` — public.
pub async fn create_request(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CreateBloodRequestPayload>,
) -> Result<ApiResponse<BloodRequest>, ApiError> {
    let conn = ctx.state.open_db()?;
    let request = blood_bank::create_request(&conn, &payload)?;
    Ok(ApiResponse::created("Blood request submitted successfully", request))
}

/// `GET /api/blood-bank/requests` — admin list via the query helper.
pub async fn list_requests(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse<Vec<serde_json::Value>>, ApiError> {
    ensure_admin(&auth)?;
    let conn = ctx.state.open_db()?;
    let plan = ListQuery::new(params).plan(&REQUEST_LIST_SPEC);

    let rows = blood_store::list_requests(&conn, &plan)?;
    let total = blood_store::count_requests(&conn)?;

    let data = rows
        .into_iter()
        .map(|request| {
            serde_json::to_value(request)
                .map(|row| plan.project(row))
                .map_err(|e| ApiError::Internal(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::ok("Blood requests retrieved successfully", data).with_meta(plan.meta(total)))
}

/// `PATCH /api/blood-bank/requests/:id/status` — approve/reject/fulfill/
/// cancel, admin only.
pub async fn update_request_status(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRequestStatusPayload>,
) -> Result<ApiResponse<BloodRequest>, ApiError> {
    ensure_admin(&auth)?;
    let mut conn = ctx.state.open_db()?;

    let mut payload = payload;
    if payload.actor.actor_id.is_none() {
        payload.actor.actor_id = Some(auth.user_id);
        payload.actor.actor_role = Some(auth.role.as_str().to_string());
    }

    let request = blood_bank::update_request_status(&mut conn, &id, &payload)?;
    Ok(ApiResponse::ok("Blood request updated successfully", request))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub blood_group: Option<String>,
}

/// `GET /api/blood-bank/history` — full ledger, optionally one group.
pub async fn history(
    State(ctx): State<ApiContext>,
    auth: AuthContext,
    Query(query): Query<HistoryQuery>,
) -> Result<ApiResponse<Vec<InventoryHistory>>, ApiError> {
    ensure_admin(&auth)?;
    let conn = ctx.state.open_db()?;
    let histories = blood_bank::inventory_history(&conn, query.blood_group.as_deref())?;
    Ok(ApiResponse::ok("Inventory history retrieved successfully", histories))
}

/// Stamp the acting admin onto a ledger payload when the client did not name
/// an actor explicitly.
fn stamped(mut payload: AdjustInventoryPayload, auth: &AuthContext) -> AdjustInventoryPayload {
    if payload.actor.actor_id.is_none() {
        payload.actor.actor_id = Some(auth.user_id);
        payload.actor.actor_role = Some(auth.role.as_str().to_string());
    }
    payload
}
