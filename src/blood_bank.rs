//! Blood-bank core: per-group stock kept as an append-only ledger of signed
//! changes, plus the blood-request state machine that draws on that stock.
//!
//! Every mutation path writes the new balance and its matching ledger entry
//! inside one transaction, so `units_available` always equals the running sum
//! of `blood_ledger.change` and a balance can never go negative.

use std::collections::BTreeMap;
use std::str::FromStr;

use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::blood::{self, LedgerDraft, NewRequestRow};
use crate::db::DatabaseError;
use crate::models::enums::{BloodGroup, BloodRequestPriority, BloodRequestStatus, LedgerEntryType};
use crate::models::{Actor, BloodInventory, BloodRequest, InventoryHistory};
use crate::query::CollectionSpec;

pub const REQUEST_LIST_SPEC: CollectionSpec = CollectionSpec {
    searchable: &["requester_name", "requester_email"],
    filterable: &["status", "blood_group", "priority", "requester_email", "requester_phone"],
    sortable: &["created_at", "priority", "status", "units_requested"],
    default_limit: 10,
};

#[derive(Debug, Error)]
pub enum BloodBankError {
    #[error("Blood group is required")]
    MissingBloodGroup,
    #[error("Invalid blood group provided")]
    InvalidBloodGroup,
    #[error("Inventory already exists for {0}")]
    DuplicateInventory(&'static str),
    #[error("Invalid inventory id supplied")]
    InvalidInventoryId,
    #[error("Inventory record not found")]
    InventoryNotFound,
    #[error("Either inventoryId or bloodGroup must be provided")]
    MissingTarget,
    #[error("Adjustment amount must be a non-zero number")]
    ZeroAdjustment,
    #[error("Adjustment would result in negative stock")]
    NegativeStock,
    #[error("Units requested must be at least 1")]
    InvalidUnits,
    #[error("Invalid request id supplied")]
    InvalidRequestId,
    #[error("Blood request not found")]
    RequestNotFound,
    #[error("Only pending or approved requests can be fulfilled")]
    NotFulfillable,
    #[error("Approved requests cannot be changed")]
    ApprovedFrozen,
    #[error("No inventory found for {0}")]
    NoInventoryForGroup(&'static str),
    #[error("Insufficient stock for {group}. Available: {available}")]
    InsufficientStock { group: &'static str, available: i64 },
    #[error("Unsupported status update")]
    UnsupportedStatus,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

fn normalize_blood_group(raw: Option<&str>) -> Result<BloodGroup, BloodBankError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(BloodBankError::MissingBloodGroup);
    };
    BloodGroup::from_str(&raw.to_uppercase()).map_err(|_| BloodBankError::InvalidBloodGroup)
}

// ─── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryPayload {
    pub blood_group: Option<String>,
    pub units_available: Option<i64>,
    pub minimum_threshold: Option<i64>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryPayload {
    /// Relative delta; wins over `units_available` when both are present.
    pub adjust_by: Option<i64>,
    /// Absolute target balance.
    pub units_available: Option<i64>,
    pub minimum_threshold: Option<i64>,
    pub notes: Option<String>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<LedgerEntryType>,
    #[serde(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustInventoryPayload {
    pub inventory_id: Option<String>,
    pub blood_group: Option<String>,
    pub adjust_by: Option<i64>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<LedgerEntryType>,
    #[serde(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequestPayload {
    pub blood_group: Option<String>,
    pub units_requested: Option<i64>,
    pub priority: Option<BloodRequestPriority>,
    pub reason: Option<String>,
    pub needed_on: Option<String>,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatusPayload {
    pub status: String,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    #[serde(flatten)]
    pub actor: Actor,
}

// ─── Inventory operations ─────────────────────────────────────────────────────

/// Create the inventory row for a blood group. Duplicate creation for an
/// existing group is rejected; a positive opening balance seeds the ledger
/// with a single restock entry.
pub fn create_inventory(
    conn: &mut Connection,
    payload: &CreateInventoryPayload,
) -> Result<BloodInventory, BloodBankError> {
    let group = normalize_blood_group(payload.blood_group.as_deref())?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    if blood::get_inventory_by_group(&tx, group)?.is_some() {
        return Err(BloodBankError::DuplicateInventory(group.as_str()));
    }

    let units = payload.units_available.unwrap_or(0).max(0);
    let threshold = payload.minimum_threshold.unwrap_or(0).max(0);
    let inventory = blood::insert_inventory(
        &tx,
        group,
        units,
        threshold,
        payload.notes.as_deref(),
        units > 0,
    )?;

    if units > 0 {
        blood::append_ledger(
            &tx,
            &inventory.id,
            &LedgerDraft {
                change: units,
                balance_after: units,
                entry_type: LedgerEntryType::Restock,
                note: payload.notes.as_deref().or(Some("Initial stock")),
                reference_id: None,
                actor: &payload.actor,
            },
        )?;
    }

    tx.commit().map_err(DatabaseError::from)?;
    Ok(inventory)
}

pub fn list_inventories(conn: &Connection) -> Result<Vec<BloodInventory>, BloodBankError> {
    Ok(blood::list_inventories(conn)?)
}

/// Blood group → units available, for the dashboard tiles.
pub fn inventory_summary(conn: &Connection) -> Result<BTreeMap<String, i64>, BloodBankError> {
    let mut summary = BTreeMap::new();
    for inventory in blood::list_inventories(conn)? {
        summary.insert(inventory.blood_group.as_str().to_string(), inventory.units_available);
    }
    Ok(summary)
}

/// Apply a relative delta or an absolute target to one inventory row. Every
/// non-zero change lands in the ledger; a positive change refreshes the
/// last-restocked timestamp.
pub fn update_inventory(
    conn: &mut Connection,
    inventory_id: &str,
    payload: &UpdateInventoryPayload,
) -> Result<BloodInventory, BloodBankError> {
    let id = Uuid::parse_str(inventory_id).map_err(|_| BloodBankError::InvalidInventoryId)?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let inventory = blood::get_inventory(&tx, &id)?.ok_or(BloodBankError::InventoryNotFound)?;

    let (change, next_units) = if let Some(delta) = payload.adjust_by {
        let next = inventory.units_available + delta;
        if next < 0 {
            return Err(BloodBankError::NegativeStock);
        }
        (delta, next)
    } else if let Some(target) = payload.units_available {
        let target = target.max(0);
        (target - inventory.units_available, target)
    } else {
        (0, inventory.units_available)
    };

    blood::update_inventory_row(
        &tx,
        &id,
        next_units,
        payload.minimum_threshold.map(|t| t.max(0)),
        payload.notes.as_deref(),
        change > 0,
    )?;

    if change != 0 {
        let entry_type = payload.entry_type.unwrap_or(if change > 0 {
            LedgerEntryType::Restock
        } else {
            LedgerEntryType::Adjustment
        });
        blood::append_ledger(
            &tx,
            &id,
            &LedgerDraft {
                change,
                balance_after: next_units,
                entry_type,
                note: payload.note.as_deref().or(payload.notes.as_deref()),
                reference_id: None,
                actor: &payload.actor,
            },
        )?;
    }

    let updated = blood::get_inventory(&tx, &id)?.ok_or(BloodBankError::InventoryNotFound)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(updated)
}

/// Apply a signed delta, resolving the target row by id or blood group. A
/// known group with no inventory row yet gets a zero-stock row on the fly.
pub fn adjust_inventory(
    conn: &mut Connection,
    payload: &AdjustInventoryPayload,
) -> Result<BloodInventory, BloodBankError> {
    if payload.inventory_id.is_none() && payload.blood_group.is_none() {
        return Err(BloodBankError::MissingTarget);
    }
    let delta = match payload.adjust_by {
        Some(delta) if delta != 0 => delta,
        _ => return Err(BloodBankError::ZeroAdjustment),
    };

    let tx = conn.transaction().map_err(DatabaseError::from)?;

    let inventory = if let Some(raw_id) = &payload.inventory_id {
        let id = Uuid::parse_str(raw_id).map_err(|_| BloodBankError::InvalidInventoryId)?;
        blood::get_inventory(&tx, &id)?.ok_or(BloodBankError::InventoryNotFound)?
    } else {
        let group = normalize_blood_group(payload.blood_group.as_deref())?;
        match blood::get_inventory_by_group(&tx, group)? {
            Some(inventory) => inventory,
            None => blood::insert_inventory(&tx, group, 0, 0, None, false)?,
        }
    };

    let next_units = inventory.units_available + delta;
    if next_units < 0 {
        return Err(BloodBankError::NegativeStock);
    }

    blood::update_inventory_row(&tx, &inventory.id, next_units, None, None, delta > 0)?;
    blood::append_ledger(
        &tx,
        &inventory.id,
        &LedgerDraft {
            change: delta,
            balance_after: next_units,
            entry_type: payload.entry_type.unwrap_or(if delta > 0 {
                LedgerEntryType::Restock
            } else {
                LedgerEntryType::Adjustment
            }),
            note: payload.note.as_deref(),
            reference_id: None,
            actor: &payload.actor,
        },
    )?;

    let updated =
        blood::get_inventory(&tx, &inventory.id)?.ok_or(BloodBankError::InventoryNotFound)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(updated)
}

/// Donation intake: an adjustment typed `donation` with a default note.
pub fn record_donation(
    conn: &mut Connection,
    payload: &AdjustInventoryPayload,
) -> Result<BloodInventory, BloodBankError> {
    let mut payload = payload.clone();
    payload.note = payload.note.or_else(|| Some("Donation received".into()));
    payload.entry_type = payload.entry_type.or(Some(LedgerEntryType::Donation));
    adjust_inventory(conn, &payload)
}

pub fn delete_inventory(conn: &Connection, inventory_id: &str) -> Result<(), BloodBankError> {
    let id = Uuid::parse_str(inventory_id).map_err(|_| BloodBankError::InvalidInventoryId)?;
    blood::delete_inventory(conn, &id).map_err(|e| match e {
        DatabaseError::NotFound { .. } => BloodBankError::InventoryNotFound,
        other => BloodBankError::Database(other),
    })
}

/// Full per-group ledger, optionally filtered to one group.
pub fn inventory_history(
    conn: &Connection,
    group: Option<&str>,
) -> Result<Vec<InventoryHistory>, BloodBankError> {
    let inventories = match group {
        Some(raw) => {
            let group = normalize_blood_group(Some(raw))?;
            blood::get_inventory_by_group(conn, group)?.into_iter().collect()
        }
        None => blood::list_inventories(conn)?,
    };

    let mut histories = Vec::new();
    for inventory in inventories {
        histories.push(InventoryHistory {
            blood_group: inventory.blood_group,
            units_available: inventory.units_available,
            history: blood::ledger_for(conn, &inventory.id)?,
        });
    }
    Ok(histories)
}

// ─── Request operations ───────────────────────────────────────────────────────

pub fn create_request(
    conn: &Connection,
    payload: &CreateBloodRequestPayload,
) -> Result<BloodRequest, BloodBankError> {
    let group = normalize_blood_group(payload.blood_group.as_deref())?;
    let units = payload.units_requested.unwrap_or(0);
    if units < 1 {
        return Err(BloodBankError::InvalidUnits);
    }

    Ok(blood::insert_request(
        conn,
        &NewRequestRow {
            blood_group: group,
            units_requested: units,
            priority: payload.priority.unwrap_or(BloodRequestPriority::Medium),
            reason: payload.reason.as_deref(),
            needed_on: payload.needed_on.as_deref(),
            requester_name: &payload.requester_name,
            requester_email: payload.requester_email.as_deref(),
            requester_phone: payload.requester_phone.as_deref(),
            patient_id: payload.patient_id,
        },
    )?)
}

/// Drive the request state machine.
///
/// `approved`/`fulfilled` are reachable only from pending or approved; the
/// inventory deduction fires exactly once, on the pending edge, inside the
/// same transaction that flips the status. `rejected`/`cancelled` are refused
/// once a request is approved. Anything else is an unsupported update.
pub fn update_request_status(
    conn: &mut Connection,
    request_id: &str,
    payload: &UpdateRequestStatusPayload,
) -> Result<BloodRequest, BloodBankError> {
    let id = Uuid::parse_str(request_id).map_err(|_| BloodBankError::InvalidRequestId)?;
    let target = BloodRequestStatus::from_str(&payload.status)
        .map_err(|_| BloodBankError::UnsupportedStatus)?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let request = blood::get_request(&tx, &id)?.ok_or(BloodBankError::RequestNotFound)?;

    match target {
        BloodRequestStatus::Approved | BloodRequestStatus::Fulfilled => {
            if !matches!(
                request.status,
                BloodRequestStatus::Pending | BloodRequestStatus::Approved
            ) {
                return Err(BloodBankError::NotFulfillable);
            }

            // Deduct only when leaving pending, so repeated approve/fulfill
            // transitions cannot drain stock twice.
            if request.status == BloodRequestStatus::Pending {
                let inventory = blood::get_inventory_by_group(&tx, request.blood_group)?
                    .ok_or(BloodBankError::NoInventoryForGroup(request.blood_group.as_str()))?;

                if inventory.units_available < request.units_requested {
                    return Err(BloodBankError::InsufficientStock {
                        group: request.blood_group.as_str(),
                        available: inventory.units_available,
                    });
                }

                let next_units = inventory.units_available - request.units_requested;
                blood::update_inventory_row(&tx, &inventory.id, next_units, None, None, false)?;

                let default_note = format!(
                    "Released for {} ({} units)",
                    request.requester_name, request.units_requested
                );
                blood::append_ledger(
                    &tx,
                    &inventory.id,
                    &LedgerDraft {
                        change: -request.units_requested,
                        balance_after: next_units,
                        entry_type: LedgerEntryType::RequestFulfillment,
                        note: Some(payload.notes.as_deref().unwrap_or(&default_note)),
                        reference_id: Some(request.id),
                        actor: &payload.actor,
                    },
                )?;
            }

            blood::update_request_row(
                &tx,
                &id,
                target,
                payload.actor.actor_id,
                payload.notes.as_deref(),
                None,
                target == BloodRequestStatus::Fulfilled,
            )?;
        }
        BloodRequestStatus::Rejected | BloodRequestStatus::Cancelled => {
            if request.status == BloodRequestStatus::Approved {
                return Err(BloodBankError::ApprovedFrozen);
            }
            blood::update_request_row(
                &tx,
                &id,
                target,
                payload.actor.actor_id,
                payload.notes.as_deref(),
                payload.rejection_reason.as_deref().or(payload.notes.as_deref()),
                false,
            )?;
        }
        BloodRequestStatus::Pending => return Err(BloodBankError::UnsupportedStatus),
    }

    let updated = blood::get_request(&tx, &id)?.ok_or(BloodBankError::RequestNotFound)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(updated)
}
