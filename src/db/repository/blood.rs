use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{BloodGroup, BloodRequestPriority, BloodRequestStatus, LedgerEntryType};
use crate::models::{Actor, BloodInventory, BloodRequest, LedgerEntry};
use crate::query::QueryPlan;

use super::{now_sql, parse_datetime, parse_opt_datetime, parse_opt_uuid, parse_uuid};

const INVENTORY_COLUMNS: &str =
    "id, blood_group, units_available, minimum_threshold, notes, last_restocked_at, created_at";

const REQUEST_COLUMNS: &str = "id, blood_group, units_requested, status, priority, reason, \
     needed_on, requester_name, requester_email, requester_phone, patient_id, processed_by, \
     processed_at, fulfilled_at, rejection_reason, notes, created_at";

/// A ledger entry about to be appended. The balance must already reflect the
/// change; callers compute it while they still hold the inventory row.
pub struct LedgerDraft<'a> {
    pub change: i64,
    pub balance_after: i64,
    pub entry_type: LedgerEntryType,
    pub note: Option<&'a str>,
    pub reference_id: Option<Uuid>,
    pub actor: &'a Actor,
}

pub fn insert_inventory(
    conn: &Connection,
    group: BloodGroup,
    units: i64,
    threshold: i64,
    notes: Option<&str>,
    last_restocked: bool,
) -> Result<BloodInventory, DatabaseError> {
    let id = Uuid::new_v4();
    let restocked_at = last_restocked.then(now_sql);
    conn.execute(
        "INSERT INTO blood_inventories
         (id, blood_group, units_available, minimum_threshold, notes, last_restocked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id.to_string(), group.as_str(), units, threshold, notes, restocked_at],
    )?;

    get_inventory(conn, &id)?
        .ok_or_else(|| DatabaseError::not_found("BloodInventory", id.to_string()))
}

pub fn get_inventory(conn: &Connection, id: &Uuid) -> Result<Option<BloodInventory>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {INVENTORY_COLUMNS} FROM blood_inventories WHERE id = ?1"),
            params![id.to_string()],
            inventory_row,
        )
        .optional()?;
    row.map(tuple_to_inventory).transpose()
}

pub fn get_inventory_by_group(
    conn: &Connection,
    group: BloodGroup,
) -> Result<Option<BloodInventory>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {INVENTORY_COLUMNS} FROM blood_inventories WHERE blood_group = ?1"),
            params![group.as_str()],
            inventory_row,
        )
        .optional()?;
    row.map(tuple_to_inventory).transpose()
}

pub fn list_inventories(conn: &Connection) -> Result<Vec<BloodInventory>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVENTORY_COLUMNS} FROM blood_inventories ORDER BY blood_group ASC"
    ))?;
    let rows = stmt.query_map([], inventory_row)?;

    let mut inventories = Vec::new();
    for row in rows {
        inventories.push(tuple_to_inventory(row?)?);
    }
    Ok(inventories)
}

/// Persist a new balance (and optional threshold/notes), stamping
/// `last_restocked_at` when the change was positive.
pub fn update_inventory_row(
    conn: &Connection,
    id: &Uuid,
    units_available: i64,
    minimum_threshold: Option<i64>,
    notes: Option<&str>,
    restocked: bool,
) -> Result<(), DatabaseError> {
    let restocked_at = restocked.then(now_sql);
    let changed = conn.execute(
        "UPDATE blood_inventories
         SET units_available = ?2,
             minimum_threshold = COALESCE(?3, minimum_threshold),
             notes = COALESCE(?4, notes),
             last_restocked_at = COALESCE(?5, last_restocked_at),
             updated_at = ?6
         WHERE id = ?1",
        params![id.to_string(), units_available, minimum_threshold, notes, restocked_at, now_sql()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("BloodInventory", id.to_string()));
    }
    Ok(())
}

pub fn delete_inventory(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM blood_inventories WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("BloodInventory", id.to_string()));
    }
    Ok(())
}

pub fn append_ledger(
    conn: &Connection,
    inventory_id: &Uuid,
    draft: &LedgerDraft<'_>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO blood_ledger
         (id, inventory_id, change, balance_after, entry_type, note, reference_id,
          actor_id, actor_name, actor_role)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            Uuid::new_v4().to_string(),
            inventory_id.to_string(),
            draft.change,
            draft.balance_after,
            draft.entry_type.as_str(),
            draft.note,
            draft.reference_id.map(|id| id.to_string()),
            draft.actor.actor_id.map(|id| id.to_string()),
            draft.actor.actor_name,
            draft.actor.actor_role,
        ],
    )?;
    Ok(())
}

/// Full ledger for one inventory row, in append order.
pub fn ledger_for(conn: &Connection, inventory_id: &Uuid) -> Result<Vec<LedgerEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, change, balance_after, entry_type, note, reference_id,
                actor_id, actor_name, actor_role, created_at
         FROM blood_ledger WHERE inventory_id = ?1 ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![inventory_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, String>(9)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, change, balance_after, entry_type, note, reference_id, actor_id, actor_name, actor_role, created_at) =
            row?;
        entries.push(LedgerEntry {
            id: parse_uuid(&id)?,
            change,
            balance_after,
            entry_type: LedgerEntryType::from_str(&entry_type)?,
            note,
            reference_id: parse_opt_uuid(reference_id),
            actor_id: parse_opt_uuid(actor_id),
            actor_name,
            actor_role,
            created_at: parse_datetime(&created_at)?,
        });
    }
    Ok(entries)
}

/// Running sum of all ledger changes for one inventory row. Reconciliation
/// helper: must always equal `units_available`.
pub fn ledger_sum(conn: &Connection, inventory_id: &Uuid) -> Result<i64, DatabaseError> {
    let sum: i64 = conn.query_row(
        "SELECT COALESCE(SUM(change), 0) FROM blood_ledger WHERE inventory_id = ?1",
        params![inventory_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(sum)
}

pub struct NewRequestRow<'a> {
    pub blood_group: BloodGroup,
    pub units_requested: i64,
    pub priority: BloodRequestPriority,
    pub reason: Option<&'a str>,
    pub needed_on: Option<&'a str>,
    pub requester_name: &'a str,
    pub requester_email: Option<&'a str>,
    pub requester_phone: Option<&'a str>,
    pub patient_id: Option<Uuid>,
}

pub fn insert_request(
    conn: &Connection,
    new: &NewRequestRow<'_>,
) -> Result<BloodRequest, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO blood_requests
         (id, blood_group, units_requested, status, priority, reason, needed_on,
          requester_name, requester_email, requester_phone, patient_id)
         VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id.to_string(),
            new.blood_group.as_str(),
            new.units_requested,
            new.priority.as_str(),
            new.reason,
            new.needed_on,
            new.requester_name,
            new.requester_email,
            new.requester_phone,
            new.patient_id.map(|p| p.to_string()),
        ],
    )?;

    get_request(conn, &id)?.ok_or_else(|| DatabaseError::not_found("BloodRequest", id.to_string()))
}

pub fn get_request(conn: &Connection, id: &Uuid) -> Result<Option<BloodRequest>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = ?1"),
            params![id.to_string()],
            request_row,
        )
        .optional()?;
    row.map(tuple_to_request).transpose()
}

pub fn list_requests(conn: &Connection, plan: &QueryPlan) -> Result<Vec<BloodRequest>, DatabaseError> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM blood_requests {}", plan.suffix());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(plan.binds()), request_row)?;

    let mut requests = Vec::new();
    for row in rows {
        requests.push(tuple_to_request(row?)?);
    }
    Ok(requests)
}

pub fn count_requests(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM blood_requests", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Persist a request's status transition and processing metadata.
pub fn update_request_row(
    conn: &Connection,
    id: &Uuid,
    status: BloodRequestStatus,
    processed_by: Option<Uuid>,
    notes: Option<&str>,
    rejection_reason: Option<&str>,
    fulfilled: bool,
) -> Result<(), DatabaseError> {
    let now = now_sql();
    let fulfilled_at = fulfilled.then(|| now.clone());
    let changed = conn.execute(
        "UPDATE blood_requests
         SET status = ?2, processed_by = ?3, processed_at = ?4,
             notes = COALESCE(?5, notes), rejection_reason = ?6,
             fulfilled_at = COALESCE(?7, fulfilled_at), updated_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            status.as_str(),
            processed_by.map(|p| p.to_string()),
            now,
            notes,
            rejection_reason,
            fulfilled_at,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("BloodRequest", id.to_string()));
    }
    Ok(())
}

type InventoryRow = (String, String, i64, i64, Option<String>, Option<String>, String);

fn inventory_row(row: &rusqlite::Row<'_>) -> Result<InventoryRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn tuple_to_inventory(row: InventoryRow) -> Result<BloodInventory, DatabaseError> {
    let (id, group, units, threshold, notes, restocked_at, created_at) = row;
    Ok(BloodInventory {
        id: parse_uuid(&id)?,
        blood_group: BloodGroup::from_str(&group)?,
        units_available: units,
        minimum_threshold: threshold,
        notes,
        last_restocked_at: parse_opt_datetime(restocked_at),
        created_at: parse_datetime(&created_at)?,
    })
}

type RequestRow = (
    String,
    String,
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn request_row(row: &rusqlite::Row<'_>) -> Result<RequestRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
        row.get(15)?,
        row.get(16)?,
    ))
}

fn tuple_to_request(row: RequestRow) -> Result<BloodRequest, DatabaseError> {
    let (
        id,
        group,
        units,
        status,
        priority,
        reason,
        needed_on,
        requester_name,
        requester_email,
        requester_phone,
        patient_id,
        processed_by,
        processed_at,
        fulfilled_at,
        rejection_reason,
        notes,
        created_at,
    ) = row;
    Ok(BloodRequest {
        id: parse_uuid(&id)?,
        blood_group: BloodGroup::from_str(&group)?,
        units_requested: units,
        status: BloodRequestStatus::from_str(&status)?,
        priority: BloodRequestPriority::from_str(&priority)?,
        reason,
        needed_on: parse_opt_datetime(needed_on),
        requester_name,
        requester_email,
        requester_phone,
        patient_id: parse_opt_uuid(patient_id),
        processed_by: parse_opt_uuid(processed_by),
        processed_at: parse_opt_datetime(processed_at),
        fulfilled_at: parse_opt_datetime(fulfilled_at),
        rejection_reason,
        notes,
        created_at: parse_datetime(&created_at)?,
    })
}
