use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodGroup, BloodRequestPriority, BloodRequestStatus, LedgerEntryType};

/// One signed stock change. `balance_after` is the post-change balance, so the
/// ledger is a verifiable running total independent of the inventory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub change: i64,
    pub balance_after: i64,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub note: Option<String>,
    pub reference_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub actor_role: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodInventory {
    pub id: Uuid,
    pub blood_group: BloodGroup,
    pub units_available: i64,
    pub minimum_threshold: i64,
    pub notes: Option<String>,
    pub last_restocked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Inventory row with its full ledger, as returned by the history endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHistory {
    pub blood_group: BloodGroup,
    pub units_available: i64,
    pub history: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: Uuid,
    pub blood_group: BloodGroup,
    pub units_requested: i64,
    pub status: BloodRequestStatus,
    pub priority: BloodRequestPriority,
    pub reason: Option<String>,
    pub needed_on: Option<NaiveDateTime>,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub patient_id: Option<Uuid>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<NaiveDateTime>,
    pub fulfilled_at: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Identity stamped onto ledger entries and processed requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub actor_role: Option<String>,
}
