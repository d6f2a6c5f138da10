use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;

use super::{parse_date, parse_uuid};

/// A staged booking awaiting payment confirmation.
#[derive(Debug, Clone)]
pub struct PendingCheckout {
    pub session_id: String,
    pub patient_id: Uuid,
    pub patient_email: Option<String>,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason: Option<String>,
    pub amount_cents: i64,
}

pub fn insert_checkout(conn: &Connection, staged: &PendingCheckout) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pending_checkouts
         (session_id, patient_id, patient_email, doctor_id, appointment_date,
          appointment_time, reason, amount_cents)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            staged.session_id,
            staged.patient_id.to_string(),
            staged.patient_email,
            staged.doctor_id.to_string(),
            staged.appointment_date.to_string(),
            staged.appointment_time,
            staged.reason,
            staged.amount_cents,
        ],
    )?;
    Ok(())
}

/// Remove and return the staged booking for a session, if any. Run inside the
/// confirmation transaction so a session can only ever be consumed once.
pub fn take_checkout(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<PendingCheckout>, DatabaseError> {
    let row: Option<(String, Option<String>, String, String, String, Option<String>, i64)> = conn
        .query_row(
            "SELECT patient_id, patient_email, doctor_id, appointment_date,
                    appointment_time, reason, amount_cents
             FROM pending_checkouts WHERE session_id = ?1",
            params![session_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .optional()?;

    let Some((patient_id, patient_email, doctor_id, date, time, reason, amount_cents)) = row else {
        return Ok(None);
    };

    conn.execute(
        "DELETE FROM pending_checkouts WHERE session_id = ?1",
        params![session_id],
    )?;

    Ok(Some(PendingCheckout {
        session_id: session_id.to_string(),
        patient_id: parse_uuid(&patient_id)?,
        patient_email,
        doctor_id: parse_uuid(&doctor_id)?,
        appointment_date: parse_date(&date)?,
        appointment_time: time,
        reason,
        amount_cents,
    }))
}
