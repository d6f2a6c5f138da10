use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

use super::{now_sql, parse_date, parse_datetime, parse_uuid};

const COLUMNS: &str =
    "id, patient_id, doctor_id, appointment_date, appointment_time, reason, status, notes, created_at";

pub fn insert_appointment(
    conn: &Connection,
    patient_id: &Uuid,
    doctor_id: &Uuid,
    date: NaiveDate,
    time: &str,
    reason: Option<&str>,
) -> Result<Appointment, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, appointment_date,
         appointment_time, reason, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'scheduled')",
        params![
            id.to_string(),
            patient_id.to_string(),
            doctor_id.to_string(),
            date.to_string(),
            time,
            reason,
        ],
    )?;

    get_appointment(conn, &id)?
        .ok_or_else(|| DatabaseError::not_found("Appointment", id.to_string()))
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            row_to_tuple,
        )
        .optional()?;

    row.map(tuple_to_appointment).transpose()
}

/// True when an active appointment already occupies the exact
/// (doctor, date, time) slot. Dates are stored day-granular, so calendar-day
/// equality is plain column equality; times compare as exact normalized
/// strings.
pub fn slot_taken(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
    time: &str,
    exclude: Option<&Uuid>,
) -> Result<bool, DatabaseError> {
    let exclude_id = exclude.map(Uuid::to_string).unwrap_or_default();
    let taken: Option<String> = conn
        .query_row(
            "SELECT id FROM appointments
             WHERE doctor_id = ?1 AND appointment_date = ?2 AND appointment_time = ?3
               AND status IN ('scheduled', 'completed')
               AND id != ?4",
            params![doctor_id.to_string(), date.to_string(), time, exclude_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(taken.is_some())
}

/// Move an appointment to a new slot and reset it to `scheduled`.
pub fn update_slot(
    conn: &Connection,
    id: &Uuid,
    date: NaiveDate,
    time: &str,
    reason: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET appointment_date = ?2, appointment_time = ?3,
             reason = COALESCE(?4, reason), status = 'scheduled', updated_at = ?5
         WHERE id = ?1",
        params![id.to_string(), date.to_string(), time, reason, now_sql()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Appointment", id.to_string()));
    }
    Ok(())
}

pub fn set_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
    notes: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET status = ?2, notes = COALESCE(?3, notes), updated_at = ?4
         WHERE id = ?1",
        params![id.to_string(), status.as_str(), notes, now_sql()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Appointment", id.to_string()));
    }
    Ok(())
}

/// All appointments for a patient, soonest first.
pub fn for_patient(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1
         ORDER BY appointment_date ASC, appointment_time ASC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], row_to_tuple)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(tuple_to_appointment(row?)?);
    }
    Ok(appointments)
}

/// All appointments for a doctor, soonest first. The scheduler partitions
/// these into upcoming/history.
pub fn for_doctor(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE doctor_id = ?1
         ORDER BY appointment_date ASC, appointment_time ASC"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], row_to_tuple)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(tuple_to_appointment(row?)?);
    }
    Ok(appointments)
}

type AppointmentRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    String,
);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
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
    ))
}

fn tuple_to_appointment(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (id, patient_id, doctor_id, date, time, reason, status, notes, created_at) = row;
    Ok(Appointment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        appointment_date: parse_date(&date)?,
        appointment_time: time,
        reason,
        status: AppointmentStatus::from_str(&status)?,
        notes,
        created_at: parse_datetime(&created_at)?,
    })
}
