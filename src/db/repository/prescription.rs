use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{MedicationLine, Prescription};

use super::{parse_datetime, parse_uuid};

const COLUMNS: &str =
    "id, appointment_id, patient_id, doctor_id, diagnosis, medications, advice, created_at";

pub struct NewPrescriptionRow<'a> {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: Option<&'a str>,
    pub medications: &'a [MedicationLine],
    pub advice: Option<&'a str>,
}

pub fn insert_prescription(
    conn: &Connection,
    new: &NewPrescriptionRow<'_>,
) -> Result<Prescription, DatabaseError> {
    let id = Uuid::new_v4();
    let medications = serde_json::to_string(new.medications)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO prescriptions
         (id, appointment_id, patient_id, doctor_id, diagnosis, medications, advice)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            new.appointment_id.to_string(),
            new.patient_id.to_string(),
            new.doctor_id.to_string(),
            new.diagnosis,
            medications,
            new.advice,
        ],
    )?;

    get_prescription(conn, &id)?
        .ok_or_else(|| DatabaseError::not_found("Prescription", id.to_string()))
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM prescriptions WHERE id = ?1"),
            params![id.to_string()],
            row_to_tuple,
        )
        .optional()?;
    row.map(tuple_to_prescription).transpose()
}

pub fn for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM prescriptions WHERE appointment_id = ?1"),
            params![appointment_id.to_string()],
            row_to_tuple,
        )
        .optional()?;
    row.map(tuple_to_prescription).transpose()
}

pub fn for_doctor(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Prescription>, DatabaseError> {
    query_many(
        conn,
        &format!("SELECT {COLUMNS} FROM prescriptions WHERE doctor_id = ?1 ORDER BY created_at DESC"),
        doctor_id,
    )
}

pub fn for_patient(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Prescription>, DatabaseError> {
    query_many(
        conn,
        &format!("SELECT {COLUMNS} FROM prescriptions WHERE patient_id = ?1 ORDER BY created_at DESC"),
        patient_id,
    )
}

fn query_many(conn: &Connection, sql: &str, id: &Uuid) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![id.to_string()], row_to_tuple)?;

    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(tuple_to_prescription(row?)?);
    }
    Ok(prescriptions)
}

type PrescriptionRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    String,
);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn tuple_to_prescription(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    let (id, appointment_id, patient_id, doctor_id, diagnosis, medications, advice, created_at) = row;
    let medications: Vec<MedicationLine> = serde_json::from_str(&medications)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    Ok(Prescription {
        id: parse_uuid(&id)?,
        appointment_id: parse_uuid(&appointment_id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        diagnosis,
        medications,
        advice,
        created_at: parse_datetime(&created_at)?,
    })
}
