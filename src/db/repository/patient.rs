use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{NewPatient, Patient};
use crate::query::QueryPlan;

use super::{parse_datetime, parse_uuid};

const COLUMNS: &str = "id, name, email, phone, blood_group, created_at";

pub fn insert_patient(conn: &Connection, new: &NewPatient) -> Result<Patient, DatabaseError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM patients WHERE email = ?1",
            params![new.email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "A patient already exists with email {}",
            new.email
        )));
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO patients (id, name, email, phone, blood_group)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id.to_string(), new.name, new.email, new.phone, new.blood_group],
    )?;

    get_patient(conn, &id)?.ok_or_else(|| DatabaseError::not_found("Patient", id.to_string()))
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            row_to_tuple,
        )
        .optional()?;

    row.map(tuple_to_patient).transpose()
}

pub fn list_patients(conn: &Connection, plan: &QueryPlan) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM patients {}", plan.suffix());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(plan.binds()), row_to_tuple)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(tuple_to_patient(row?)?);
    }
    Ok(patients)
}

pub fn count_patients(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count as u64)
}

type PatientRow = (String, String, String, Option<String>, Option<String>, String);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn tuple_to_patient(row: PatientRow) -> Result<Patient, DatabaseError> {
    let (id, name, email, phone, blood_group, created_at) = row;
    Ok(Patient {
        id: parse_uuid(&id)?,
        name,
        email,
        phone,
        blood_group,
        created_at: parse_datetime(&created_at)?,
    })
}
