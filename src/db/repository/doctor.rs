use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Availability, Doctor, NewDoctor};
use crate::query::QueryPlan;

use super::{parse_datetime, parse_uuid};

const COLUMNS: &str =
    "id, name, email, phone, department, specialization, consultation_fee, image, availability, created_at";

pub fn insert_doctor(conn: &Connection, new: &NewDoctor) -> Result<Doctor, DatabaseError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM doctors WHERE email = ?1",
            params![new.email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "A doctor already exists with email {}",
            new.email
        )));
    }

    let id = Uuid::new_v4();
    let availability = new
        .availability
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        "INSERT INTO doctors (id, name, email, phone, department, specialization,
         consultation_fee, image, availability)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            new.name,
            new.email,
            new.phone,
            new.department,
            new.specialization,
            new.consultation_fee,
            new.image,
            availability,
        ],
    )?;

    get_doctor(conn, &id)?.ok_or_else(|| DatabaseError::not_found("Doctor", id.to_string()))
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM doctors WHERE id = ?1"),
            params![id.to_string()],
            row_to_tuple,
        )
        .optional()?;

    row.map(tuple_to_doctor).transpose()
}

pub fn list_doctors(conn: &Connection, plan: &QueryPlan) -> Result<Vec<Doctor>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM doctors {}", plan.suffix());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(plan.binds()), row_to_tuple)?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(tuple_to_doctor(row?)?);
    }
    Ok(doctors)
}

pub fn count_doctors(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count as u64)
}

type DoctorRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    Option<String>,
    Option<String>,
    String,
);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> Result<DoctorRow, rusqlite::Error> {
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
    ))
}

fn tuple_to_doctor(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    let (id, name, email, phone, department, specialization, fee, image, availability, created_at) =
        row;
    let availability: Option<Availability> = availability
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    Ok(Doctor {
        id: parse_uuid(&id)?,
        name,
        email,
        phone,
        department,
        specialization,
        consultation_fee: fee,
        image,
        availability,
        created_at: parse_datetime(&created_at)?,
    })
}
