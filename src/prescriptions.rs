//! Prescriptions: doctor-only creation, one per appointment, access limited
//! to the prescribing doctor and the patient.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{appointment as appointments, prescription as store};
use crate::db::repository::prescription::NewPrescriptionRow;
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::{NewPrescription, Prescription};

#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error("Invalid prescription id")]
    InvalidId,
    #[error("Valid appointment id is required")]
    InvalidAppointmentId,
    #[error("Invalid doctor id supplied")]
    InvalidDoctorId,
    #[error("Invalid patient id supplied")]
    InvalidPatientId,
    #[error("Appointment not found")]
    AppointmentNotFound,
    #[error("Prescription not found")]
    NotFound,
    #[error("You are not allowed to create a prescription for this appointment")]
    NotAppointmentDoctor,
    #[error("A prescription already exists for this appointment")]
    Duplicate,
    #[error("You are not authorized to access this prescription")]
    NotAuthorized,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Who is asking; decides read access.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Create a prescription for one of the doctor's own appointments. Patient
/// and doctor references are taken from the appointment, not the payload.
pub fn create_prescription(
    conn: &Connection,
    doctor_id: &Uuid,
    payload: &NewPrescription,
) -> Result<Prescription, PrescriptionError> {
    let appointment = appointments::get_appointment(conn, &payload.appointment)?
        .ok_or(PrescriptionError::AppointmentNotFound)?;

    if appointment.doctor_id != *doctor_id {
        return Err(PrescriptionError::NotAppointmentDoctor);
    }

    if store::for_appointment(conn, &appointment.id)?.is_some() {
        return Err(PrescriptionError::Duplicate);
    }

    Ok(store::insert_prescription(
        conn,
        &NewPrescriptionRow {
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            diagnosis: payload.diagnosis.as_deref(),
            medications: &payload.medications,
            advice: payload.advice.as_deref(),
        },
    )?)
}

/// Fetch one prescription; readable by the prescribing doctor, the patient
/// it belongs to, and admins.
pub fn get_prescription(
    conn: &Connection,
    id: &str,
    requester: Requester,
) -> Result<Prescription, PrescriptionError> {
    let id = Uuid::parse_str(id).map_err(|_| PrescriptionError::InvalidId)?;
    let prescription = store::get_prescription(conn, &id)?.ok_or(PrescriptionError::NotFound)?;

    let is_doctor =
        requester.role == UserRole::Doctor && prescription.doctor_id == requester.user_id;
    let is_patient = prescription.patient_id == requester.user_id;
    let is_admin = requester.role == UserRole::Admin;

    if !is_doctor && !is_patient && !is_admin {
        return Err(PrescriptionError::NotAuthorized);
    }

    Ok(prescription)
}

pub fn prescriptions_for_doctor(
    conn: &Connection,
    doctor_id: &str,
) -> Result<Vec<Prescription>, PrescriptionError> {
    let id = Uuid::parse_str(doctor_id).map_err(|_| PrescriptionError::InvalidDoctorId)?;
    Ok(store::for_doctor(conn, &id)?)
}

pub fn prescriptions_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<Prescription>, PrescriptionError> {
    let id = Uuid::parse_str(patient_id).map_err(|_| PrescriptionError::InvalidPatientId)?;
    Ok(store::for_patient(conn, &id)?)
}
