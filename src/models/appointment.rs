use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::enums::AppointmentStatus;
use super::patient::PatientSummary;
use super::prescription::PrescriptionSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Normalized zero-padded `HH:MM`.
    pub appointment_time: String,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Appointment with doctor and patient detail attached, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
    pub patient: Option<PatientSummary>,
}

/// One row of the doctor-scoped schedule, enriched with the linked
/// prescription when one exists for the appointment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorScheduleEntry {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Option<PatientSummary>,
    pub prescription: Option<PrescriptionSummary>,
}

/// Per-status totals for a doctor's appointment book.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStatusCounts {
    pub scheduled: u32,
    pub completed: u32,
    pub cancelled: u32,
}

/// Doctor-scoped view: upcoming vs history plus aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSchedule {
    pub upcoming: Vec<DoctorScheduleEntry>,
    pub history: Vec<DoctorScheduleEntry>,
    pub counts: AppointmentStatusCounts,
    pub next_appointment: Option<DoctorScheduleEntry>,
}
