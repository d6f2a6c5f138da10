//! Appointment scheduling: booking-window validation, slot-conflict
//! detection, and the appointment lifecycle (book, reschedule, cancel,
//! complete).
//!
//! Slots are exact: a (doctor, calendar date, `HH:MM` string) triple holds at
//! most one active appointment. Conflict detection compares normalized time
//! strings, not intervals, so back-to-back bookings one minute apart are both
//! accepted.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{
    appointment as appointments, doctor as doctors, patient as patients,
    prescription as prescriptions,
};
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::{
    Appointment, AppointmentStatusCounts, AppointmentView, Doctor, DoctorSchedule,
    DoctorScheduleEntry,
};

/// Bookable window, inclusive on both ends.
const BOOKING_START_MINUTE: u32 = 8 * 60; // 08:00
const BOOKING_END_MINUTE: u32 = 22 * 60; // 22:00

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Invalid appointment time format")]
    InvalidTime,
    #[error("Appointments can only be booked between 08:00 and 22:00")]
    OutsideBookingWindow,
    #[error("Invalid appointment date")]
    InvalidDate,
    #[error("Invalid patient id supplied")]
    InvalidPatientId,
    #[error("Invalid doctor id supplied")]
    InvalidDoctorId,
    #[error("Invalid appointment id supplied")]
    InvalidAppointmentId,
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Appointment not found")]
    AppointmentNotFound,
    #[error("The selected slot is no longer available")]
    SlotTaken,
    #[error("You are not authorized to update this appointment")]
    NotOwner,
    #[error("Cancelled appointments cannot be rescheduled")]
    RescheduleCancelled,
    #[error("Cancelled appointments cannot be completed")]
    CompleteCancelled,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ─── Time helpers ─────────────────────────────────────────────────────────────

fn time_to_minutes(time: &str) -> Result<u32, SchedulingError> {
    let mut parts = time.split(':');
    let hours: u32 = parts
        .next()
        .and_then(|h| h.trim().parse().ok())
        .ok_or(SchedulingError::InvalidTime)?;
    let minutes: u32 = parts
        .next()
        .and_then(|m| m.trim().parse().ok())
        .ok_or(SchedulingError::InvalidTime)?;

    if hours > 23 || minutes > 59 {
        return Err(SchedulingError::InvalidTime);
    }

    Ok(hours * 60 + minutes)
}

/// Re-format a raw time into zero-padded `HH:MM`.
pub fn normalize_time(time: &str) -> Result<String, SchedulingError> {
    let minutes = time_to_minutes(time)?;
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

fn ensure_within_booking_window(time: &str) -> Result<(), SchedulingError> {
    let total = time_to_minutes(time)?;
    if total < BOOKING_START_MINUTE || total > BOOKING_END_MINUTE {
        return Err(SchedulingError::OutsideBookingWindow);
    }
    Ok(())
}

fn parse_date(date: &str) -> Result<NaiveDate, SchedulingError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| SchedulingError::InvalidDate)
}

fn ensure_slot_available(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
    time: &str,
    exclude: Option<&Uuid>,
) -> Result<(), SchedulingError> {
    if appointments::slot_taken(conn, doctor_id, date, time, exclude)? {
        return Err(SchedulingError::SlotTaken);
    }
    Ok(())
}

// ─── Checkout staging ─────────────────────────────────────────────────────────

/// Validated booking data, staged before payment. No writes happen here; the
/// payment flow persists the stage and calls [`create_appointment_record`]
/// once the session is confirmed.
#[derive(Debug, Clone)]
pub struct CheckoutStaging {
    pub doctor: Doctor,
    pub patient_id: Uuid,
    pub patient_email: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason: Option<String>,
}

pub fn prepare_checkout(
    conn: &Connection,
    patient_id: &str,
    doctor_id: &str,
    date: &str,
    time: &str,
    reason: Option<String>,
    patient_email: Option<String>,
) -> Result<CheckoutStaging, SchedulingError> {
    let patient_id = Uuid::parse_str(patient_id).map_err(|_| SchedulingError::InvalidPatientId)?;
    let doctor_id = Uuid::parse_str(doctor_id).map_err(|_| SchedulingError::InvalidDoctorId)?;

    let doctor =
        doctors::get_doctor(conn, &doctor_id)?.ok_or(SchedulingError::DoctorNotFound)?;

    let appointment_date = parse_date(date)?;
    let appointment_time = normalize_time(time)?;
    ensure_within_booking_window(&appointment_time)?;
    ensure_slot_available(conn, &doctor.id, appointment_date, &appointment_time, None)?;

    Ok(CheckoutStaging {
        doctor,
        patient_id,
        patient_email,
        appointment_date,
        appointment_time,
        reason,
    })
}

// ─── Lifecycle operations ─────────────────────────────────────────────────────

/// Persist a booking. Called after payment confirmation, so the window and
/// slot are re-validated: another booking may have landed while the payment
/// session was open.
pub fn create_appointment_record(
    conn: &Connection,
    patient_id: &Uuid,
    doctor_id: &Uuid,
    date: NaiveDate,
    time: &str,
    reason: Option<&str>,
) -> Result<AppointmentView, SchedulingError> {
    ensure_within_booking_window(time)?;
    ensure_slot_available(conn, doctor_id, date, time, None)?;

    let appointment = appointments::insert_appointment(conn, patient_id, doctor_id, date, time, reason)?;
    attach_detail(conn, appointment)
}

/// Cancel an appointment. Idempotent: cancelling an already-cancelled
/// appointment returns the current record unchanged.
pub fn cancel_appointment(
    conn: &Connection,
    appointment_id: &str,
    requesting_patient: Option<&str>,
) -> Result<AppointmentView, SchedulingError> {
    let id = Uuid::parse_str(appointment_id).map_err(|_| SchedulingError::InvalidAppointmentId)?;
    let appointment =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;

    ensure_owned_by(&appointment, requesting_patient)?;

    if appointment.status == AppointmentStatus::Cancelled {
        return attach_detail(conn, appointment);
    }

    appointments::set_status(conn, &id, AppointmentStatus::Cancelled, None)?;
    let updated =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;
    attach_detail(conn, updated)
}

/// Move an appointment to a new slot, resetting its status to `scheduled`.
/// The appointment's own current slot is excluded from the conflict check.
pub fn reschedule_appointment(
    conn: &Connection,
    appointment_id: &str,
    new_date: &str,
    new_time: &str,
    reason: Option<&str>,
    requesting_patient: Option<&str>,
) -> Result<AppointmentView, SchedulingError> {
    let id = Uuid::parse_str(appointment_id).map_err(|_| SchedulingError::InvalidAppointmentId)?;
    let appointment =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;

    ensure_owned_by(&appointment, requesting_patient)?;

    if appointment.status == AppointmentStatus::Cancelled {
        return Err(SchedulingError::RescheduleCancelled);
    }

    let date = parse_date(new_date)?;
    let time = normalize_time(new_time)?;
    ensure_within_booking_window(&time)?;
    ensure_slot_available(conn, &appointment.doctor_id, date, &time, Some(&id))?;

    appointments::update_slot(conn, &id, date, &time, reason)?;
    let updated =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;
    attach_detail(conn, updated)
}

/// Doctor marks an appointment as completed, optionally attaching notes.
pub fn complete_appointment(
    conn: &Connection,
    appointment_id: &str,
    doctor_id: &Uuid,
    notes: Option<&str>,
) -> Result<AppointmentView, SchedulingError> {
    let id = Uuid::parse_str(appointment_id).map_err(|_| SchedulingError::InvalidAppointmentId)?;
    let appointment =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;

    if appointment.doctor_id != *doctor_id {
        return Err(SchedulingError::NotOwner);
    }

    if appointment.status == AppointmentStatus::Cancelled {
        return Err(SchedulingError::CompleteCancelled);
    }

    appointments::set_status(conn, &id, AppointmentStatus::Completed, notes)?;
    let updated =
        appointments::get_appointment(conn, &id)?.ok_or(SchedulingError::AppointmentNotFound)?;
    attach_detail(conn, updated)
}

/// A patient's appointments, soonest first, with doctor detail attached.
pub fn appointments_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<AppointmentView>, SchedulingError> {
    let id = Uuid::parse_str(patient_id).map_err(|_| SchedulingError::InvalidPatientId)?;
    let rows = appointments::for_patient(conn, &id)?;
    rows.into_iter().map(|a| attach_detail(conn, a)).collect()
}

/// Doctor-scoped view: upcoming (scheduled, not yet past) vs history
/// (everything else, most recent first), each entry enriched with the linked
/// prescription summary, plus per-status counts and the nearest upcoming
/// appointment.
pub fn doctor_schedule(
    conn: &Connection,
    doctor_id: &str,
) -> Result<DoctorSchedule, SchedulingError> {
    let id = Uuid::parse_str(doctor_id).map_err(|_| SchedulingError::InvalidDoctorId)?;
    doctors::get_doctor(conn, &id)?.ok_or(SchedulingError::DoctorNotFound)?;

    let now = Local::now().naive_local();
    let mut counts = AppointmentStatusCounts::default();
    let mut upcoming = Vec::new();
    let mut history = Vec::new();

    for appointment in appointments::for_doctor(conn, &id)? {
        match appointment.status {
            AppointmentStatus::Scheduled => counts.scheduled += 1,
            AppointmentStatus::Completed => counts.completed += 1,
            AppointmentStatus::Cancelled => counts.cancelled += 1,
        }

        let is_upcoming =
            appointment.status == AppointmentStatus::Scheduled && slot_datetime(&appointment) >= now;
        let entry = schedule_entry(conn, appointment)?;
        if is_upcoming {
            upcoming.push(entry);
        } else {
            history.push(entry);
        }
    }

    // Rows arrive soonest-first; history reads most-recent-first.
    history.reverse();
    let next_appointment = upcoming.first().cloned();

    Ok(DoctorSchedule { upcoming, history, counts, next_appointment })
}

fn slot_datetime(appointment: &Appointment) -> NaiveDateTime {
    let time = NaiveTime::parse_from_str(&appointment.appointment_time, "%H:%M")
        .unwrap_or(NaiveTime::MIN);
    appointment.appointment_date.and_time(time)
}

fn ensure_owned_by(
    appointment: &Appointment,
    requesting_patient: Option<&str>,
) -> Result<(), SchedulingError> {
    if let Some(raw) = requesting_patient {
        let matches = Uuid::parse_str(raw).map(|p| p == appointment.patient_id).unwrap_or(false);
        if !matches {
            return Err(SchedulingError::NotOwner);
        }
    }
    Ok(())
}

fn attach_detail(
    conn: &Connection,
    appointment: Appointment,
) -> Result<AppointmentView, SchedulingError> {
    let doctor = doctors::get_doctor(conn, &appointment.doctor_id)?.map(|d| d.summary());
    let patient = patients::get_patient(conn, &appointment.patient_id)?.map(|p| p.summary());
    Ok(AppointmentView { appointment, doctor, patient })
}

fn schedule_entry(
    conn: &Connection,
    appointment: Appointment,
) -> Result<DoctorScheduleEntry, SchedulingError> {
    let patient = patients::get_patient(conn, &appointment.patient_id)?.map(|p| p.summary());
    let prescription =
        prescriptions::for_appointment(conn, &appointment.id)?.map(|p| p.summary());
    Ok(DoctorScheduleEntry { appointment, patient, prescription })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::prescription::NewPrescriptionRow;
    use crate::models::{NewDoctor, NewPatient};

    fn seed_doctor(conn: &Connection) -> Doctor {
        doctors::insert_doctor(
            conn,
            &NewDoctor {
                name: "Dr. Ayesha Rahman".into(),
                email: format!("{}@carehub.test", Uuid::new_v4()),
                phone: Some("01700000000".into()),
                department: "Cardiology".into(),
                specialization: "Interventional Cardiology".into(),
                consultation_fee: 150_000,
                image: None,
                availability: None,
            },
        )
        .unwrap()
    }

    fn seed_patient(conn: &Connection) -> crate::models::Patient {
        patients::insert_patient(
            conn,
            &NewPatient {
                name: "Karim Uddin".into(),
                email: format!("{}@mail.test", Uuid::new_v4()),
                phone: None,
                blood_group: Some("O+".into()),
            },
        )
        .unwrap()
    }

    fn book(
        conn: &Connection,
        patient: &Uuid,
        doctor: &Uuid,
        date: &str,
        time: &str,
    ) -> Result<AppointmentView, SchedulingError> {
        create_appointment_record(
            conn,
            patient,
            doctor,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time,
            Some("check-up"),
        )
    }

    #[test]
    fn normalize_pads_hours_and_minutes() {
        assert_eq!(normalize_time("9:5").unwrap(), "09:05");
        assert_eq!(normalize_time("14:30").unwrap(), "14:30");
    }

    #[test]
    fn malformed_times_rejected() {
        assert!(matches!(normalize_time("noon"), Err(SchedulingError::InvalidTime)));
        assert!(matches!(normalize_time("24:00"), Err(SchedulingError::InvalidTime)));
        assert!(matches!(normalize_time("12:60"), Err(SchedulingError::InvalidTime)));
        assert!(matches!(normalize_time("12"), Err(SchedulingError::InvalidTime)));
        assert!(matches!(normalize_time(""), Err(SchedulingError::InvalidTime)));
    }

    #[test]
    fn booking_window_is_inclusive() {
        assert!(matches!(
            ensure_within_booking_window("07:59"),
            Err(SchedulingError::OutsideBookingWindow)
        ));
        assert!(ensure_within_booking_window("08:00").is_ok());
        assert!(ensure_within_booking_window("22:00").is_ok());
        assert!(matches!(
            ensure_within_booking_window("22:01"),
            Err(SchedulingError::OutsideBookingWindow)
        ));
    }

    #[test]
    fn prepare_checkout_validates_ids_and_doctor() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let err = prepare_checkout(
            &conn,
            "not-a-uuid",
            &doctor.id.to_string(),
            "2024-05-01",
            "14:30",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidPatientId));

        let err = prepare_checkout(
            &conn,
            &patient.id.to_string(),
            &Uuid::new_v4().to_string(),
            "2024-05-01",
            "14:30",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::DoctorNotFound));

        let err = prepare_checkout(
            &conn,
            &patient.id.to_string(),
            &doctor.id.to_string(),
            "first of May",
            "14:30",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidDate));

        let staged = prepare_checkout(
            &conn,
            &patient.id.to_string(),
            &doctor.id.to_string(),
            "2024-05-01",
            "9:5",
            Some("follow-up".into()),
            Some("karim@mail.test".into()),
        )
        .unwrap();
        assert_eq!(staged.appointment_time, "09:05");
        assert_eq!(staged.doctor.id, doctor.id);
    }

    #[test]
    fn prepare_checkout_stages_nothing() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        prepare_checkout(
            &conn,
            &patient.id.to_string(),
            &doctor.id.to_string(),
            "2024-05-01",
            "14:30",
            None,
            None,
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn double_booking_same_slot_conflicts() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let first = seed_patient(&conn);
        let second = seed_patient(&conn);

        book(&conn, &first.id, &doctor.id, "2024-05-01", "14:30").unwrap();
        let err = book(&conn, &second.id, &doctor.id, "2024-05-01", "14:30").unwrap_err();
        assert!(matches!(err, SchedulingError::SlotTaken));

        // One minute later is a different slot.
        book(&conn, &second.id, &doctor.id, "2024-05-01", "14:31").unwrap();
    }

    #[test]
    fn cancelled_appointment_frees_the_slot() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        cancel_appointment(&conn, &view.appointment.id.to_string(), None).unwrap();

        book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
    }

    #[test]
    fn completed_appointment_still_blocks_the_slot() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        complete_appointment(&conn, &view.appointment.id.to_string(), &doctor.id, None).unwrap();

        let err = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap_err();
        assert!(matches!(err, SchedulingError::SlotTaken));
    }

    #[test]
    fn cancel_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();

        let first = cancel_appointment(&conn, &id, None).unwrap();
        assert_eq!(first.appointment.status, AppointmentStatus::Cancelled);
        let second = cancel_appointment(&conn, &id, None).unwrap();
        assert_eq!(second.appointment.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn cancel_checks_ownership() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);
        let intruder = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();

        let err = cancel_appointment(&conn, &id, Some(&intruder.id.to_string())).unwrap_err();
        assert!(matches!(err, SchedulingError::NotOwner));

        cancel_appointment(&conn, &id, Some(&patient.id.to_string())).unwrap();
    }

    #[test]
    fn reschedule_excludes_own_slot_from_conflict_check() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();

        // Rescheduling onto its own current slot must not self-conflict.
        let same = reschedule_appointment(&conn, &id, "2024-05-01", "10:00", None, None).unwrap();
        assert_eq!(same.appointment.appointment_time, "10:00");

        let moved = reschedule_appointment(&conn, &id, "2024-05-02", "11:15", None, None).unwrap();
        assert_eq!(moved.appointment.appointment_date.to_string(), "2024-05-02");
        assert_eq!(moved.appointment.appointment_time, "11:15");
    }

    #[test]
    fn reschedule_into_occupied_slot_conflicts() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "11:00").unwrap();

        let err = reschedule_appointment(
            &conn,
            &view.appointment.id.to_string(),
            "2024-05-01",
            "10:00",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::SlotTaken));
    }

    #[test]
    fn reschedule_rejects_cancelled_and_out_of_window() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();

        let err =
            reschedule_appointment(&conn, &id, "2024-05-02", "23:00", None, None).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideBookingWindow));

        cancel_appointment(&conn, &id, None).unwrap();
        let err =
            reschedule_appointment(&conn, &id, "2024-05-02", "11:00", None, None).unwrap_err();
        assert!(matches!(err, SchedulingError::RescheduleCancelled));
    }

    #[test]
    fn reschedule_resets_completed_to_scheduled() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();
        complete_appointment(&conn, &id, &doctor.id, None).unwrap();

        let moved = reschedule_appointment(&conn, &id, "2024-05-03", "09:00", None, None).unwrap();
        assert_eq!(moved.appointment.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn complete_requires_owning_doctor() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let other_doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let id = view.appointment.id.to_string();

        let err = complete_appointment(&conn, &id, &other_doctor.id, None).unwrap_err();
        assert!(matches!(err, SchedulingError::NotOwner));

        let done = complete_appointment(&conn, &id, &doctor.id, Some("BP stable")).unwrap();
        assert_eq!(done.appointment.status, AppointmentStatus::Completed);
        assert_eq!(done.appointment.notes.as_deref(), Some("BP stable"));
    }

    #[test]
    fn views_attach_doctor_and_patient_detail() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2024-05-01", "10:00").unwrap();
        let attached_doctor = view.doctor.unwrap();
        assert_eq!(attached_doctor.department, "Cardiology");
        assert_eq!(view.patient.unwrap().name, "Karim Uddin");
    }

    #[test]
    fn doctor_schedule_partitions_and_counts() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        // Past: one completed, one cancelled.
        let past_done = book(&conn, &patient.id, &doctor.id, "2020-01-10", "09:00").unwrap();
        complete_appointment(&conn, &past_done.appointment.id.to_string(), &doctor.id, None)
            .unwrap();
        let past_gone = book(&conn, &patient.id, &doctor.id, "2020-01-11", "09:00").unwrap();
        cancel_appointment(&conn, &past_gone.appointment.id.to_string(), None).unwrap();
        // Past but still marked scheduled: belongs in history.
        book(&conn, &patient.id, &doctor.id, "2020-01-12", "09:00").unwrap();
        // Future bookings.
        book(&conn, &patient.id, &doctor.id, "2099-06-01", "10:00").unwrap();
        let nearest = book(&conn, &patient.id, &doctor.id, "2099-01-01", "08:30").unwrap();

        let schedule = doctor_schedule(&conn, &doctor.id.to_string()).unwrap();

        assert_eq!(schedule.upcoming.len(), 2);
        assert_eq!(schedule.history.len(), 3);
        assert_eq!(schedule.counts.scheduled, 3);
        assert_eq!(schedule.counts.completed, 1);
        assert_eq!(schedule.counts.cancelled, 1);
        // History is most-recent-first.
        assert_eq!(
            schedule.history[0].appointment.appointment_date.to_string(),
            "2020-01-12"
        );
        assert_eq!(
            schedule.next_appointment.unwrap().appointment.id,
            nearest.appointment.id
        );
    }

    #[test]
    fn doctor_schedule_links_prescriptions() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn);
        let patient = seed_patient(&conn);

        let view = book(&conn, &patient.id, &doctor.id, "2020-03-01", "09:00").unwrap();
        complete_appointment(&conn, &view.appointment.id.to_string(), &doctor.id, None).unwrap();
        prescriptions::insert_prescription(
            &conn,
            &NewPrescriptionRow {
                appointment_id: view.appointment.id,
                patient_id: patient.id,
                doctor_id: doctor.id,
                diagnosis: Some("Hypertension"),
                medications: &[],
                advice: None,
            },
        )
        .unwrap();

        let schedule = doctor_schedule(&conn, &doctor.id.to_string()).unwrap();
        let entry = &schedule.history[0];
        let summary = entry.prescription.as_ref().unwrap();
        assert_eq!(summary.diagnosis.as_deref(), Some("Hypertension"));
    }

    #[test]
    fn unknown_doctor_schedule_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = doctor_schedule(&conn, &Uuid::new_v4().to_string()).unwrap_err();
        assert!(matches!(err, SchedulingError::DoctorNotFound));
        let err = doctor_schedule(&conn, "garbage").unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidDoctorId));
    }
}
