//! Card-checkout integration: an outbound client for the external payment
//! processor plus the stage/confirm flow around appointment booking.
//!
//! Booking is two-phase. `stage_checkout` validates the slot and opens a
//! payment session without writing an appointment; `confirm_checkout` consumes
//! the staged booking exactly once and creates the record. Without a
//! configured gateway the client runs offline and issues local session ids,
//! which keeps development and tests off the network.

use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::checkout::{self, PendingCheckout};
use crate::db::DatabaseError;
use crate::models::AppointmentView;
use crate::scheduling::{self, SchedulingError};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment session could not be created: {0}")]
    Gateway(String),
    #[error("Payment session not found")]
    SessionNotFound,
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Client for the external checkout-session API. `None` gateway → offline
/// mode.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    gateway_url: Option<String>,
    secret: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

impl PaymentClient {
    pub fn new(gateway_url: Option<String>, secret: Option<String>) -> Self {
        Self {
            gateway_url,
            secret,
            http: reqwest::Client::new(),
        }
    }

    /// Create a card-checkout session for the given amount and return its id.
    pub async fn create_session(
        &self,
        amount_cents: i64,
        description: &str,
    ) -> Result<String, PaymentError> {
        let Some(gateway_url) = &self.gateway_url else {
            return Ok(format!("cs_local_{}", Uuid::new_v4().simple()));
        };

        let body = serde_json::json!({
            "amount": amount_cents,
            "currency": "usd",
            "description": description,
            "payment_method_types": ["card"],
        });

        let mut request = self
            .http
            .post(format!("{gateway_url}/v1/checkout/sessions"))
            .json(&body);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PaymentError::Gateway(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;
        Ok(session.id)
    }
}

/// Booking request as received from the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub patient: String,
    pub doctor: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: Option<String>,
    pub patient_email: Option<String>,
}

/// Validate the booking, open a payment session, and persist the staged
/// checkout. No appointment exists until the session is confirmed.
pub async fn stage_checkout(
    conn: &Connection,
    client: &PaymentClient,
    payload: &CheckoutPayload,
) -> Result<String, PaymentError> {
    let staged = scheduling::prepare_checkout(
        conn,
        &payload.patient,
        &payload.doctor,
        &payload.appointment_date,
        &payload.appointment_time,
        payload.reason.clone(),
        payload.patient_email.clone(),
    )?;

    let description = format!(
        "Consultation with {} on {} at {}",
        staged.doctor.name, staged.appointment_date, staged.appointment_time
    );
    let session_id = client
        .create_session(staged.doctor.consultation_fee, &description)
        .await?;

    checkout::insert_checkout(
        conn,
        &PendingCheckout {
            session_id: session_id.clone(),
            patient_id: staged.patient_id,
            patient_email: staged.patient_email,
            doctor_id: staged.doctor.id,
            appointment_date: staged.appointment_date,
            appointment_time: staged.appointment_time,
            reason: staged.reason,
            amount_cents: staged.doctor.consultation_fee,
        },
    )?;

    tracing::info!(%session_id, doctor = %staged.doctor.id, "checkout staged");
    Ok(session_id)
}

/// Consume a confirmed payment session and create the appointment. The staged
/// row is deleted and the appointment inserted in one transaction, so a
/// session can be redeemed at most once; if the slot was taken while the
/// session was open, the transaction rolls back and the stage survives for a
/// retry at another slot.
pub fn confirm_checkout(
    conn: &mut Connection,
    session_id: &str,
) -> Result<AppointmentView, PaymentError> {
    let tx = conn.transaction().map_err(DatabaseError::from)?;

    let staged = checkout::take_checkout(&tx, session_id)?.ok_or(PaymentError::SessionNotFound)?;
    let view = scheduling::create_appointment_record(
        &tx,
        &staged.patient_id,
        &staged.doctor_id,
        staged.appointment_date,
        &staged.appointment_time,
        staged.reason.as_deref(),
    )?;

    tx.commit().map_err(DatabaseError::from)?;
    tracing::info!(%session_id, appointment = %view.appointment.id, "checkout confirmed");
    Ok(view)
}
