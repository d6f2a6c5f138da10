//! API router. All routes live under `/api/`; authentication is pulled in by
//! the handlers that need it via the [`AuthContext`] extractor, so public and
//! authenticated methods can share a path.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the full API router.
pub fn api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        // Appointments + checkout
        .route("/appointments/checkout", post(endpoints::appointments::checkout))
        .route(
            "/appointments/patient/:patient_id",
            get(endpoints::appointments::by_patient),
        )
        .route(
            "/appointments/doctor/:doctor_id",
            get(endpoints::appointments::by_doctor),
        )
        .route(
            "/appointments/:id/reschedule",
            patch(endpoints::appointments::reschedule),
        )
        .route("/appointments/:id/cancel", patch(endpoints::appointments::cancel))
        .route(
            "/appointments/:id/complete",
            patch(endpoints::appointments::complete),
        )
        .route("/payments/confirm/:session_id", post(endpoints::payments::confirm))
        // Directories
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route("/doctors/:id", get(endpoints::doctors::detail))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::register),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        // Prescriptions
        .route("/prescriptions", post(endpoints::prescriptions::create))
        .route("/prescriptions/:id", get(endpoints::prescriptions::detail))
        .route(
            "/prescriptions/doctor/:doctor_id",
            get(endpoints::prescriptions::for_doctor),
        )
        .route(
            "/prescriptions/patient/:patient_id",
            get(endpoints::prescriptions::for_patient),
        )
        // Blood bank
        .route(
            "/blood-bank/inventories",
            get(endpoints::blood_bank::list_inventories)
                .post(endpoints::blood_bank::create_inventory),
        )
        .route(
            "/blood-bank/inventories/:id",
            patch(endpoints::blood_bank::update_inventory)
                .delete(endpoints::blood_bank::delete_inventory),
        )
        .route("/blood-bank/summary", get(endpoints::blood_bank::summary))
        .route("/blood-bank/adjust", post(endpoints::blood_bank::adjust))
        .route("/blood-bank/donations", post(endpoints::blood_bank::record_donation))
        .route(
            "/blood-bank/requests",
            get(endpoints::blood_bank::list_requests)
                .post(endpoints::blood_bank::create_request),
        )
        .route(
            "/blood-bank/requests/:id/status",
            patch(endpoints::blood_bank::update_request_status),
        )
        .route("/blood-bank/history", get(endpoints::blood_bank::history))
        .with_state(ctx.clone())
        // Extension carries ApiContext so the AuthContext extractor can reach
        // the token store from request parts.
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::repository::auth as tokens;
    use crate::db::repository::{doctor as doctors, patient as patients};
    use crate::models::enums::UserRole;
    use crate::models::{NewDoctor, NewPatient};
    use crate::payments::PaymentClient;

    struct Harness {
        state: Arc<AppState>,
        admin_token: String,
        doctor_token: String,
        patient_token: String,
        doctor_id: Uuid,
        patient_id: Uuid,
        _tmp: tempfile::TempDir,
    }

    impl Harness {
        fn app(&self) -> Router {
            api_router(self.state.clone())
        }
    }

    fn harness() -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let state =
            AppState::new(tmp.path().join("api.db"), PaymentClient::new(None, None)).unwrap();

        let conn = state.open_db().unwrap();
        let doctor = doctors::insert_doctor(
            &conn,
            &NewDoctor {
                name: "Dr. Mahmud Hasan".into(),
                email: "mahmud@carehub.test".into(),
                phone: Some("01811111111".into()),
                department: "Orthopedics".into(),
                specialization: "Sports Injuries".into(),
                consultation_fee: 100_000,
                image: None,
                availability: None,
            },
        )
        .unwrap();
        let patient = patients::insert_patient(
            &conn,
            &NewPatient {
                name: "Shefali Akter".into(),
                email: "shefali@mail.test".into(),
                phone: None,
                blood_group: Some("B+".into()),
            },
        )
        .unwrap();

        let admin_id = Uuid::new_v4();
        let admin_token = format!("tok-admin-{}", Uuid::new_v4().simple());
        let doctor_token = format!("tok-doctor-{}", Uuid::new_v4().simple());
        let patient_token = format!("tok-patient-{}", Uuid::new_v4().simple());
        tokens::issue_token(&conn, &admin_token, &admin_id, "admin@carehub.test", UserRole::Admin)
            .unwrap();
        tokens::issue_token(&conn, &doctor_token, &doctor.id, &doctor.email, UserRole::Doctor)
            .unwrap();
        tokens::issue_token(&conn, &patient_token, &patient.id, &patient.email, UserRole::Patient)
            .unwrap();

        Harness {
            state,
            admin_token,
            doctor_token,
            patient_token,
            doctor_id: doctor.id,
            patient_id: patient.id,
            _tmp: tmp,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn send(
        h: &Harness,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let response = h.app().oneshot(request(method, uri, token, body)).await.unwrap();
        let status = response.status();
        (status, response_json(response).await)
    }

    async fn book_slot(h: &Harness, date: &str, time: &str) -> serde_json::Value {
        let (status, json) = send(
            h,
            "POST",
            "/api/appointments/checkout",
            Some(&h.patient_token),
            Some(serde_json::json!({
                "patient": h.patient_id.to_string(),
                "doctor": h.doctor_id.to_string(),
                "appointmentDate": date,
                "appointmentTime": time,
                "reason": "knee pain",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "checkout failed: {json}");
        let session = json["data"]["sessionId"].as_str().unwrap().to_string();

        let (status, json) = send(
            h,
            "POST",
            &format!("/api/payments/confirm/{session}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "confirm failed: {json}");
        json["data"].clone()
    }

    #[tokio::test]
    async fn health_is_public() {
        let h = harness();
        let (status, json) = send(&h, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let h = harness();
        let response = h
            .app()
            .oneshot(request("GET", "/api/nonexistent", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let h = harness();
        let uri = format!("/api/appointments/patient/{}", h.patient_id);
        let (status, json) = send(&h, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);

        let (status, _) = send(&h, "GET", &uri, Some("bogus-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn checkout_confirm_creates_appointment() {
        let h = harness();
        let appointment = book_slot(&h, "2099-03-01", "10:00").await;
        assert_eq!(appointment["status"], "scheduled");
        assert_eq!(appointment["appointmentTime"], "10:00");
        assert_eq!(appointment["doctor"]["department"], "Orthopedics");
        assert_eq!(appointment["patient"]["name"], "Shefali Akter");
    }

    #[tokio::test]
    async fn confirm_is_single_use() {
        let h = harness();
        let (_, json) = send(
            &h,
            "POST",
            "/api/appointments/checkout",
            Some(&h.patient_token),
            Some(serde_json::json!({
                "patient": h.patient_id.to_string(),
                "doctor": h.doctor_id.to_string(),
                "appointmentDate": "2099-03-02",
                "appointmentTime": "11:00",
            })),
        )
        .await;
        let session = json["data"]["sessionId"].as_str().unwrap().to_string();

        let uri = format!("/api/payments/confirm/{session}");
        let (status, _) = send(&h, "POST", &uri, None, None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, json) = send(&h, "POST", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn patient_cannot_book_for_someone_else() {
        let h = harness();
        let (status, _) = send(
            &h,
            "POST",
            "/api/appointments/checkout",
            Some(&h.patient_token),
            Some(serde_json::json!({
                "patient": Uuid::new_v4().to_string(),
                "doctor": h.doctor_id.to_string(),
                "appointmentDate": "2099-03-01",
                "appointmentTime": "10:00",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn taken_slot_conflicts_with_409() {
        let h = harness();
        book_slot(&h, "2099-03-01", "14:30").await;

        let (status, json) = send(
            &h,
            "POST",
            "/api/appointments/checkout",
            Some(&h.patient_token),
            Some(serde_json::json!({
                "patient": h.patient_id.to_string(),
                "doctor": h.doctor_id.to_string(),
                "appointmentDate": "2099-03-01",
                "appointmentTime": "14:30",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "The selected slot is no longer available");

        // One minute later is bookable.
        book_slot(&h, "2099-03-01", "14:31").await;
    }

    #[tokio::test]
    async fn out_of_window_time_is_rejected() {
        let h = harness();
        for time in ["07:59", "22:01"] {
            let (status, _) = send(
                &h,
                "POST",
                "/api/appointments/checkout",
                Some(&h.patient_token),
                Some(serde_json::json!({
                    "patient": h.patient_id.to_string(),
                    "doctor": h.doctor_id.to_string(),
                    "appointmentDate": "2099-03-01",
                    "appointmentTime": time,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "time={time}");
        }
    }

    #[tokio::test]
    async fn cancel_via_http_is_idempotent() {
        let h = harness();
        let appointment = book_slot(&h, "2099-04-01", "09:00").await;
        let uri = format!("/api/appointments/{}/cancel", appointment["id"].as_str().unwrap());

        let (status, json) = send(&h, "PATCH", &uri, Some(&h.patient_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "cancelled");

        let (status, json) = send(&h, "PATCH", &uri, Some(&h.patient_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "cancelled");
    }

    #[tokio::test]
    async fn reschedule_moves_the_slot() {
        let h = harness();
        let appointment = book_slot(&h, "2099-04-02", "09:00").await;
        let uri = format!(
            "/api/appointments/{}/reschedule",
            appointment["id"].as_str().unwrap()
        );

        let (status, json) = send(
            &h,
            "PATCH",
            &uri,
            Some(&h.patient_token),
            Some(serde_json::json!({
                "appointmentDate": "2099-04-03",
                "appointmentTime": "16:45",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["appointmentDate"], "2099-04-03");
        assert_eq!(json["data"]["appointmentTime"], "16:45");
        assert_eq!(json["data"]["status"], "scheduled");
    }

    #[tokio::test]
    async fn complete_is_doctor_gated() {
        let h = harness();
        let appointment = book_slot(&h, "2099-04-04", "09:00").await;
        let uri = format!("/api/appointments/{}/complete", appointment["id"].as_str().unwrap());

        let (status, _) = send(
            &h,
            "PATCH",
            &uri,
            Some(&h.patient_token),
            Some(serde_json::json!({ "notes": "sneaky" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = send(
            &h,
            "PATCH",
            &uri,
            Some(&h.doctor_token),
            Some(serde_json::json!({ "notes": "full recovery expected" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "completed");
        assert_eq!(json["data"]["notes"], "full recovery expected");
    }

    #[tokio::test]
    async fn doctor_schedule_partitions_upcoming_and_history() {
        let h = harness();
        book_slot(&h, "2099-05-01", "10:00").await;
        let past = book_slot(&h, "2099-05-02", "11:00").await;
        let complete_uri =
            format!("/api/appointments/{}/complete", past["id"].as_str().unwrap());
        send(&h, "PATCH", &complete_uri, Some(&h.doctor_token), None).await;

        let uri = format!("/api/appointments/doctor/{}", h.doctor_id);
        let (status, json) = send(&h, "GET", &uri, Some(&h.doctor_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["upcoming"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["history"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["counts"]["scheduled"], 1);
        assert_eq!(json["data"]["counts"]["completed"], 1);
        assert!(json["data"]["nextAppointment"].is_object());

        // Patients cannot read a doctor's schedule.
        let (status, _) = send(&h, "GET", &uri, Some(&h.patient_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn doctors_list_is_public_with_meta_and_projection() {
        let h = harness();
        let (status, json) = send(
            &h,
            "GET",
            "/api/doctors?searchTerm=orthopedics&fields=name,department&limit=5",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["meta"]["page"], 1);
        assert_eq!(json["meta"]["limit"], 5);
        assert_eq!(json["meta"]["total"], 1);
        assert_eq!(json["meta"]["totalPage"], 1);

        let row = &json["data"][0];
        assert_eq!(row["name"], "Dr. Mahmud Hasan");
        assert_eq!(row["department"], "Orthopedics");
        assert!(row.get("email").is_none(), "projection should drop email");
        assert!(row.get("id").is_some(), "projection keeps id");
    }

    #[tokio::test]
    async fn doctor_creation_is_admin_only() {
        let h = harness();
        let payload = serde_json::json!({
            "name": "Dr. Naznin Sultana",
            "email": "naznin@carehub.test",
            "department": "Pediatrics",
            "specialization": "Neonatology",
            "consultationFee": 90000,
        });

        let (status, _) =
            send(&h, "POST", "/api/doctors", Some(&h.doctor_token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) =
            send(&h, "POST", "/api/doctors", Some(&h.admin_token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["department"], "Pediatrics");
    }

    #[tokio::test]
    async fn duplicate_patient_email_conflicts() {
        let h = harness();
        let payload = serde_json::json!({
            "name": "Another Shefali",
            "email": "shefali@mail.test",
        });
        let (status, json) = send(&h, "POST", "/api/patients", None, Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn blood_bank_full_flow() {
        let h = harness();

        // Create O- inventory with 10 units (admin only).
        let create = serde_json::json!({ "bloodGroup": "O-", "unitsAvailable": 10 });
        let (status, _) = send(
            &h,
            "POST",
            "/api/blood-bank/inventories",
            Some(&h.patient_token),
            Some(create.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = send(
            &h,
            "POST",
            "/api/blood-bank/inventories",
            Some(&h.admin_token),
            Some(create.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["unitsAvailable"], 10);

        // Duplicate group conflicts.
        let (status, _) = send(
            &h,
            "POST",
            "/api/blood-bank/inventories",
            Some(&h.admin_token),
            Some(create),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Inventory list and summary are public.
        let (status, json) = send(&h, "GET", "/api/blood-bank/inventories", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        let (status, json) = send(&h, "GET", "/api/blood-bank/summary", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["O-"], 10);

        // Adjust down by 3.
        let (status, json) = send(
            &h,
            "POST",
            "/api/blood-bank/adjust",
            Some(&h.admin_token),
            Some(serde_json::json!({ "bloodGroup": "O-", "adjustBy": -3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["unitsAvailable"], 7);

        // Public blood request for 5 units.
        let (status, json) = send(
            &h,
            "POST",
            "/api/blood-bank/requests",
            None,
            Some(serde_json::json!({
                "bloodGroup": "O-",
                "unitsRequested": 5,
                "priority": "critical",
                "requesterName": "City Hospital ICU",
                "requesterEmail": "icu@cityhospital.test",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let request_id = json["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(json["data"]["status"], "pending");

        // Approve deducts stock.
        let status_uri = format!("/api/blood-bank/requests/{request_id}/status");
        let (status, json) = send(
            &h,
            "PATCH",
            &status_uri,
            Some(&h.admin_token),
            Some(serde_json::json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "approved");

        let (_, json) = send(&h, "GET", "/api/blood-bank/summary", None, None).await;
        assert_eq!(json["data"]["O-"], 2);

        // Fulfil without a second deduction.
        let (status, json) = send(
            &h,
            "PATCH",
            &status_uri,
            Some(&h.admin_token),
            Some(serde_json::json!({ "status": "fulfilled" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "fulfilled");
        let (_, json) = send(&h, "GET", "/api/blood-bank/summary", None, None).await;
        assert_eq!(json["data"]["O-"], 2);

        // History shows the whole ledger with running balances.
        let (status, json) =
            send(&h, "GET", "/api/blood-bank/history?bloodGroup=O-", Some(&h.admin_token), None)
                .await;
        assert_eq!(status, StatusCode::OK);
        let history = json["data"][0]["history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2]["change"], -5);
        assert_eq!(history[2]["balanceAfter"], 2);
        assert_eq!(history[2]["type"], "request-fulfillment");
    }

    #[tokio::test]
    async fn insufficient_stock_is_unprocessable() {
        let h = harness();
        send(
            &h,
            "POST",
            "/api/blood-bank/inventories",
            Some(&h.admin_token),
            Some(serde_json::json!({ "bloodGroup": "AB-", "unitsAvailable": 3 })),
        )
        .await;

        let (_, json) = send(
            &h,
            "POST",
            "/api/blood-bank/requests",
            None,
            Some(serde_json::json!({
                "bloodGroup": "AB-",
                "unitsRequested": 5,
                "requesterName": "Ward 9",
            })),
        )
        .await;
        let request_id = json["data"]["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &h,
            "PATCH",
            &format!("/api/blood-bank/requests/{request_id}/status"),
            Some(&h.admin_token),
            Some(serde_json::json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], "Insufficient stock for AB-. Available: 3");

        // Inventory untouched.
        let (_, json) = send(&h, "GET", "/api/blood-bank/summary", None, None).await;
        assert_eq!(json["data"]["AB-"], 3);
    }

    #[tokio::test]
    async fn unsupported_status_is_bad_request() {
        let h = harness();
        let (_, json) = send(
            &h,
            "POST",
            "/api/blood-bank/requests",
            None,
            Some(serde_json::json!({
                "bloodGroup": "A+",
                "unitsRequested": 1,
                "requesterName": "Ward 2",
            })),
        )
        .await;
        let request_id = json["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &h,
            "PATCH",
            &format!("/api/blood-bank/requests/{request_id}/status"),
            Some(&h.admin_token),
            Some(serde_json::json!({ "status": "archived" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn request_list_filters_by_status() {
        let h = harness();
        for group in ["A+", "B+"] {
            send(
                &h,
                "POST",
                "/api/blood-bank/requests",
                None,
                Some(serde_json::json!({
                    "bloodGroup": group,
                    "unitsRequested": 1,
                    "requesterName": "General Ward",
                })),
            )
            .await;
        }

        let (status, json) = send(
            &h,
            "GET",
            "/api/blood-bank/requests?status=pending&bloodGroup=A%2B",
            Some(&h.admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["bloodGroup"], "A+");
        assert_eq!(json["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn prescription_flow_doctor_writes_patient_reads() {
        let h = harness();
        let appointment = book_slot(&h, "2099-06-01", "10:00").await;
        let appointment_id = appointment["id"].as_str().unwrap().to_string();

        let payload = serde_json::json!({
            "appointment": appointment_id,
            "diagnosis": "Ligament strain",
            "medications": [
                { "name": "Naproxen", "dosage": "250mg", "frequency": "twice daily" }
            ],
            "advice": "Rest for two weeks",
        });

        // Patients cannot prescribe.
        let (status, _) = send(
            &h,
            "POST",
            "/api/prescriptions",
            Some(&h.patient_token),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) =
            send(&h, "POST", "/api/prescriptions", Some(&h.doctor_token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let prescription_id = json["data"]["id"].as_str().unwrap().to_string();

        // Second prescription for the same appointment conflicts.
        let (status, _) =
            send(&h, "POST", "/api/prescriptions", Some(&h.doctor_token), Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // The patient can read it.
        let (status, json) = send(
            &h,
            "GET",
            &format!("/api/prescriptions/{prescription_id}"),
            Some(&h.patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["diagnosis"], "Ligament strain");

        // The doctor-scoped schedule now links the prescription.
        let (_, json) = send(
            &h,
            "GET",
            &format!("/api/appointments/doctor/{}", h.doctor_id),
            Some(&h.doctor_token),
            None,
        )
        .await;
        let upcoming = json["data"]["upcoming"].as_array().unwrap();
        assert_eq!(
            upcoming[0]["prescription"]["diagnosis"], "Ligament strain",
            "schedule entries carry the linked prescription"
        );
    }
}
