use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weekly consulting hours, stored as JSON in the doctors table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub days: Vec<String>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub specialization: String,
    /// Consultation fee in cents.
    pub consultation_fee: i64,
    pub image: Option<String>,
    pub availability: Option<Availability>,
    pub created_at: NaiveDateTime,
}

/// The subset of doctor fields attached to appointment responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub name: String,
    pub department: String,
    pub specialization: String,
    pub image: Option<String>,
    pub consultation_fee: i64,
    pub availability: Option<Availability>,
}

impl Doctor {
    pub fn summary(&self) -> DoctorSummary {
        DoctorSummary {
            name: self.name.clone(),
            department: self.department.clone(),
            specialization: self.specialization.clone(),
            image: self.image.clone(),
            consultation_fee: self.consultation_fee,
            availability: self.availability.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub specialization: String,
    pub consultation_fee: i64,
    pub image: Option<String>,
    pub availability: Option<Availability>,
}
