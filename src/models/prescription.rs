use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prescribed medication line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: Option<String>,
    pub medications: Vec<MedicationLine>,
    pub advice: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Compact form attached to doctor-schedule rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionSummary {
    pub id: Uuid,
    pub diagnosis: Option<String>,
    pub medication_count: usize,
    pub created_at: NaiveDateTime,
}

impl Prescription {
    pub fn summary(&self) -> PrescriptionSummary {
        PrescriptionSummary {
            id: self.id,
            diagnosis: self.diagnosis.clone(),
            medication_count: self.medications.len(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub appointment: Uuid,
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Vec<MedicationLine>,
    pub advice: Option<String>,
}
