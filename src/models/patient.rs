use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{Gender, Severity};
use super::measurements::{LabResults, VitalSigns};

/// A stored patient record. Created by the service's seeding/ingestion
/// process and only ever read by this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Service-assigned record id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol: bool,
    #[serde(default)]
    pub existing_conditions: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<String>,
    #[serde(default)]
    pub current_medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub symptom_duration_days: Option<u32>,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub lab_results: Option<LabResults>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Identifier shown to users: the clinical patient id when present,
    /// otherwise the service record id.
    pub fn display_id(&self) -> Option<&str> {
        self.patient_id.as_deref().or(self.id.as_deref())
    }

    /// The record a store would hold for `new` under `id`, before any
    /// diagnosis is attached.
    pub fn from_new(id: String, new: NewPatient) -> Self {
        Self {
            id: Some(id),
            patient_id: None,
            first_name: new.first_name,
            last_name: new.last_name,
            age: new.age,
            gender: new.gender,
            blood_group: new.blood_group,
            country: new.country,
            state: new.state,
            city: new.city,
            contact: None,
            email: None,
            weight_kg: None,
            height_cm: None,
            smoking: new.smoking,
            alcohol: new.alcohol,
            existing_conditions: new.existing_conditions,
            family_history: new.family_history,
            current_medications: new.current_medications,
            allergies: new.allergies,
            symptoms: new.symptoms,
            symptom_duration_days: new.symptom_duration_days,
            vital_signs: new.vital_signs,
            lab_results: new.lab_results,
            diagnosis: None,
            severity: None,
            treatment: None,
            root_cause: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Body for `POST /api/patients/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub smoking: bool,
    pub alcohol: bool,
    pub existing_conditions: Vec<String>,
    pub family_history: Vec<String>,
    pub current_medications: Vec<String>,
    pub allergies: Vec<String>,
    pub symptoms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_results: Option<LabResults>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = r#"{
        "id": "65f0c1d2e3a4b5c6d7e8f901",
        "patient_id": "PT-00042",
        "first_name": "Asha",
        "last_name": "Rao",
        "age": 52,
        "gender": "female",
        "blood_group": "B+",
        "country": "India",
        "city": "Pune",
        "smoking": false,
        "alcohol": true,
        "existing_conditions": ["hypertension", "hypertension"],
        "symptoms": ["fatigue", "blurred vision"],
        "vital_signs": {"blood_pressure_systolic": 150.0},
        "diagnosis": "Type 2 Diabetes",
        "severity": "Moderate",
        "created_at": "2025-03-14T09:26:53.589000"
    }"#;

    #[test]
    fn stored_patient_deserializes_with_defaults() {
        let patient: Patient = serde_json::from_str(STORED).unwrap();
        assert_eq!(patient.full_name(), "Asha Rao");
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.severity, Some(Severity::Moderate));
        assert!(patient.allergies.is_empty());
        assert!(patient.lab_results.is_none());
        assert_eq!(
            patient.vital_signs.as_ref().and_then(|v| v.blood_pressure_systolic),
            Some(150.0)
        );
        assert!(patient.created_at.is_some());
    }

    #[test]
    fn history_lists_keep_order_and_duplicates() {
        let patient: Patient = serde_json::from_str(STORED).unwrap();
        assert_eq!(patient.existing_conditions, vec!["hypertension", "hypertension"]);
        assert_eq!(patient.symptoms, vec!["fatigue", "blurred vision"]);
    }

    #[test]
    fn display_id_prefers_patient_id() {
        let mut patient: Patient = serde_json::from_str(STORED).unwrap();
        assert_eq!(patient.display_id(), Some("PT-00042"));
        patient.patient_id = None;
        assert_eq!(patient.display_id(), Some("65f0c1d2e3a4b5c6d7e8f901"));
    }

    #[test]
    fn new_patient_omits_unset_optionals() {
        let body = NewPatient {
            first_name: "Liam".into(),
            last_name: "Ng".into(),
            age: 30,
            country: "India".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["gender"], "male");
        assert!(json.get("blood_group").is_none());
        assert!(json.get("vital_signs").is_none());
        assert_eq!(json["symptoms"], serde_json::json!([]));
    }
}
