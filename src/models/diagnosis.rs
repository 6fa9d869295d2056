use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use super::measurements::{LabResults, VitalSigns};
use super::ValidationError;

/// Body for `POST /api/diagnosis/predict`. Built client-side, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    /// Links the prediction to a stored patient, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: Vec<String>,
    /// Absent means unspecified, which the service does not treat as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_duration_days: Option<u32>,
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol: bool,
    #[serde(default)]
    pub existing_conditions: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_results: Option<LabResults>,
}

/// Reject a request before it reaches the network.
///
/// Only the symptom invariant is checked here. Out-of-range vitals and labs
/// are forwarded untouched for the service to judge.
pub fn validate_diagnosis_request(
    req: DiagnosisRequest,
) -> Result<DiagnosisRequest, ValidationError> {
    if req.symptoms.is_empty() {
        return Err(ValidationError::EmptySymptoms);
    }
    Ok(req)
}

/// One candidate in a ranked differential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub disease: String,
    /// Percentage in [0, 100].
    pub confidence: f64,
}

/// Prediction returned for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub predicted_disease: String,
    /// Percentage in [0, 100], not a 0-1 probability.
    pub confidence: f64,
    /// Service order is authoritative; callers must not re-sort.
    #[serde(default)]
    pub top_predictions: Vec<RankedPrediction>,
    #[serde(default)]
    pub ai_suggestion: Option<String>,
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub recommended_tests: Vec<String>,
    #[serde(default)]
    pub recommended_treatments: Vec<String>,
}

impl DiagnosisResponse {
    /// True when `top_predictions` is non-increasing in confidence, which is
    /// what the service promises.
    pub fn is_ranked(&self) -> bool {
        is_ranked(&self.top_predictions)
    }
}

fn is_ranked(predictions: &[RankedPrediction]) -> bool {
    predictions
        .windows(2)
        .all(|pair| pair[0].confidence >= pair[1].confidence)
}

/// A past prediction as listed by `GET /api/diagnosis/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub diagnosis: String,
    pub confidence: f64,
    #[serde(default)]
    pub ai_suggestion: Option<String>,
    #[serde(default)]
    pub root_cause: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Vocabulary body of `GET /api/diagnosis/symptoms`.
#[derive(Debug, Clone, Deserialize)]
pub struct SymptomVocabulary {
    pub symptoms: Vec<String>,
}

/// Vocabulary body of `GET /api/diagnosis/diseases`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseVocabulary {
    pub diseases: Vec<String>,
}
