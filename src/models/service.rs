//! Aggregate statistics and service-administration bodies.

use serde::{Deserialize, Serialize};

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub database: String,
    pub ml_model: String,
}

impl ServiceHealth {
    pub fn is_database_connected(&self) -> bool {
        self.database == "connected"
    }

    pub fn is_model_loaded(&self) -> bool {
        self.ml_model == "loaded"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseCount {
    pub disease: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: u64,
}

/// Age bucket keyed by its lower bound ("0", "18", ...) or "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub range: String,
    pub count: u64,
}

/// Body of `GET /api/patients/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_patients: u64,
    #[serde(default)]
    pub diagnosis_distribution: Vec<DiseaseCount>,
    #[serde(default)]
    pub country_distribution: Vec<CountryCount>,
    #[serde(default)]
    pub severity_distribution: Vec<SeverityCount>,
    #[serde(default)]
    pub gender_distribution: Vec<GenderCount>,
    #[serde(default)]
    pub age_distribution: Vec<AgeBucket>,
}

impl Statistics {
    /// The `n` most frequent diagnoses, in service order.
    pub fn top_diagnoses(&self, n: usize) -> &[DiseaseCount] {
        &self.diagnosis_distribution[..n.min(self.diagnosis_distribution.len())]
    }
}

/// Body of `POST /api/data/seed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub message: String,
    #[serde(default)]
    pub count: u64,
}

/// Body of `POST /api/data/train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub message: String,
    pub accuracy: f64,
    pub n_classes: u32,
    #[serde(default)]
    pub classes: Vec<String>,
    pub n_samples: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_flags() {
        let health: ServiceHealth = serde_json::from_str(
            r#"{"status":"healthy","database":"connected","ml_model":"not loaded"}"#,
        )
        .unwrap();
        assert!(health.is_database_connected());
        assert!(!health.is_model_loaded());
    }

    #[test]
    fn statistics_tolerate_missing_distributions() {
        let stats: Statistics = serde_json::from_str(
            r#"{"total_patients":3,"diagnosis_distribution":[
                {"disease":"Influenza","count":2},{"disease":"Migraine","count":1}]}"#,
        )
        .unwrap();
        assert_eq!(stats.total_patients, 3);
        assert!(stats.age_distribution.is_empty());
        assert_eq!(stats.top_diagnoses(1)[0].disease, "Influenza");
        assert_eq!(stats.top_diagnoses(10).len(), 2);
    }
}
