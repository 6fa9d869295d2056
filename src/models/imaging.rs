use serde::{Deserialize, Serialize};

/// Findings returned by `POST /api/diagnosis/analyze-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    /// Label the service settled on, e.g. "chest X-ray".
    pub image_type: String,
    pub findings: String,
    /// Percentage in [0, 100].
    pub confidence: f64,
    #[serde(default)]
    pub abnormalities_detected: Vec<String>,
    pub recommendation: String,
}

impl ImageAnalysisResult {
    pub fn has_abnormalities(&self) -> bool {
        !self.abnormalities_detected.is_empty()
    }
}
