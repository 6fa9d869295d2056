use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use super::{SubmitOutcome, Workflow, WorkflowState};
use crate::client::{PredictionClient, RequestFailure};
use crate::models::{validate_diagnosis_request, DiagnosisForm, DiagnosisResponse};

/// Single-patient diagnosis page: form state plus one prediction at a time.
#[derive(Default)]
pub struct DiagnosisWorkflow {
    form: Mutex<DiagnosisForm>,
    flow: Workflow<DiagnosisResponse>,
}

impl DiagnosisWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit the form. Never touches the displayed result or error.
    pub fn edit<R>(&self, f: impl FnOnce(&mut DiagnosisForm) -> R) -> R {
        f(&mut self.form.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn form(&self) -> DiagnosisForm {
        self.form
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> WorkflowState<DiagnosisResponse> {
        self.flow.state()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.flow.validation_message()
    }

    pub fn summary(&self) -> Option<DiagnosisSummary> {
        self.state().result().map(DiagnosisSummary::from_response)
    }

    /// Validate the form and, if it holds, send one prediction request.
    pub async fn submit<C: PredictionClient>(&self, client: &C) -> SubmitOutcome {
        if self.flow.is_submitting() {
            tracing::debug!("Prediction already in flight, ignoring submit");
            return SubmitOutcome::Ignored;
        }

        let request = match validate_diagnosis_request(self.form().to_request()) {
            Ok(request) => request,
            Err(err) => return self.flow.reject(err),
        };

        let Some(in_flight) = self.flow.begin() else {
            return SubmitOutcome::Ignored;
        };

        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("diagnosis_submit", %submission_id);
        async move {
            tracing::info!(
                symptoms = request.symptoms.len(),
                has_vitals = request.vital_signs.is_some(),
                has_labs = request.lab_results.is_some(),
                "Submitting diagnosis request"
            );
            match client.predict_single(&request).await {
                Ok(response) => in_flight.succeed(response),
                Err(err) => {
                    let failure = RequestFailure::prediction(&err);
                    tracing::warn!(error = %err, "Diagnosis request failed");
                    in_flight.fail(failure.message().to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// One row of the differential, ready to print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferentialRow {
    pub disease: String,
    pub confidence: String,
}

/// Display form of a prediction. Rows follow the service's ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisSummary {
    pub primary: String,
    pub confidence: String,
    pub differential: Vec<DifferentialRow>,
    pub ai_suggestion: Option<String>,
    pub root_cause: Option<String>,
    pub recommended_tests: Vec<String>,
    pub recommended_treatments: Vec<String>,
}

impl DiagnosisSummary {
    pub fn from_response(response: &DiagnosisResponse) -> Self {
        Self {
            primary: response.predicted_disease.clone(),
            confidence: confidence_label(response.confidence),
            differential: response
                .top_predictions
                .iter()
                .map(|p| DifferentialRow {
                    disease: p.disease.clone(),
                    confidence: confidence_label(p.confidence),
                })
                .collect(),
            ai_suggestion: response.ai_suggestion.clone(),
            root_cause: response.root_cause.clone(),
            recommended_tests: response.recommended_tests.clone(),
            recommended_treatments: response.recommended_treatments.clone(),
        }
    }
}

/// `82.0` → `"82%"`, `82.4` → `"82.4%"`. The value is shown as received.
pub fn confidence_label(confidence: f64) -> String {
    format!("{confidence}%")
}
