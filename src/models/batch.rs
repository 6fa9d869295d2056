//! Batch (spreadsheet) prediction results.
//!
//! The service runs the single-prediction contract once per uploaded row and
//! reports each row independently: a failure on one row never prevents the
//! neighbouring rows from carrying a prediction.

use serde::{Deserialize, Serialize};

use super::diagnosis::RankedPrediction;
use super::measurements::{LabResults, VitalSigns, LAB_COLUMN_PREFIX, VITAL_COLUMN_PREFIX};
use super::ModelError;

/// Row as sent by `POST /api/diagnosis/upload-csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// 1-based position in the uploaded sheet.
    pub row: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_disease: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_predictions: Option<Vec<RankedPrediction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Success {
        disease: String,
        confidence: f64,
        top_predictions: Vec<RankedPrediction>,
    },
    Failure {
        message: String,
    },
}

impl PredictionRow {
    /// Resolve the row into exactly one outcome. A row that carries both an
    /// error and a prediction, or neither, is malformed.
    pub fn outcome(&self) -> Result<RowOutcome, ModelError> {
        match (&self.error, &self.predicted_disease, self.confidence) {
            (Some(message), None, None) => Ok(RowOutcome::Failure {
                message: message.clone(),
            }),
            (None, Some(disease), Some(confidence)) => Ok(RowOutcome::Success {
                disease: disease.clone(),
                confidence,
                top_predictions: self.top_predictions.clone().unwrap_or_default(),
            }),
            (Some(_), _, _) => Err(ModelError::MalformedRow {
                row: self.row,
                reason: "carries both an error and a prediction".into(),
            }),
            (None, _, _) => Err(ModelError::MalformedRow {
                row: self.row,
                reason: "carries neither an error nor a complete prediction".into(),
            }),
        }
    }
}

/// Raw body of the batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub predictions: Vec<PredictionRow>,
    pub total_rows: usize,
}

/// One resolved batch row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub row: u32,
    pub patient_name: Option<String>,
    pub outcome: RowOutcome,
}

impl BatchRow {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RowOutcome::Success { .. })
    }
}

/// Checked batch result: one row per uploaded row, in upload order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    pub rows: Vec<BatchRow>,
    pub total_rows: usize,
}

impl BatchPrediction {
    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.rows.len() - self.succeeded()
    }
}

impl TryFrom<BatchResponse> for BatchPrediction {
    type Error = ModelError;

    fn try_from(raw: BatchResponse) -> Result<Self, Self::Error> {
        if raw.predictions.len() != raw.total_rows {
            return Err(ModelError::MalformedBatch(format!(
                "{} predictions for {} rows",
                raw.predictions.len(),
                raw.total_rows
            )));
        }

        let mut rows = Vec::with_capacity(raw.predictions.len());
        for prediction in &raw.predictions {
            let checked = if prediction.row == 0 {
                Err(ModelError::MalformedRow {
                    row: 0,
                    reason: "row numbers are 1-based".into(),
                })
            } else {
                prediction.outcome()
            };
            // A bad row stays a bad row; its neighbours keep their predictions.
            let outcome = checked.unwrap_or_else(|e| {
                tracing::warn!(row = prediction.row, error = %e, "Malformed batch row");
                RowOutcome::Failure {
                    message: e.to_string(),
                }
            });
            let patient_name = prediction
                .patient_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            rows.push(BatchRow {
                row: prediction.row,
                patient_name,
                outcome,
            });
        }

        Ok(Self {
            rows,
            total_rows: raw.total_rows,
        })
    }
}

/// Column names the batch endpoint understands, in template order.
pub fn spreadsheet_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        "first_name",
        "last_name",
        "age",
        "gender",
        "smoking",
        "alcohol",
        "symptoms",
        "symptom_duration_days",
        "existing_conditions",
        "family_history",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    columns.extend(
        VitalSigns::KEYS
            .iter()
            .map(|k| format!("{VITAL_COLUMN_PREFIX}{k}")),
    );
    columns.extend(LabResults::KEYS.iter().map(|k| format!("{LAB_COLUMN_PREFIX}{k}")));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_row_body() -> BatchResponse {
        serde_json::from_str(
            r#"{"total_rows":3,"predictions":[
                {"row":1,"patient_name":"Ravi Kumar","predicted_disease":"X","confidence":70.0,
                 "top_predictions":[{"disease":"X","confidence":70.0}]},
                {"row":2,"error":"invalid age"},
                {"row":3,"patient_name":"","predicted_disease":"Y","confidence":55.0}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn failing_row_does_not_affect_neighbours() {
        let batch = BatchPrediction::try_from(three_row_body()).unwrap();
        assert_eq!(batch.rows.len(), 3);
        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);

        assert_eq!(
            batch.rows[1].outcome,
            RowOutcome::Failure {
                message: "invalid age".into()
            }
        );
        match &batch.rows[2].outcome {
            RowOutcome::Success { disease, confidence, top_predictions } => {
                assert_eq!(disease, "Y");
                assert_eq!(*confidence, 55.0);
                assert!(top_predictions.is_empty());
            }
            other => panic!("row 3 should succeed, got {other:?}"),
        }
    }

    #[test]
    fn blank_patient_names_become_absent() {
        let batch = BatchPrediction::try_from(three_row_body()).unwrap();
        assert_eq!(batch.rows[0].patient_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(batch.rows[2].patient_name, None);
    }

    #[test]
    fn row_with_error_and_prediction_is_malformed() {
        let row = PredictionRow {
            row: 4,
            patient_name: None,
            predicted_disease: Some("Z".into()),
            confidence: Some(10.0),
            top_predictions: None,
            error: Some("boom".into()),
        };
        let err = row.outcome().unwrap_err();
        assert!(err.to_string().contains("row 4"));
    }

    #[test]
    fn row_with_nothing_is_malformed() {
        let row = PredictionRow {
            row: 1,
            patient_name: Some("A B".into()),
            predicted_disease: None,
            confidence: None,
            top_predictions: None,
            error: None,
        };
        assert!(row.outcome().is_err());
    }

    #[test]
    fn row_count_must_match_total() {
        let mut body = three_row_body();
        body.total_rows = 4;
        let err = BatchPrediction::try_from(body).unwrap_err();
        assert!(matches!(err, ModelError::MalformedBatch(_)));
    }

    #[test]
    fn template_columns_use_prefixes() {
        let columns = spreadsheet_columns();
        assert_eq!(columns[0], "first_name");
        assert!(columns.contains(&"vs_heart_rate".to_string()));
        assert!(columns.contains(&"lab_hba1c".to_string()));
        assert_eq!(columns.len(), 10 + VitalSigns::KEYS.len() + LabResults::KEYS.len());
    }

    #[test]
    fn contradictory_row_fails_alone() {
        let body: BatchResponse = serde_json::from_str(
            r#"{"total_rows":3,"predictions":[
                {"row":1,"predicted_disease":"X","confidence":70.0},
                {"row":2,"error":"invalid age","predicted_disease":"Z","confidence":12.0},
                {"row":3,"predicted_disease":"Y","confidence":55.0}
            ]}"#,
        )
        .unwrap();
        let batch = BatchPrediction::try_from(body).unwrap();
        assert_eq!(batch.rows.len(), 3);
        assert_eq!(batch.succeeded(), 2);
        assert!(batch.rows[0].is_success());
        assert!(batch.rows[2].is_success());
        match &batch.rows[1].outcome {
            RowOutcome::Failure { message } => {
                assert!(message.contains("row 2"));
                assert!(message.contains("both an error and a prediction"));
            }
            other => panic!("row 2 should fail, got {other:?}"),
        }
    }

    #[test]
    fn zero_row_number_fails_that_row_only() {
        let mut body = three_row_body();
        body.predictions[0].row = 0;
        let batch = BatchPrediction::try_from(body).unwrap();
        assert!(!batch.rows[0].is_success());
        assert_eq!(batch.succeeded(), 1);
    }
}
