use std::sync::{Mutex, PoisonError};

use tracing::Instrument;
use uuid::Uuid;

use super::{SubmitOutcome, Workflow, WorkflowState};
use crate::client::{PredictionClient, RequestFailure, UploadFile};
use crate::models::{BatchPrediction, ValidationError};

/// Batch upload page: one selected spreadsheet, one batch result.
#[derive(Default)]
pub struct UploadWorkflow {
    file: Mutex<Option<UploadFile>>,
    flow: Workflow<BatchPrediction>,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the file to upload. Only `.csv`, `.xlsx` and `.xls` are taken;
    /// anything else leaves the current selection in place.
    pub fn select_file(&self, file: UploadFile) -> Result<(), ValidationError> {
        if !file.is_spreadsheet() {
            return Err(ValidationError::UnsupportedFile(file.file_name));
        }
        tracing::debug!(file_name = %file.file_name, size_kb = file.size_kb(), "File selected");
        *self.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
        Ok(())
    }

    pub fn selected_file(&self) -> Option<UploadFile> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> WorkflowState<BatchPrediction> {
        self.flow.state()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.flow.validation_message()
    }

    pub async fn submit<C: PredictionClient>(&self, client: &C) -> SubmitOutcome {
        if self.flow.is_submitting() {
            tracing::debug!("Upload already in flight, ignoring submit");
            return SubmitOutcome::Ignored;
        }
        let Some(file) = self.selected_file() else {
            return self.flow.reject(ValidationError::NoFileSelected);
        };
        let Some(in_flight) = self.flow.begin() else {
            return SubmitOutcome::Ignored;
        };

        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("batch_upload", %submission_id, file_name = %file.file_name);
        async move {
            match client.predict_batch(&file).await {
                Ok(batch) => {
                    tracing::info!(
                        succeeded = batch.succeeded(),
                        failed = batch.failed(),
                        "Batch upload complete"
                    );
                    in_flight.succeed(batch)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Batch upload failed");
                    in_flight.fail(RequestFailure::upload(&err).message().to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}
