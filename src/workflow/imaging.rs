use std::sync::{Mutex, PoisonError};

use tracing::Instrument;
use uuid::Uuid;

use super::{SubmitOutcome, Workflow, WorkflowState};
use crate::client::{PredictionClient, RequestFailure, UploadFile};
use crate::models::{ImageAnalysisResult, ImageType, ValidationError};

#[derive(Default)]
struct Selection {
    file: Option<UploadFile>,
    image_type: ImageType,
}

/// Image analysis page: one image plus its modality.
#[derive(Default)]
pub struct ImageAnalysisWorkflow {
    selection: Mutex<Selection>,
    flow: Workflow<ImageAnalysisResult>,
}

impl ImageAnalysisWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_image(&self, file: UploadFile) -> Result<(), ValidationError> {
        if !file.is_image() {
            return Err(ValidationError::UnsupportedFile(file.file_name));
        }
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .file = Some(file);
        Ok(())
    }

    pub fn set_image_type(&self, image_type: ImageType) {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .image_type = image_type;
    }

    pub fn image_type(&self) -> ImageType {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .image_type
    }

    pub fn state(&self) -> WorkflowState<ImageAnalysisResult> {
        self.flow.state()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.flow.validation_message()
    }

    pub async fn submit<C: PredictionClient>(&self, client: &C) -> SubmitOutcome {
        if self.flow.is_submitting() {
            tracing::debug!("Analysis already in flight, ignoring submit");
            return SubmitOutcome::Ignored;
        }
        let (file, image_type) = {
            let selection = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
            (selection.file.clone(), selection.image_type)
        };
        let Some(file) = file else {
            return self.flow.reject(ValidationError::NoFileSelected);
        };
        let Some(in_flight) = self.flow.begin() else {
            return SubmitOutcome::Ignored;
        };

        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "image_analysis",
            %submission_id,
            image_type = image_type.label()
        );
        async move {
            match client.analyze_image(&file, image_type).await {
                Ok(result) => in_flight.succeed(result),
                Err(err) => {
                    tracing::warn!(error = %err, "Image analysis failed");
                    in_flight.fail(RequestFailure::analysis(&err).message().to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}
