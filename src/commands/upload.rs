//! Batch upload and image analysis commands.

use std::path::Path;

use crate::client::{PredictionClient, UploadFile, ANALYSIS_FAILED, UPLOAD_FAILED};
use crate::models::{BatchPrediction, ImageAnalysisResult, ImageType, RowOutcome};
use crate::workflow::{ImageAnalysisWorkflow, SubmitOutcome, UploadWorkflow, WorkflowState};

pub async fn upload<C: PredictionClient>(client: &C, path: &Path) -> Result<String, String> {
    let file = UploadFile::from_path(path)
        .await
        .map_err(|e| e.to_string())?;
    let workflow = UploadWorkflow::new();
    workflow.select_file(file).map_err(|e| e.to_string())?;

    let outcome = workflow.submit(client).await;
    finish(outcome, workflow.state(), UPLOAD_FAILED).map(|batch| render_batch(&batch))
}

pub async fn analyze<C: PredictionClient>(
    client: &C,
    path: &Path,
    image_type: ImageType,
) -> Result<String, String> {
    let file = UploadFile::from_path(path)
        .await
        .map_err(|e| e.to_string())?;
    let workflow = ImageAnalysisWorkflow::new();
    workflow.select_image(file).map_err(|e| e.to_string())?;
    workflow.set_image_type(image_type);

    let outcome = workflow.submit(client).await;
    finish(outcome, workflow.state(), ANALYSIS_FAILED).map(|result| render_analysis(&result))
}

fn finish<T>(outcome: SubmitOutcome, state: WorkflowState<T>, fallback: &str) -> Result<T, String> {
    match (outcome, state) {
        (SubmitOutcome::Succeeded, WorkflowState::Success(value)) => Ok(value),
        (SubmitOutcome::Rejected(err), _) => Err(err.to_string()),
        (SubmitOutcome::Ignored, _) => Err("A submission is already in progress".to_string()),
        (_, WorkflowState::Failed(message)) => Err(message),
        _ => Err(fallback.to_string()),
    }
}

pub fn render_batch(batch: &BatchPrediction) -> String {
    let mut out = format!(
        "Processed {} rows ({} succeeded, {} failed)\n",
        batch.total_rows,
        batch.succeeded(),
        batch.failed()
    );
    for row in &batch.rows {
        let name = row.patient_name.as_deref().unwrap_or("-");
        match &row.outcome {
            RowOutcome::Success {
                disease,
                confidence,
                ..
            } => out.push_str(&format!(
                "  #{:<4} {:<24} {:<28} {confidence}%\n",
                row.row, name, disease
            )),
            RowOutcome::Failure { message } => out.push_str(&format!(
                "  #{:<4} {:<24} error: {message}\n",
                row.row, name
            )),
        }
    }
    out.trim_end().to_string()
}

pub fn render_analysis(result: &ImageAnalysisResult) -> String {
    let mut out = format!(
        "Image type: {}\nConfidence: {}%\nFindings: {}\n",
        result.image_type, result.confidence, result.findings
    );
    if result.has_abnormalities() {
        out.push_str("Abnormalities:\n");
        for finding in &result.abnormalities_detected {
            out.push_str(&format!("  - {finding}\n"));
        }
    } else {
        out.push_str("Abnormalities: none detected\n");
    }
    out.push_str(&format!("Recommendation: {}", result.recommendation));
    out
}
