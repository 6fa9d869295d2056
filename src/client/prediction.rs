use std::future::Future;

use reqwest::multipart::Form;

use super::{ClientError, ServiceClient, UploadFile};
use crate::models::{
    BatchPrediction, BatchResponse, DiagnosisRequest, DiagnosisResponse, DiseaseVocabulary,
    ImageAnalysisResult, ImageType, SymptomVocabulary,
};

pub const PREDICT_PATH: &str = "/api/diagnosis/predict";
pub const BATCH_PATH: &str = "/api/diagnosis/upload-csv";
pub const ANALYZE_IMAGE_PATH: &str = "/api/diagnosis/analyze-image";
pub const SYMPTOMS_PATH: &str = "/api/diagnosis/symptoms";
pub const DISEASES_PATH: &str = "/api/diagnosis/diseases";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the image modality.
pub const IMAGE_TYPE_FIELD: &str = "image_type";

/// Prediction operations. Every call is a fresh round trip.
pub trait PredictionClient {
    fn predict_single(
        &self,
        request: &DiagnosisRequest,
    ) -> impl Future<Output = Result<DiagnosisResponse, ClientError>> + Send;

    /// Upload a spreadsheet and get one prediction per row. The file is
    /// forwarded as-is.
    fn predict_batch(
        &self,
        file: &UploadFile,
    ) -> impl Future<Output = Result<BatchPrediction, ClientError>> + Send;

    fn analyze_image(
        &self,
        file: &UploadFile,
        image_type: ImageType,
    ) -> impl Future<Output = Result<ImageAnalysisResult, ClientError>> + Send;

    fn symptom_vocabulary(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    fn disease_vocabulary(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;
}

impl PredictionClient for ServiceClient {
    async fn predict_single(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<DiagnosisResponse, ClientError> {
        let url = self.url(PREDICT_PATH, &[])?;
        let response: DiagnosisResponse = self.post_json(url, Some(request)).await?;
        tracing::info!(
            disease = %response.predicted_disease,
            confidence = response.confidence,
            candidates = response.top_predictions.len(),
            "Prediction received"
        );
        if !response.is_ranked() {
            tracing::warn!("Ranked predictions are not in descending confidence order");
        }
        Ok(response)
    }

    async fn predict_batch(&self, file: &UploadFile) -> Result<BatchPrediction, ClientError> {
        let url = self.url(BATCH_PATH, &[])?;
        let form = Form::new().part(FILE_FIELD, file.to_part()?);
        let raw: BatchResponse = self.post_multipart(url, form).await?;
        let batch = BatchPrediction::try_from(raw)?;
        tracing::info!(
            file_name = %file.file_name,
            total_rows = batch.total_rows,
            failed = batch.failed(),
            "Batch prediction received"
        );
        Ok(batch)
    }

    async fn analyze_image(
        &self,
        file: &UploadFile,
        image_type: ImageType,
    ) -> Result<ImageAnalysisResult, ClientError> {
        let url = self.url(ANALYZE_IMAGE_PATH, &[])?;
        let form = Form::new()
            .part(FILE_FIELD, file.to_part()?)
            .text(IMAGE_TYPE_FIELD, image_type.as_str());
        let result: ImageAnalysisResult = self.post_multipart(url, form).await?;
        tracing::info!(
            image_type = %image_type,
            abnormalities = result.abnormalities_detected.len(),
            "Image analysis received"
        );
        Ok(result)
    }

    async fn symptom_vocabulary(&self) -> Result<Vec<String>, ClientError> {
        let url = self.url(SYMPTOMS_PATH, &[])?;
        let body: SymptomVocabulary = self.get_json(url, &[]).await?;
        Ok(body.symptoms)
    }

    async fn disease_vocabulary(&self) -> Result<Vec<String>, ClientError> {
        let url = self.url(DISEASES_PATH, &[])?;
        let body: DiseaseVocabulary = self.get_json(url, &[]).await?;
        Ok(body.diseases)
    }
}
