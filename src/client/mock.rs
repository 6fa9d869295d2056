//! In-memory stand-in for the prediction service.
//!
//! Implements every client trait so workflows and commands can be exercised
//! without a network. Responses are configured up front with the `with_*`
//! builders; failures can be switched on and off at any time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{AdminClient, ClientError, PatientQuery, PredictionClient, RecordsClient, UploadFile};
use crate::models::{
    BatchPrediction, DiagnosisRequest, DiagnosisResponse, HistoryRecord, ImageAnalysisResult,
    ImageType, NewPatient, PageRequest, PaginatedList, Patient, SeedOutcome, ServiceHealth,
    Statistics, TrainingOutcome,
};

// ═══════════════════════════════════════════════════════════
// Canned failures
// ═══════════════════════════════════════════════════════════

/// How every mock call fails while a failure is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Service { status: u16, detail: Option<String> },
    Unreachable,
}

impl MockFailure {
    fn to_error(&self) -> ClientError {
        match self {
            MockFailure::Service { status, detail } => ClientError::Service {
                status: *status,
                detail: detail.clone(),
            },
            MockFailure::Unreachable => {
                ClientError::Connection("http://mock.invalid".to_string())
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Mock client
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockServiceClient {
    prediction: Option<DiagnosisResponse>,
    batch: Option<BatchPrediction>,
    analysis: Option<ImageAnalysisResult>,
    patients: Mutex<Vec<Patient>>,
    history: Vec<HistoryRecord>,
    symptoms: Vec<String>,
    diseases: Vec<String>,
    stats: Option<Statistics>,
    failure: Mutex<Option<MockFailure>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<DiagnosisRequest>>,
    last_upload: Mutex<Option<(String, Option<ImageType>)>>,
    last_patient_query: Mutex<Option<PatientQuery>>,
}

impl MockServiceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(mut self, response: DiagnosisResponse) -> Self {
        self.prediction = Some(response);
        self
    }

    pub fn with_batch(mut self, batch: BatchPrediction) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn with_analysis(mut self, result: ImageAnalysisResult) -> Self {
        self.analysis = Some(result);
        self
    }

    pub fn with_patients(mut self, patients: Vec<Patient>) -> Self {
        self.patients = Mutex::new(patients);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryRecord>) -> Self {
        self.history = history;
        self
    }

    pub fn with_vocabulary(mut self, symptoms: Vec<String>, diseases: Vec<String>) -> Self {
        self.symptoms = symptoms;
        self.diseases = diseases;
        self
    }

    pub fn with_stats(mut self, stats: Statistics) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Every call answers with a non-2xx status.
    pub fn failing_with(self, status: u16, detail: Option<&str>) -> Self {
        self.set_failure(Some(MockFailure::Service {
            status,
            detail: detail.map(str::to_string),
        }));
        self
    }

    /// Every call fails as if the service were down.
    pub fn unreachable(self) -> Self {
        self.set_failure(Some(MockFailure::Unreachable));
        self
    }

    /// Each call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failure(&self, failure: Option<MockFailure>) {
        if let Ok(mut current) = self.failure.lock() {
            *current = failure;
        }
    }

    /// Number of calls that reached the mock.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DiagnosisRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    /// File name and image type of the last upload.
    pub fn last_upload(&self) -> Option<(String, Option<ImageType>)> {
        self.last_upload.lock().ok().and_then(|u| u.clone())
    }

    pub fn last_patient_query(&self) -> Option<PatientQuery> {
        self.last_patient_query.lock().ok().and_then(|q| q.clone())
    }

    /// Count the call, wait out the delay, then report the configured
    /// failure if any.
    async fn enter(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failure.lock().ok().and_then(|f| f.clone());
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn record_upload(&self, file: &UploadFile, image_type: Option<ImageType>) {
        if let Ok(mut last) = self.last_upload.lock() {
            *last = Some((file.file_name.clone(), image_type));
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Query matching
// ═══════════════════════════════════════════════════════════

fn not_configured(what: &str) -> ClientError {
    ClientError::Service {
        status: 404,
        detail: Some(format!("{what} not configured")),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_query(patient: &Patient, query: &PatientQuery) -> bool {
    let search_ok = query.search_term().map_or(true, |term| {
        contains_ci(&patient.first_name, term)
            || contains_ci(&patient.last_name, term)
            || patient
                .patient_id
                .as_deref()
                .is_some_and(|id| contains_ci(id, term))
    });
    let diagnosis_ok = query.diagnosis_filter().map_or(true, |wanted| {
        patient
            .diagnosis
            .as_deref()
            .is_some_and(|d| contains_ci(d, wanted))
    });
    search_ok && diagnosis_ok
}

// ═══════════════════════════════════════════════════════════
// Trait impls
// ═══════════════════════════════════════════════════════════

impl PredictionClient for MockServiceClient {
    async fn predict_single(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<DiagnosisResponse, ClientError> {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        self.enter().await?;
        self.prediction
            .clone()
            .ok_or_else(|| not_configured("Prediction"))
    }

    async fn predict_batch(&self, file: &UploadFile) -> Result<BatchPrediction, ClientError> {
        self.record_upload(file, None);
        self.enter().await?;
        self.batch.clone().ok_or_else(|| not_configured("Batch"))
    }

    async fn analyze_image(
        &self,
        file: &UploadFile,
        image_type: ImageType,
    ) -> Result<ImageAnalysisResult, ClientError> {
        self.record_upload(file, Some(image_type));
        self.enter().await?;
        self.analysis
            .clone()
            .ok_or_else(|| not_configured("Analysis"))
    }

    async fn symptom_vocabulary(&self) -> Result<Vec<String>, ClientError> {
        self.enter().await?;
        Ok(self.symptoms.clone())
    }

    async fn disease_vocabulary(&self) -> Result<Vec<String>, ClientError> {
        self.enter().await?;
        Ok(self.diseases.clone())
    }
}

impl RecordsClient for MockServiceClient {
    async fn list_patients(
        &self,
        query: &PatientQuery,
    ) -> Result<PaginatedList<Patient>, ClientError> {
        if let Ok(mut last) = self.last_patient_query.lock() {
            *last = Some(query.clone());
        }
        self.enter().await?;
        let matching: Vec<Patient> = self
            .patients
            .lock()
            .map(|all| {
                all.iter()
                    .filter(|p| matches_query(p, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(PaginatedList::from_slice(&matching, query.page))
    }

    async fn list_history(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedList<HistoryRecord>, ClientError> {
        self.enter().await?;
        Ok(PaginatedList::from_slice(&self.history, page))
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ClientError> {
        self.enter().await?;
        let found = self.patients.lock().ok().and_then(|all| {
            all.iter()
                .find(|p| p.id.as_deref() == Some(id) || p.patient_id.as_deref() == Some(id))
                .cloned()
        });
        found.ok_or_else(|| ClientError::Service {
            status: 404,
            detail: Some("Patient not found".to_string()),
        })
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, ClientError> {
        self.enter().await?;
        let created = Patient::from_new(uuid::Uuid::new_v4().to_string(), patient.clone());
        if let Ok(mut all) = self.patients.lock() {
            all.push(created.clone());
        }
        Ok(created)
    }

    async fn statistics(&self) -> Result<Statistics, ClientError> {
        self.enter().await?;
        self.stats
            .clone()
            .ok_or_else(|| not_configured("Statistics"))
    }
}

impl AdminClient for MockServiceClient {
    async fn health(&self) -> Result<ServiceHealth, ClientError> {
        self.enter().await?;
        Ok(ServiceHealth {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            ml_model: if self.prediction.is_some() {
                "loaded".to_string()
            } else {
                "not loaded".to_string()
            },
        })
    }

    async fn seed(&self) -> Result<SeedOutcome, ClientError> {
        self.enter().await?;
        let count = self.patients.lock().map(|all| all.len() as u64).unwrap_or(0);
        Ok(SeedOutcome {
            message: format!("Seeded {count} patients"),
            count,
        })
    }

    async fn train(&self) -> Result<TrainingOutcome, ClientError> {
        self.enter().await?;
        Ok(TrainingOutcome {
            message: "Model trained successfully".to_string(),
            accuracy: 0.0,
            n_classes: self.diseases.len() as u32,
            classes: self.diseases.clone(),
            n_samples: self.history.len() as u64,
        })
    }
}
