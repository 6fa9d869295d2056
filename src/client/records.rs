use std::future::Future;

use super::{ClientError, ServiceClient};
use crate::models::pagination::{HistoryPage, PatientsPage};
use crate::models::{
    HistoryRecord, NewPatient, PageRequest, PaginatedList, Patient, Statistics,
    DEFAULT_PATIENT_LIMIT,
};

pub const PATIENTS_PATH: &str = "/api/patients";
pub const CREATE_PATIENT_PATH: &str = "/api/patients/";
pub const STATS_PATH: &str = "/api/patients/stats";
pub const HISTORY_PATH: &str = "/api/diagnosis/history";

/// Patients list request: a page plus optional free-text and diagnosis
/// filters. Blank filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientQuery {
    pub page: PageRequest,
    pub search: Option<String>,
    pub diagnosis: Option<String>,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            page: PageRequest::new(1, DEFAULT_PATIENT_LIMIT as i64),
            search: None,
            diagnosis: None,
        }
    }
}

impl PatientQuery {
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn diagnosis_filter(&self) -> Option<&str> {
        non_blank(self.diagnosis.as_deref())
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = page_pairs(self.page);
        if let Some(search) = self.search_term() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(diagnosis) = self.diagnosis_filter() {
            pairs.push(("diagnosis", diagnosis.to_string()));
        }
        pairs
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn page_pairs(page: PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page().to_string()),
        ("limit", page.limit().to_string()),
    ]
}

/// Stored patients and prediction history.
pub trait RecordsClient {
    fn list_patients(
        &self,
        query: &PatientQuery,
    ) -> impl Future<Output = Result<PaginatedList<Patient>, ClientError>> + Send;

    fn list_history(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<PaginatedList<HistoryRecord>, ClientError>> + Send;

    fn get_patient(&self, id: &str)
        -> impl Future<Output = Result<Patient, ClientError>> + Send;

    fn create_patient(
        &self,
        patient: &NewPatient,
    ) -> impl Future<Output = Result<Patient, ClientError>> + Send;

    fn statistics(&self) -> impl Future<Output = Result<Statistics, ClientError>> + Send;
}

impl RecordsClient for ServiceClient {
    async fn list_patients(
        &self,
        query: &PatientQuery,
    ) -> Result<PaginatedList<Patient>, ClientError> {
        let url = self.url(PATIENTS_PATH, &[])?;
        let raw: PatientsPage<Patient> = self.get_json(url, &query.query_pairs()).await?;
        let list = PaginatedList::from(raw);
        tracing::debug!(
            page = list.page,
            pages = list.pages,
            total = list.total,
            "Patients page received"
        );
        Ok(list)
    }

    async fn list_history(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedList<HistoryRecord>, ClientError> {
        let url = self.url(HISTORY_PATH, &[])?;
        let raw: HistoryPage<HistoryRecord> = self.get_json(url, &page_pairs(page)).await?;
        let list = PaginatedList::from(raw);
        tracing::debug!(
            page = list.page,
            pages = list.pages,
            total = list.total,
            "History page received"
        );
        Ok(list)
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ClientError> {
        let url = self.url(PATIENTS_PATH, &[id])?;
        self.get_json(url, &[]).await
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, ClientError> {
        let url = self.url(CREATE_PATIENT_PATH, &[])?;
        let created: Patient = self.post_json(url, Some(patient)).await?;
        tracing::info!(patient_id = ?created.display_id(), "Patient created");
        Ok(created)
    }

    async fn statistics(&self) -> Result<Statistics, ClientError> {
        let url = self.url(STATS_PATH, &[])?;
        self.get_json(url, &[]).await
    }
}
