//! Paginated list pages: patients and diagnosis history.
//!
//! A failed load is logged and the page already on display stays there.
//! When loads overlap, only the most recently issued one is applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::client::{ClientError, PatientQuery, RecordsClient};
use crate::models::{
    HistoryRecord, PageRequest, PaginatedList, Patient, DEFAULT_HISTORY_LIMIT,
};

// ═══════════════════════════════════════════════════════════
// Shared list state
// ═══════════════════════════════════════════════════════════

struct ListState<T> {
    current: Mutex<Option<PaginatedList<T>>>,
    last_error: Mutex<Option<String>>,
    generation: AtomicU64,
}

impl<T: Clone> ListState<T> {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
            last_error: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    fn issue(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a finished load. Returns whether it was applied and succeeded.
    fn apply(
        &self,
        ticket: u64,
        list_name: &'static str,
        result: Result<PaginatedList<T>, ClientError>,
    ) -> bool {
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(list = list_name, "Discarding superseded page");
            return false;
        }
        match result {
            Ok(list) => {
                *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(list);
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
                true
            }
            Err(err) => {
                tracing::warn!(list = list_name, error = %err, "Failed to load page");
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(err.to_string());
                false
            }
        }
    }

    fn current(&self) -> Option<PaginatedList<T>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

/// Patients page: search and diagnosis filters over a paginated list.
pub struct PatientsView {
    query: Mutex<PatientQuery>,
    list: ListState<Patient>,
}

impl Default for PatientsView {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientsView {
    pub fn new() -> Self {
        Self {
            query: Mutex::new(PatientQuery::default()),
            list: ListState::new(),
        }
    }

    pub fn query(&self) -> PatientQuery {
        self.query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_query(&self, f: impl FnOnce(&mut PatientQuery)) {
        f(&mut self.query.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Changing a filter goes back to page 1.
    pub fn set_search(&self, term: Option<String>) {
        self.update_query(|q| {
            q.search = term;
            q.page = q.page.with_page(1);
        });
    }

    pub fn set_diagnosis_filter(&self, diagnosis: Option<String>) {
        self.update_query(|q| {
            q.diagnosis = diagnosis;
            q.page = q.page.with_page(1);
        });
    }

    pub fn set_page(&self, page: i64) {
        self.update_query(|q| q.page = q.page.with_page(page));
    }

    pub fn set_limit(&self, limit: i64) {
        self.update_query(|q| q.page = PageRequest::new(1, limit));
    }

    pub fn current(&self) -> Option<PaginatedList<Patient>> {
        self.list.current()
    }

    pub fn last_error(&self) -> Option<String> {
        self.list.last_error()
    }

    pub async fn refresh<C: RecordsClient>(&self, client: &C) -> bool {
        self.load(client, self.query()).await
    }

    async fn load<C: RecordsClient>(&self, client: &C, query: PatientQuery) -> bool {
        let ticket = self.list.issue();
        let result = client.list_patients(&query).await;
        self.list.apply(ticket, "patients", result)
    }

    /// Load `page` and keep it as the current page only if the load lands.
    async fn step_to<C: RecordsClient>(&self, client: &C, page: i64) -> bool {
        let mut query = self.query();
        query.page = query.page.with_page(page);
        let target = query.page;
        let loaded = self.load(client, query).await;
        if loaded {
            self.update_query(|q| q.page = target);
        }
        loaded
    }

    /// Move to the next page if there is one, then load it.
    pub async fn next_page<C: RecordsClient>(&self, client: &C) -> bool {
        match self.current() {
            Some(list) if list.has_next() => self.step_to(client, list.page as i64 + 1).await,
            _ => false,
        }
    }

    pub async fn previous_page<C: RecordsClient>(&self, client: &C) -> bool {
        match self.current() {
            Some(list) if list.has_previous() => {
                self.step_to(client, list.page as i64 - 1).await
            }
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// History
// ═══════════════════════════════════════════════════════════

/// Diagnosis history page.
pub struct HistoryView {
    page: Mutex<PageRequest>,
    list: ListState<HistoryRecord>,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryView {
    pub fn new() -> Self {
        Self::with_page(PageRequest::new(1, DEFAULT_HISTORY_LIMIT as i64))
    }

    pub fn with_page(page: PageRequest) -> Self {
        Self {
            page: Mutex::new(page),
            list: ListState::new(),
        }
    }

    pub fn page(&self) -> PageRequest {
        *self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_page(&self, page: i64) {
        let mut current = self.page.lock().unwrap_or_else(PoisonError::into_inner);
        *current = current.with_page(page);
    }

    pub fn current(&self) -> Option<PaginatedList<HistoryRecord>> {
        self.list.current()
    }

    pub fn last_error(&self) -> Option<String> {
        self.list.last_error()
    }

    pub async fn refresh<C: RecordsClient>(&self, client: &C) -> bool {
        self.load(client, self.page()).await
    }

    async fn load<C: RecordsClient>(&self, client: &C, page: PageRequest) -> bool {
        let ticket = self.list.issue();
        let result = client.list_history(page).await;
        self.list.apply(ticket, "history", result)
    }

    /// The page only advances once the next one has loaded.
    pub async fn next_page<C: RecordsClient>(&self, client: &C) -> bool {
        match self.current() {
            Some(list) if list.has_next() => {
                let target = self.page().with_page(list.page as i64 + 1);
                let loaded = self.load(client, target).await;
                if loaded {
                    *self.page.lock().unwrap_or_else(PoisonError::into_inner) = target;
                }
                loaded
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockFailure, MockServiceClient};
    use crate::models::{Gender, NewPatient};

    fn records(n: usize) -> Vec<HistoryRecord> {
        (1..=n)
            .map(|i| HistoryRecord {
                id: format!("h{i}"),
                age: 40,
                gender: "female".into(),
                symptoms: vec!["fatigue".into()],
                diagnosis: "Anemia".into(),
                confidence: 61.0,
                ai_suggestion: None,
                root_cause: None,
                created_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
            })
            .collect()
    }

    fn patients(n: usize) -> Vec<Patient> {
        (1..=n)
            .map(|i| {
                let mut p = Patient::from_new(
                    format!("id{i}"),
                    NewPatient {
                        first_name: format!("Patient{i}"),
                        last_name: if i % 2 == 0 { "Iyer" } else { "Das" }.into(),
                        age: 20 + i as u32,
                        gender: Gender::Other,
                        ..Default::default()
                    },
                );
                p.diagnosis = Some("Malaria".into());
                p
            })
            .collect()
    }

    #[tokio::test]
    async fn history_second_page_of_twenty() {
        let client = MockServiceClient::new().with_history(records(20));
        let view = HistoryView::with_page(PageRequest::new(2, 15));
        assert!(view.refresh(&client).await);

        let list = view.current().unwrap();
        assert_eq!(list.items.len(), 5);
        assert_eq!(list.pages, 2);
        assert!(!view.next_page(&client).await);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_page() {
        let client = MockServiceClient::new().with_history(records(20));
        let view = HistoryView::new();
        assert!(view.refresh(&client).await);
        let before = view.current().unwrap();

        client.set_failure(Some(MockFailure::Service {
            status: 500,
            detail: Some("database unavailable".into()),
        }));
        assert!(!view.next_page(&client).await);

        assert_eq!(view.current().unwrap(), before);
        assert!(view.last_error().unwrap().contains("database unavailable"));
        assert_eq!(view.page().page(), 1);
    }

    #[tokio::test]
    async fn failed_step_then_refresh_stays_on_shown_page() {
        let client = MockServiceClient::new().with_patients(patients(45));
        let view = PatientsView::new();
        assert!(view.refresh(&client).await);

        client.set_failure(Some(MockFailure::Unreachable));
        assert!(!view.next_page(&client).await);
        assert_eq!(view.query().page.page(), 1);
        assert_eq!(view.current().unwrap().page, 1);

        client.set_failure(None);
        assert!(view.refresh(&client).await);
        assert_eq!(view.current().unwrap().page, 1);
        assert_eq!(client.last_patient_query().map(|q| q.page.page()), Some(1));

        assert!(view.next_page(&client).await);
        assert_eq!(view.query().page.page(), 2);
    }

    #[tokio::test]
    async fn filter_change_resets_page() {
        let client = MockServiceClient::new().with_patients(patients(45));
        let view = PatientsView::new();
        view.set_page(3);
        assert!(view.refresh(&client).await);
        assert_eq!(view.current().unwrap().items.len(), 5);

        view.set_search(Some("iyer".into()));
        assert_eq!(view.query().page.page(), 1);
        assert!(view.refresh(&client).await);
        let list = view.current().unwrap();
        assert_eq!(list.total, 22);
        assert_eq!(list.pages, 2);

        view.set_diagnosis_filter(Some("dengue".into()));
        view.refresh(&client).await;
        let list = view.current().unwrap();
        assert!(list.items.is_empty());
        assert_eq!(list.pages, 0);
    }

    #[tokio::test]
    async fn paging_forward_and_back() {
        let client = MockServiceClient::new().with_patients(patients(45));
        let view = PatientsView::new();
        view.refresh(&client).await;
        assert!(!view.previous_page(&client).await);
        assert!(view.next_page(&client).await);
        assert_eq!(view.current().unwrap().page, 2);
        assert!(view.previous_page(&client).await);
        assert_eq!(view.current().unwrap().page, 1);
        assert_eq!(
            client.last_patient_query().map(|q| q.page.page()),
            Some(1)
        );
    }
}
