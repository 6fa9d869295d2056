//! Patients, history and statistics commands.

use clap::Args;

use crate::client::RecordsClient;
use crate::models::{
    HistoryRecord, PageRequest, PaginatedList, Patient, Statistics, DEFAULT_HISTORY_LIMIT,
    DEFAULT_PATIENT_LIMIT,
};
use crate::workflow::{HistoryView, PatientsView};

// ═══════════════════════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Args)]
pub struct PatientsArgs {
    #[arg(long, default_value_t = 1)]
    pub page: i64,

    #[arg(long, default_value_t = DEFAULT_PATIENT_LIMIT as i64)]
    pub limit: i64,

    /// Match against name or patient id
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 1)]
    pub page: i64,

    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT as i64)]
    pub limit: i64,
}

// ═══════════════════════════════════════════════════════════
// Handlers
// ═══════════════════════════════════════════════════════════

pub async fn patients<C: RecordsClient>(client: &C, args: &PatientsArgs) -> Result<String, String> {
    let view = PatientsView::new();
    view.set_limit(args.limit);
    view.set_search(args.search.clone());
    view.set_diagnosis_filter(args.diagnosis.clone());
    view.set_page(args.page);

    if !view.refresh(client).await {
        return Err(view
            .last_error()
            .unwrap_or_else(|| "Failed to load patients".to_string()));
    }
    view.current()
        .map(|list| render_patients(&list))
        .ok_or_else(|| "Failed to load patients".to_string())
}

pub async fn patient<C: RecordsClient>(client: &C, id: &str) -> Result<String, String> {
    let patient = client
        .get_patient(id)
        .await
        .map_err(|e| e.user_message("Failed to load patient"))?;
    Ok(render_patient(&patient))
}

pub async fn history<C: RecordsClient>(client: &C, args: &HistoryArgs) -> Result<String, String> {
    let view = HistoryView::with_page(PageRequest::new(args.page, args.limit));
    if !view.refresh(client).await {
        return Err(view
            .last_error()
            .unwrap_or_else(|| "Failed to load history".to_string()));
    }
    view.current()
        .map(|list| render_history(&list))
        .ok_or_else(|| "Failed to load history".to_string())
}

pub async fn stats<C: RecordsClient>(client: &C) -> Result<String, String> {
    let stats = client
        .statistics()
        .await
        .map_err(|e| e.user_message("Failed to load statistics"))?;
    Ok(render_stats(&stats))
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

fn page_footer<T>(list: &PaginatedList<T>, noun: &str) -> String {
    if list.pages == 0 {
        format!("No {noun} found")
    } else {
        format!("Page {} of {} ({} {noun})", list.page, list.pages, list.total)
    }
}

pub fn render_patients(list: &PaginatedList<Patient>) -> String {
    let mut out = String::new();
    for p in &list.items {
        out.push_str(&format!(
            "{:<12} {:<24} {:>3} {:<7} {:<14} {}\n",
            p.display_id().unwrap_or("-"),
            p.full_name(),
            p.age,
            p.gender,
            p.country,
            p.diagnosis.as_deref().unwrap_or("-")
        ));
    }
    out.push_str(&page_footer(list, "patients"));
    out
}

pub fn render_history(list: &PaginatedList<HistoryRecord>) -> String {
    let mut out = String::new();
    for r in &list.items {
        out.push_str(&format!(
            "{}  {:>3} {:<7} {:<28} {:>6}%  {}\n",
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.age,
            r.gender,
            r.diagnosis,
            r.confidence,
            r.symptoms.join(", ")
        ));
    }
    out.push_str(&page_footer(list, "records"));
    out
}

pub fn render_patient(p: &Patient) -> String {
    let mut lines = vec![
        format!("{} ({})", p.full_name(), p.display_id().unwrap_or("-")),
        format!("Age {} · {}", p.age, p.gender),
    ];
    let location: Vec<&str> = [p.city.as_deref(), p.state.as_deref(), Some(p.country.as_str())]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if !location.is_empty() {
        lines.push(format!("Location: {}", location.join(", ")));
    }
    if let Some(group) = &p.blood_group {
        lines.push(format!("Blood group: {group}"));
    }
    let lists = [
        ("Symptoms", &p.symptoms),
        ("Existing conditions", &p.existing_conditions),
        ("Family history", &p.family_history),
        ("Medications", &p.current_medications),
        ("Allergies", &p.allergies),
    ];
    for (label, values) in lists {
        if !values.is_empty() {
            lines.push(format!("{label}: {}", values.join(", ")));
        }
    }
    if let Some(vitals) = &p.vital_signs {
        for (key, value) in vitals.measured() {
            lines.push(format!("  {key}: {value}"));
        }
    }
    if let Some(diagnosis) = &p.diagnosis {
        let severity = p
            .severity
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        lines.push(format!("Diagnosis: {diagnosis}{severity}"));
    }
    if let Some(treatment) = &p.treatment {
        lines.push(format!("Treatment: {treatment}"));
    }
    lines.join("\n")
}

pub fn render_stats(stats: &Statistics) -> String {
    let mut out = format!("Total patients: {}\n", stats.total_patients);
    out.push_str("Top diagnoses:\n");
    for d in stats.top_diagnoses(10) {
        out.push_str(&format!("  {:<28} {}\n", d.disease, d.count));
    }
    if !stats.severity_distribution.is_empty() {
        let parts: Vec<String> = stats
            .severity_distribution
            .iter()
            .map(|s| format!("{} {}", s.severity, s.count))
            .collect();
        out.push_str(&format!("Severity: {}\n", parts.join(", ")));
    }
    if !stats.gender_distribution.is_empty() {
        let parts: Vec<String> = stats
            .gender_distribution
            .iter()
            .map(|g| format!("{} {}", g.gender, g.count))
            .collect();
        out.push_str(&format!("Gender: {}\n", parts.join(", ")));
    }
    if !stats.age_distribution.is_empty() {
        let parts: Vec<String> = stats
            .age_distribution
            .iter()
            .map(|a| format!("{} {}", a.range, a.count))
            .collect();
        out.push_str(&format!("Age: {}\n", parts.join(", ")));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockServiceClient;
    use crate::models::{DiseaseCount, Gender, NewPatient};

    fn stored(first: &str) -> Patient {
        let mut p = Patient::from_new(
            format!("id-{first}"),
            NewPatient {
                first_name: first.into(),
                last_name: "Nair".into(),
                age: 61,
                gender: Gender::Male,
                country: "India".into(),
                city: Some("Kochi".into()),
                allergies: vec!["penicillin".into(), "penicillin".into()],
                ..Default::default()
            },
        );
        p.patient_id = Some(format!("PT-{first}"));
        p.diagnosis = Some("Hypertension".into());
        p
    }

    #[tokio::test]
    async fn patients_page_footer() {
        let client = MockServiceClient::new().with_patients(vec![stored("Anil"), stored("Bina")]);
        let args = PatientsArgs {
            page: 1,
            limit: 1,
            search: None,
            diagnosis: None,
        };
        let out = patients(&client, &args).await.unwrap();
        assert!(out.contains("PT-Anil"));
        assert!(!out.contains("PT-Bina"));
        assert!(out.ends_with("Page 1 of 2 (2 patients)"));
    }

    #[tokio::test]
    async fn empty_history_says_so() {
        let client = MockServiceClient::new();
        let args = HistoryArgs { page: 1, limit: 15 };
        assert_eq!(history(&client, &args).await.unwrap(), "No records found");
    }

    #[tokio::test]
    async fn list_failure_is_reported() {
        let client = MockServiceClient::new().unreachable();
        let args = HistoryArgs { page: 0, limit: 15 };
        let err = history(&client, &args).await.unwrap_err();
        assert!(err.contains("not reachable"));
    }

    #[tokio::test]
    async fn patient_detail_keeps_duplicate_allergies() {
        let client = MockServiceClient::new().with_patients(vec![stored("Anil")]);
        let out = patient(&client, "PT-Anil").await.unwrap();
        assert!(out.starts_with("Anil Nair (PT-Anil)"));
        assert!(out.contains("Location: Kochi, India"));
        assert!(out.contains("Allergies: penicillin, penicillin"));
        assert!(out.contains("Diagnosis: Hypertension"));
    }

    #[tokio::test]
    async fn stats_lists_top_diagnoses() {
        let client = MockServiceClient::new().with_stats(Statistics {
            total_patients: 1000,
            diagnosis_distribution: vec![
                DiseaseCount {
                    disease: "Diabetes".into(),
                    count: 120,
                },
                DiseaseCount {
                    disease: "Asthma".into(),
                    count: 80,
                },
            ],
            country_distribution: vec![],
            severity_distribution: vec![],
            gender_distribution: vec![],
            age_distribution: vec![],
        });
        let out = stats(&client).await.unwrap();
        assert!(out.starts_with("Total patients: 1000"));
        assert!(out.contains("Diabetes"));
        assert!(!out.contains("Severity:"));
    }
}
