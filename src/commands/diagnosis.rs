//! Diagnosis page commands.
//!
//! - `predict`: fill the form from arguments, submit one prediction
//! - `symptoms` / `diseases`: list the service vocabularies

use clap::Args;

use crate::client::PredictionClient;
use crate::models::{DiagnosisForm, Gender, ModelError};
use crate::workflow::{DiagnosisSummary, DiagnosisWorkflow, SubmitOutcome};

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Age in years; unparsable input counts as 0
    #[arg(long, default_value = "30")]
    pub age: String,

    #[arg(long, default_value = "male")]
    pub gender: Gender,

    /// Symptom to include; repeat or comma-separate
    #[arg(long = "symptom", value_delimiter = ',')]
    pub symptoms: Vec<String>,

    /// Days since onset; blank or unparsable means unspecified
    #[arg(long, default_value = "7")]
    pub duration: String,

    #[arg(long)]
    pub smoking: bool,

    #[arg(long)]
    pub alcohol: bool,

    #[arg(long = "condition")]
    pub conditions: Vec<String>,

    #[arg(long = "family-history")]
    pub family_history: Vec<String>,

    /// Vital sign as key=value, e.g. heart_rate=92
    #[arg(long = "vital")]
    pub vitals: Vec<String>,

    /// Lab value as key=value, e.g. hemoglobin=11.2
    #[arg(long = "lab")]
    pub labs: Vec<String>,

    /// Stored patient this prediction belongs to
    #[arg(long)]
    pub patient_id: Option<String>,
}

impl PredictArgs {
    pub fn apply(&self, form: &mut DiagnosisForm) -> Result<(), String> {
        form.set_age(&self.age);
        form.gender = self.gender;
        form.set_symptom_duration(&self.duration);
        form.smoking = self.smoking;
        form.alcohol = self.alcohol;
        form.patient_id = self
            .patient_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        for symptom in &self.symptoms {
            if !form.symptoms().iter().any(|s| s == symptom.trim()) {
                form.toggle_symptom(symptom);
            }
        }
        for condition in &self.conditions {
            form.add_existing_condition(condition);
        }
        for entry in &self.family_history {
            form.add_family_history(entry);
        }
        for pair in &self.vitals {
            let (key, value) = split_pair(pair)?;
            form.set_vital(key, value).map_err(|e: ModelError| e.to_string())?;
        }
        for pair in &self.labs {
            let (key, value) = split_pair(pair)?;
            form.set_lab(key, value).map_err(|e: ModelError| e.to_string())?;
        }
        Ok(())
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| format!("Expected key=value, got: {pair}"))
}

pub async fn predict<C: PredictionClient>(client: &C, args: &PredictArgs) -> Result<String, String> {
    let workflow = DiagnosisWorkflow::new();
    workflow.edit(|form| args.apply(form))?;

    match workflow.submit(client).await {
        SubmitOutcome::Succeeded => workflow
            .summary()
            .map(|summary| render_summary(&summary))
            .ok_or_else(|| "Prediction finished without a result".to_string()),
        SubmitOutcome::Failed => Err(workflow
            .state()
            .error()
            .unwrap_or(crate::client::PREDICTION_FAILED)
            .to_string()),
        SubmitOutcome::Ignored => Err("A prediction is already in progress".to_string()),
        SubmitOutcome::Rejected(err) => Err(err.to_string()),
    }
}

pub fn render_summary(summary: &DiagnosisSummary) -> String {
    let mut out = format!(
        "Primary diagnosis: {} ({})\n",
        summary.primary, summary.confidence
    );

    if !summary.differential.is_empty() {
        out.push_str("Differential:\n");
        for (rank, row) in summary.differential.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {:<32} {:>7}\n",
                rank + 1,
                row.disease,
                row.confidence
            ));
        }
    }
    if let Some(root_cause) = &summary.root_cause {
        out.push_str(&format!("Root cause: {root_cause}\n"));
    }
    if !summary.recommended_tests.is_empty() {
        out.push_str(&format!(
            "Recommended tests: {}\n",
            summary.recommended_tests.join(", ")
        ));
    }
    if !summary.recommended_treatments.is_empty() {
        out.push_str(&format!(
            "Recommended treatments: {}\n",
            summary.recommended_treatments.join(", ")
        ));
    }
    if let Some(suggestion) = &summary.ai_suggestion {
        out.push_str(&format!("\nAI clinical notes:\n{suggestion}\n"));
    }
    out.trim_end().to_string()
}

pub async fn symptoms<C: PredictionClient>(client: &C) -> Result<String, String> {
    let symptoms = client
        .symptom_vocabulary()
        .await
        .map_err(|e| e.user_message("Failed to load symptoms"))?;
    Ok(symptoms.join("\n"))
}

pub async fn diseases<C: PredictionClient>(client: &C) -> Result<String, String> {
    let diseases = client
        .disease_vocabulary()
        .await
        .map_err(|e| e.user_message("Failed to load diseases"))?;
    Ok(diseases.join("\n"))
}
